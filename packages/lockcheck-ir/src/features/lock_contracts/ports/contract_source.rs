/// Contract source port trait
use crate::errors::Result;
use crate::features::lock_contracts::ContractRegistryBuilder;

/// Anything that can contribute contracts before the registry is frozen
///
/// Implemented by the Go front-end and by serialized registries; tests can
/// provide in-memory sources.
pub trait ContractSource {
    /// Human-readable origin, used in logs
    fn describe(&self) -> String;

    /// Add this source's contracts to `builder`
    fn contribute(&self, builder: &mut ContractRegistryBuilder) -> Result<()>;
}
