//! ContractRegistry - whole-program table of lock obligations
//!
//! Built once by the front-end through `ContractRegistryBuilder`, then frozen:
//! `ContractRegistry` has no mutating methods, so nothing can add obligations
//! once analysis has started. Sharing it across threads needs no locking.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::contract::{
    make_function_key, normalize_type_name, DataInvariant, FunctionContract,
};
use crate::features::program_model::{Function, Program};

/// Immutable contract table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRegistry {
    /// `<Recv>.<name>` and unqualified `<name>` keys
    functions: BTreeMap<String, FunctionContract>,
    /// `<Type>.<field>` or `<global>` keys
    data: BTreeMap<String, DataInvariant>,
    /// Bare names held only as a method fallback, not owned by a plain function
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    fallback_keys: BTreeSet<String>,
}

impl ContractRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> ContractRegistryBuilder {
        ContractRegistryBuilder::new()
    }

    pub fn functions(&self) -> &BTreeMap<String, FunctionContract> {
        &self.functions
    }

    pub fn data(&self) -> &BTreeMap<String, DataInvariant> {
        &self.data
    }

    pub fn function(&self, key: &str) -> Option<&FunctionContract> {
        self.functions.get(key)
    }

    /// Guard of a field (`Account.balance`) or package-level variable
    pub fn guard_for(&self, key: &str) -> Option<&DataInvariant> {
        self.data.get(key)
    }

    /// Contract of `function`: receiver-qualified key first, then the bare name.
    ///
    /// Every declaration a front-end saw is registered, so the fallback is only
    /// reached for functions whose declaration was never extracted. An empty
    /// contract carries no obligations.
    pub fn contract_for(&self, function: &Function, program: &Program) -> Option<&FunctionContract> {
        let receiver = function
            .receiver
            .map(|r| normalize_type_name(&program.type_string(r)))
            .unwrap_or_default();
        self.functions
            .get(&make_function_key(&function.name, &receiver))
            .or_else(|| self.functions.get(&function.name))
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.data.is_empty()
    }
}

impl fmt::Display for ContractRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Contract Registry ===")?;
        writeln!(f, "\n-- Functions --")?;
        if self.functions.is_empty() {
            writeln!(f, "(none)")?;
        }
        for (name, contract) in &self.functions {
            match render_location(contract.file_path.as_deref(), contract) {
                Some(loc) => writeln!(f, "{} @ {}", name, loc)?,
                None => writeln!(f, "{}", name)?,
            }
            if contract.is_empty() {
                writeln!(f, "  (no expectations)")?;
            }
            for req in &contract.requirements {
                writeln!(f, "  - {}({})", req.kind, req.target)?;
            }
        }

        writeln!(f, "\n-- Data Invariants/Guards --")?;
        if self.data.is_empty() {
            writeln!(f, "(none)")?;
        }
        for (name, guard) in &self.data {
            write!(f, "{} guarded by {}", name, guard.mutex_name)?;
            if !guard.span.is_zero() {
                match &guard.file_path {
                    Some(path) => write!(f, " @ {}:{}", path, guard.span)?,
                    None => write!(f, " @ {}", guard.span)?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "{}", "=".repeat(25))
    }
}

fn render_location(file_path: Option<&str>, contract: &FunctionContract) -> Option<String> {
    if contract.span.is_zero() {
        return None;
    }
    Some(match file_path {
        Some(path) => format!("{}:{}", path, contract.span),
        None => contract.span.to_string(),
    })
}

/// Mutable form used only during registry population
#[derive(Debug, Default)]
pub struct ContractRegistryBuilder {
    functions: BTreeMap<String, FunctionContract>,
    data: BTreeMap<String, DataInvariant>,
    fallback_keys: BTreeSet<String>,
}

impl ContractRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function contract (possibly empty).
    ///
    /// Methods go under `<normalized receiver>.<name>`; the bare name is kept
    /// as a fallback only if nothing holds it yet. Plain functions own the bare
    /// name outright.
    pub fn add_function(&mut self, name: &str, receiver_type: Option<&str>, contract: FunctionContract) -> &mut Self {
        match receiver_type.map(normalize_type_name).filter(|r| !r.is_empty()) {
            Some(receiver) => {
                self.add_fallback(name.to_string(), contract.clone());
                self.functions
                    .insert(make_function_key(name, &receiver), contract);
            }
            None => self.add_owned(name.to_string(), contract),
        }
        self
    }

    fn add_owned(&mut self, key: String, contract: FunctionContract) {
        self.fallback_keys.remove(&key);
        self.functions.insert(key, contract);
    }

    fn add_fallback(&mut self, key: String, contract: FunctionContract) {
        if !self.functions.contains_key(&key) {
            self.fallback_keys.insert(key.clone());
            self.functions.insert(key, contract);
        }
    }

    /// Register a `guarded_by` invariant; a later guard for the same key wins
    pub fn add_data_invariant(&mut self, key: impl Into<String>, invariant: DataInvariant) -> &mut Self {
        self.data.insert(key.into(), invariant);
        self
    }

    /// Fold another registry in. Later sources win on key clashes, except
    /// that a method fallback never displaces a bare name already held.
    pub fn merge(&mut self, other: ContractRegistry) -> &mut Self {
        let ContractRegistry {
            functions,
            data,
            fallback_keys,
        } = other;
        for (key, contract) in functions {
            if fallback_keys.contains(&key) {
                self.add_fallback(key, contract);
            } else {
                self.add_owned(key, contract);
            }
        }
        self.data.extend(data);
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze
    pub fn build(self) -> ContractRegistry {
        ContractRegistry {
            functions: self.functions,
            data: self.data,
            fallback_keys: self.fallback_keys,
        }
    }
}
