//! Test fixtures
//!
//! The banking package used throughout the integration tests:
//!
//! ```go
//! var registryMu sync.Mutex
//!
//! type Vault   struct { mu sync.Mutex; totalAssets int }
//! type Account struct { mu sync.Mutex; rw sync.RWMutex; balance int }
//! type Bank    struct { registryMu sync.Mutex; accounts []*Account; vault *Vault; shards []sync.Mutex }
//! ```

use lockcheck_ir::features::lock_contracts::{
    AnnotationKind, ContractRegistry, ContractRegistryBuilder, FunctionContract, Requirement,
};
use lockcheck_ir::features::program_model::{DeclId, SyncPackage, TypeId};
use lockcheck_ir::{Diagnostic, ProgramBuilder, Span};

pub const BANK_FILE: &str = "bank.go";

/// Handles to the banking types
pub struct BankTypes {
    pub sync: SyncPackage,
    pub int: TypeId,
    pub vault: TypeId,
    pub vault_ptr: TypeId,
    pub account: TypeId,
    pub account_ptr: TypeId,
    pub bank: TypeId,
    pub bank_ptr: TypeId,
    pub registry_mu: DeclId,
}

/// Fresh builder with the banking types declared
pub fn bank_package() -> (ProgramBuilder, BankTypes) {
    let mut b = ProgramBuilder::new("bank");
    let sync = b.declare_sync_package();
    let int = b.basic("int");

    let vault = b.struct_type("Vault", &[("mu", sync.mutex), ("totalAssets", int)]);
    let vault_ptr = b.pointer(vault);
    let account = b.struct_type(
        "Account",
        &[("mu", sync.mutex), ("rw", sync.rw_mutex), ("balance", int)],
    );
    let account_ptr = b.pointer(account);
    let accounts = b.slice(account_ptr);
    let shards = b.slice(sync.mutex);
    let bank = b.struct_type(
        "Bank",
        &[
            ("registryMu", sync.mutex),
            ("accounts", accounts),
            ("vault", vault_ptr),
            ("shards", shards),
        ],
    );
    let bank_ptr = b.pointer(bank);
    let registry_mu = b.global("registryMu", sync.mutex);

    let types = BankTypes {
        sync,
        int,
        vault,
        vault_ptr,
        account,
        account_ptr,
        bank,
        bank_ptr,
        registry_mu,
    };
    (b, types)
}

/// Span on `line` of the fixture file
pub fn line(line: u32) -> Span {
    Span::at(line, 2)
}

/// Fluent contract table for tests
#[derive(Default)]
pub struct Contracts {
    builder: ContractRegistryBuilder,
}

impl Contracts {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(mut self, kind: AnnotationKind, name: &str, receiver: Option<&str>, targets: &[&str]) -> Self {
        let contract = FunctionContract::new(
            targets
                .iter()
                .map(|t| Requirement::new(kind, *t))
                .collect(),
        );
        self.builder.add_function(name, receiver, contract);
        self
    }

    pub fn requires(self, name: &str, receiver: Option<&str>, targets: &[&str]) -> Self {
        self.add(AnnotationKind::Requires, name, receiver, targets)
    }

    pub fn returns(self, name: &str, receiver: Option<&str>, targets: &[&str]) -> Self {
        self.add(AnnotationKind::Returns, name, receiver, targets)
    }

    pub fn build(self) -> ContractRegistry {
        self.builder.build()
    }
}

/// Requirement targets of `diagnostics`, in report order
pub fn targets(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.target.as_str()).collect()
}

/// Source lines of `diagnostics`, in report order
pub fn lines(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.span.start_line).collect()
}
