pub mod contract_source;

pub use contract_source::*;
