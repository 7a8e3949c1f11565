//! Feature modules
//!
//! - `program_model`    : typed CFG input IR + builder/loader
//! - `lock_contracts`   : annotations, contracts, registry, Go front-end
//! - `lockset_analysis` : resolver, abstract state, interpreter, worklist driver

pub mod lock_contracts;
pub mod lockset_analysis;
pub mod program_model;
