//! Common test utilities for lockcheck-ir
//!
//! Shared fixtures (a small banking package) and registry builders for the
//! integration tests.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;
