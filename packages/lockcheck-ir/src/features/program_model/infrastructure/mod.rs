/// Program Model Infrastructure
pub mod builder;
pub mod loader;

pub use builder::*;
pub use loader::*;
