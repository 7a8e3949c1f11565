pub mod analyze_program;

pub use analyze_program::*;
