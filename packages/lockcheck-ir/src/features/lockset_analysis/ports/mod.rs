pub mod lockset_analyzer_port;

pub use lockset_analyzer_port::*;
