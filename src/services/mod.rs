//! Service layer for file-level operations.
//!
//! Services coordinate the codec, the text format and the file system.

pub mod cfg_files;

// Re-export commonly used types and functions
pub use cfg_files::{CfgFormat, CfgService, LoadedCfg};
