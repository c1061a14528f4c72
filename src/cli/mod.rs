//! CLI command handlers for twiddlecfg.
//!
//! This module provides headless, scriptable access to the configuration codec
//! for automation, testing, and conversion pipelines.

pub mod chord;
pub mod common;
pub mod config;
pub mod convert;
pub mod inspect;

// Re-export types used by main.rs and tests
pub use chord::ChordArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use convert::ConvertArgs;
pub use inspect::InspectArgs;
