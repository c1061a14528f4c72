//! Twiddler configuration library
//!
//! This library reads and writes configurations for the Twiddler chorded
//! keyboard: the device's binary `.cfg` layout, a line-oriented text format,
//! and the chord, key and settings models both are built on.

// Module declarations
pub mod cfg;
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod parser;
pub mod services;
