//! Text configuration format.
//!
//! This module reads and writes the human-editable counterpart of the binary
//! `.cfg` layout handled by [`crate::cfg`].

pub mod text;
pub mod text_gen;

// Re-export commonly used functions
pub use text::{parse_text_cfg, parse_text_cfg_file, parse_text_cfg_with, TextWarning};
pub use text_gen::{generate_text, save_text_cfg};
