//! Codec error and warning types.

use crate::models::Remap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors from decoding or encoding a binary configuration.
#[derive(Error, Debug)]
pub enum CfgError {
    /// The buffer ended inside a section.
    #[error("{path}: truncated {section} at byte {offset}")]
    Truncated {
        path: String,
        section: &'static str,
        offset: u64,
    },

    /// Exactly one half of a terminator pair was zero.
    #[error("{path}: format error in {section} at byte {offset}: twiddle {chord_word:#06x} key {key:#06x}")]
    TerminatorMismatch {
        path: String,
        section: &'static str,
        offset: u64,
        chord_word: u16,
        key: u16,
    },

    /// A twiddle refers to a multi-key entry that does not exist.
    #[error("{path}: multi-key index {index} out of range ({entries} entries)")]
    DanglingMultiKeyIndex {
        path: String,
        index: u8,
        entries: usize,
    },

    /// A multi-key descriptor encodes a length below one.
    #[error("{path}: malformed multi-key descriptor {descriptor:#06x} for entry {index}")]
    MalformedMultiKey {
        path: String,
        index: usize,
        descriptor: u16,
    },

    /// The configuration holds something the binary format cannot express.
    #[error("Cannot encode configuration: {0}")]
    Unencodable(String),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing into the in-memory buffer failed.
    #[error("Buffer error: {0}")]
    Buffer(#[from] std::io::Error),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CfgError>;

/// Recoverable problems found while decoding or encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfgWarning {
    /// A key code outside the known usage range.
    InvalidKeyCode {
        path: String,
        code: u16,
        /// Where the code was found, e.g. "twiddle table" or "multi-key entry 3"
        location: String,
    },

    /// Two assignments claim the same twiddle.
    Remap { path: String, remap: Remap },

    /// The encoded length failed the parity self-check.
    OddByteCount { len: usize },
}

impl fmt::Display for CfgWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyCode {
                path,
                code,
                location,
            } => write!(f, "Found invalid key code {code:#06x} in {location} of {path}"),
            Self::Remap { path, remap } => write!(f, "Remap in {path}: {remap}"),
            Self::OddByteCount { len } => {
                write!(f, "Odd number of bytes ({len}) in encoded configuration")
            }
        }
    }
}
