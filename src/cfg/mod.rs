//! Binary configuration codec for the Twiddler.
//!
//! [`Cfg`] pairs the device [`Settings`] with the chord [`Assignments`] and
//! converts them to and from the device's `.cfg` layout. Decoding and
//! encoding are pure functions over byte buffers; the file helpers here only
//! add reading and atomic writing around them.

pub mod chord;
pub mod decode;
pub mod encode;
pub mod error;

pub use decode::{Decoded, MouseChord};
pub use encode::{Encoded, MOUSE_PAYLOAD};
pub use error::{CfgError, CfgWarning, Result};

use crate::models::{Assignments, Settings};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of the binary format.
pub const BINARY_EXTENSION: &str = "cfg";

/// A complete device configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cfg {
    /// Timing and behavior settings
    pub settings: Settings,
    /// Chord to key assignments
    pub assignments: Assignments,
}

impl Cfg {
    /// Creates a configuration from its parts.
    #[must_use]
    pub const fn new(settings: Settings, assignments: Assignments) -> Self {
        Self {
            settings,
            assignments,
        }
    }

    /// Whether any chord is assigned.
    #[must_use]
    pub fn has_assignments(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// Whether `path` names a binary configuration.
    #[must_use]
    pub fn is_binary_path(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(BINARY_EXTENSION))
    }

    /// Reads a configuration in either format, chosen by file extension.
    ///
    /// Warnings are logged and dropped; use
    /// [`CfgService::load`](crate::services::CfgService::load) to collect them.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use twiddlecfg::cfg::Cfg;
    ///
    /// let cfg = Cfg::read(Path::new("twiddler.cfg"))?;
    /// println!("{} assignments", cfg.assignments.len());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        crate::services::CfgService::load(path, &Settings::default()).map(|loaded| loaded.cfg)
    }

    /// Reads and decodes a binary configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CfgError::Io`] if the file cannot be read, or a structural
    /// error if its contents are corrupt.
    pub fn read_binary(path: &Path) -> Result<Decoded> {
        let bytes = fs::read(path).map_err(|source| CfgError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes, &path.display().to_string())
    }

    /// Decodes a binary configuration held in memory.
    ///
    /// # Errors
    ///
    /// Returns a structural error if the buffer is corrupt.
    pub fn from_bytes(bytes: &[u8], label: &str) -> Result<Decoded> {
        decode::decode(bytes, label)
    }

    /// Encodes this configuration into the binary layout.
    ///
    /// # Errors
    ///
    /// Returns [`CfgError::Unencodable`] if the configuration does not fit the format.
    pub fn to_bytes(&self) -> Result<Encoded> {
        encode::encode(self)
    }

    /// Encodes and writes a binary configuration file.
    ///
    /// The buffer is fully built before the file is touched, and the write goes
    /// through a temporary file so an existing file is never left half written.
    ///
    /// # Errors
    ///
    /// Returns [`CfgError::Unencodable`] before any I/O, or [`CfgError::Io`] if
    /// writing fails.
    pub fn write_binary(&self, path: &Path) -> Result<Vec<CfgWarning>> {
        let encoded = self.to_bytes()?;
        write_atomic(path, &encoded.bytes).map_err(|source| CfgError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(encoded.warnings)
    }
}

/// Temporary sibling used while writing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes `contents` to a temporary file and renames it over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let temp = temp_path(path);
    if let Err(err) = fs::write(&temp, contents) {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }
    fs::rename(&temp, path)
}
