//! Configuration file I/O service.
//!
//! This module centralizes loading and saving in both formats, so callers get
//! one warning list and one error type regardless of which format is on disk.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::cfg::{Cfg, MouseChord};
use crate::models::Settings;
use crate::parser;

/// On-disk format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CfgFormat {
    /// Device `.cfg` layout
    Binary,
    /// Line-oriented text
    Text,
}

impl CfgFormat {
    /// Picks the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        if Cfg::is_binary_path(path) {
            Self::Binary
        } else {
            Self::Text
        }
    }
}

impl fmt::Display for CfgFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// A configuration together with what was learned while loading it.
#[derive(Debug, Clone)]
pub struct LoadedCfg {
    /// The configuration itself
    pub cfg: Cfg,
    /// Format it was read from
    pub format: CfgFormat,
    /// Mouse chords (binary files only)
    pub mouse: Vec<MouseChord>,
    /// Rendered warnings in the order they were found
    pub warnings: Vec<String>,
}

/// Service for loading and saving configuration files.
pub struct CfgService;

impl CfgService {
    /// Loads a configuration, choosing the format by extension.
    ///
    /// Text files start from `baseline` settings; binary files carry all
    /// settings in their header.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use twiddlecfg::models::Settings;
    /// use twiddlecfg::services::CfgService;
    ///
    /// let loaded = CfgService::load(Path::new("twiddler.cfg"), &Settings::default())?;
    /// for warning in &loaded.warnings {
    ///     eprintln!("{warning}");
    /// }
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path, baseline: &Settings) -> Result<LoadedCfg> {
        let format = CfgFormat::from_path(path);
        match format {
            CfgFormat::Binary => {
                let decoded = Cfg::read_binary(path)
                    .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
                Ok(LoadedCfg {
                    cfg: decoded.cfg,
                    format,
                    mouse: decoded.mouse,
                    warnings: decoded.warnings.iter().map(ToString::to_string).collect(),
                })
            }
            CfgFormat::Text => {
                let (cfg, warnings) = parser::parse_text_cfg_file(path, baseline)?;
                Ok(LoadedCfg {
                    cfg,
                    format,
                    mouse: Vec::new(),
                    warnings: warnings.iter().map(ToString::to_string).collect(),
                })
            }
        }
    }

    /// Saves a configuration, choosing the format by extension.
    ///
    /// Returns the warnings raised while encoding. Remap collisions are
    /// checked by the caller before saving.
    pub fn save(cfg: &Cfg, path: &Path) -> Result<Vec<String>> {
        match CfgFormat::from_path(path) {
            CfgFormat::Binary => {
                let warnings = cfg
                    .write_binary(path)
                    .with_context(|| format!("Failed to save configuration to {}", path.display()))?;
                Ok(warnings.iter().map(ToString::to_string).collect())
            }
            CfgFormat::Text => {
                parser::save_text_cfg(cfg, path)?;
                Ok(Vec::new())
            }
        }
    }
}
