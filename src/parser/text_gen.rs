//! Text configuration generation with atomic file writes.

use crate::cfg::{self, Cfg};
use crate::models::{ENABLE_REPEAT_NAME, ENABLE_STORAGE_NAME};
use anyhow::{Context, Result};
use std::path::Path;

/// Renders a configuration in the text format.
///
/// Assignments come first, one line per twiddle, followed by every integer
/// setting that differs from its default and then each enabled flag.
///
/// # Examples
///
/// ```
/// use twiddlecfg::parser::{generate_text, parse_text_cfg};
///
/// let (cfg, _) = parse_text_cfg("L000 M000 = a\nEnableRepeat true\n");
/// assert_eq!(generate_text(&cfg), "L000 = a\nM000 = a\nEnableRepeat true\n");
/// ```
#[must_use]
pub fn generate_text(cfg: &Cfg) -> String {
    let mut output = String::new();

    for assignment in &cfg.assignments {
        for twiddle in assignment.twiddles() {
            output.push_str(&format!("{twiddle} = {}\n", assignment.keys()));
        }
    }

    for (setting, value) in cfg.settings.non_default() {
        output.push_str(&format!("{setting} {value}\n"));
    }
    if cfg.settings.repeat_enabled() {
        output.push_str(&format!("{ENABLE_REPEAT_NAME} true\n"));
    }
    if cfg.settings.storage_enabled() {
        output.push_str(&format!("{ENABLE_STORAGE_NAME} true\n"));
    }

    output
}

/// Writes a configuration in the text format.
///
/// This performs an atomic write using a temp file + rename pattern so the
/// target is never left half written.
pub fn save_text_cfg(cfg: &Cfg, path: &Path) -> Result<()> {
    let text = generate_text(cfg);
    cfg::write_atomic(path, text.as_bytes())
        .with_context(|| format!("Failed to write text configuration: {}", path.display()))
}
