//! Text configuration parser.
//!
//! # Format
//!
//! ```text
//! # comment
//! L000 = a
//! N0M00 0R00 = Ctrl+c
//! 00LL = t h e Space
//! MsRepeatDelay 120
//! EnableRepeat true
//! ```
//!
//! Assignment lines contain `=`; everything else that is not blank or a
//! comment must be a `Name value` setting line. Names match case-insensitively.

use crate::cfg::Cfg;
use crate::models::{Assignment, IntSetting, Settings, ENABLE_REPEAT_NAME, ENABLE_STORAGE_NAME};
use anyhow::{bail, Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

/// A line that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWarning {
    /// 1-based line number, or `None` for whole-file findings such as remaps
    pub line: Option<usize>,
    /// What was wrong
    pub message: String,
}

impl fmt::Display for TextWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Parses a text configuration starting from default settings.
///
/// # Examples
///
/// ```
/// use twiddlecfg::models::IntSetting;
/// use twiddlecfg::parser::parse_text_cfg;
///
/// let (cfg, warnings) = parse_text_cfg("L000 = a\nStartSpeed 4\n");
/// assert!(warnings.is_empty());
/// assert_eq!(cfg.assignments.len(), 1);
/// assert_eq!(cfg.settings.get(IntSetting::StartSpeed), 4);
/// ```
#[must_use]
pub fn parse_text_cfg(text: &str) -> (Cfg, Vec<TextWarning>) {
    parse_text_cfg_with(text, &Settings::default())
}

/// Parses a text configuration on top of `baseline` settings.
#[must_use]
pub fn parse_text_cfg_with(text: &str, baseline: &Settings) -> (Cfg, Vec<TextWarning>) {
    let mut cfg = Cfg::new(baseline.clone(), Default::default());
    let mut warnings = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let result = if line.contains('=') {
            Assignment::parse_line(line).and_then(|asg| {
                // The encoder would write these codes but the decoder drops them
                if !asg.keys().is_valid() {
                    bail!("Invalid key code in '{}'", asg.keys());
                }
                cfg.assignments.push(asg);
                Ok(())
            })
        } else {
            apply_setting(&mut cfg.settings, line)
        };

        if let Err(err) = result {
            warnings.push(TextWarning {
                line: Some(index + 1),
                message: format!("{err:#}"),
            });
        }
    }

    warnings.extend(cfg.assignments.remaps().into_iter().map(|remap| TextWarning {
        line: None,
        message: format!("Remap: {remap}"),
    }));

    (cfg, warnings)
}

/// Reads and parses a text configuration file.
///
/// Warnings are logged as well as returned.
pub fn parse_text_cfg_file(path: &Path, baseline: &Settings) -> Result<(Cfg, Vec<TextWarning>)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read text configuration: {}", path.display()))?;

    let (cfg, warnings) = parse_text_cfg_with(&text, baseline);
    for warning in &warnings {
        warn!("{}: {warning}", path.display());
    }
    Ok((cfg, warnings))
}

fn apply_setting(settings: &mut Settings, line: &str) -> Result<()> {
    let mut tokens = line.split_whitespace();
    let (Some(name), Some(value), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        anyhow::bail!("Expected an assignment or 'Name value' setting: {line}");
    };

    if name.eq_ignore_ascii_case(ENABLE_REPEAT_NAME) {
        settings.set_repeat_enabled(parse_bool(value)?);
    } else if name.eq_ignore_ascii_case(ENABLE_STORAGE_NAME) {
        settings.set_storage_enabled(parse_bool(value)?);
    } else {
        let setting: IntSetting = name.parse()?;
        let value: u32 = value
            .parse()
            .with_context(|| format!("Invalid value '{value}' for {setting}"))?;
        settings.set(setting, value);
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Invalid boolean '{value}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Twiddle;

    #[test]
    fn test_assignments_and_settings() {
        let text = "\
# my layout
L000 = a
N0M00 0R00 = Ctrl+c

00LL = t h e Space
msrepeatdelay 120
EnableStorage yes
";
        let (cfg, warnings) = parse_text_cfg(text);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(cfg.assignments.len(), 3);
        assert_eq!(cfg.assignments.twiddle_count(), 4);
        assert_eq!(cfg.assignments.multi_key_count(), 1);
        assert_eq!(cfg.settings.get(IntSetting::MsRepeatDelay), 120);
        assert!(cfg.settings.storage_enabled());
        assert!(!cfg.settings.repeat_enabled());
    }

    #[test]
    fn test_bad_lines_become_warnings() {
        let text = "L000 = a\nnonsense\nStartSpeed fast\nL00 = b\nM000 = nokey\nColor 3\n";
        let (cfg, warnings) = parse_text_cfg(text);
        assert_eq!(cfg.assignments.len(), 1);
        let lines: Vec<Option<usize>> = warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![Some(2), Some(3), Some(4), Some(5), Some(6)]);
    }

    #[test]
    fn test_unknown_key_codes_are_not_assigned() {
        let text = "L000 = 0x00f0\n0L00 = a\n00L0 = b 0x00f1\n";
        let (cfg, warnings) = parse_text_cfg(text);
        assert_eq!(cfg.assignments.len(), 1);
        let lines: Vec<Option<usize>> = warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![Some(1), Some(3)]);
        assert!(warnings[0].message.contains("Invalid key code"), "{}", warnings[0]);

        let decoded = Cfg::from_bytes(&cfg.to_bytes().unwrap().bytes, "mem").unwrap();
        assert!(decoded.warnings.is_empty(), "{:?}", decoded.warnings);
        assert!(decoded.cfg.assignments.same_mappings(&cfg.assignments));
    }

    #[test]
    fn test_remaps_reported_after_parsing() {
        let (cfg, warnings) = parse_text_cfg("L000 = a\nL000 = b\n");
        assert_eq!(cfg.assignments.len(), 2);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, None);
        assert!(warnings[0].to_string().contains("L000"));
    }

    #[test]
    fn test_baseline_settings_apply() {
        let mut baseline = Settings::default();
        baseline.set(IntSetting::StartSpeed, 7);
        baseline.set_repeat_enabled(true);

        let (cfg, _) = parse_text_cfg_with("FastSpeed 9\n", &baseline);
        assert_eq!(cfg.settings.get(IntSetting::StartSpeed), 7);
        assert_eq!(cfg.settings.get(IntSetting::FastSpeed), 9);
        assert!(cfg.settings.repeat_enabled());
    }

    #[test]
    fn test_parse_bool_variants() {
        for value in ["true", "YES", "On", "1"] {
            assert!(parse_bool(value).unwrap());
        }
        for value in ["false", "no", "OFF", "0"] {
            assert!(!parse_bool(value).unwrap());
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_thumb_twiddle_parsed() {
        let (cfg, _) = parse_text_cfg("S0L00 = Enter\n");
        let asg = cfg.assignments.iter().next().unwrap();
        assert_eq!(asg.twiddle(0), Some("S0L00".parse::<Twiddle>().unwrap()));
    }
}
