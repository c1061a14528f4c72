//! Inspect command: summarize a configuration file.

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::models::{IntSetting, ENABLE_REPEAT_NAME, ENABLE_STORAGE_NAME};
use crate::services::{CfgFormat, CfgService, LoadedCfg};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Show settings, assignments and warnings of a configuration file
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Configuration file (.cfg is read as binary, anything else as text)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON-serializable inspection report
#[derive(Debug, Serialize)]
pub struct InspectResponse {
    /// Inspected path
    pub path: String,
    /// Format the file was read as
    pub format: CfgFormat,
    /// Every integer setting
    pub settings: Vec<SettingInfo>,
    /// Key repeat flag
    pub repeat_enabled: bool,
    /// Mass storage flag
    pub storage_enabled: bool,
    /// Number of assignments
    pub assignments: usize,
    /// Number of twiddles across all assignments
    pub twiddles: usize,
    /// Assignments that use the multi-key table
    pub multi_key: Vec<MultiKeyInfo>,
    /// Mouse chords (binary files only)
    pub mouse: Vec<MouseInfo>,
    /// Twiddles claimed by more than one assignment
    pub remaps: Vec<String>,
    /// Warnings raised while loading
    pub warnings: Vec<String>,
}

/// One integer setting
#[derive(Debug, Serialize)]
pub struct SettingInfo {
    /// Text format name
    pub name: &'static str,
    /// Current value
    pub value: u32,
    /// Whether the value is the built-in default
    pub default: bool,
}

/// One multi-key assignment
#[derive(Debug, Serialize)]
pub struct MultiKeyInfo {
    /// Twiddles in text notation
    pub twiddles: Vec<String>,
    /// Key list in text notation
    pub keys: String,
}

/// One mouse chord
#[derive(Debug, Serialize)]
pub struct MouseInfo {
    /// Twiddle in text notation
    pub twiddle: String,
    /// Raw action byte
    pub action: u8,
}

impl InspectResponse {
    fn build(path: &str, loaded: &LoadedCfg) -> Self {
        let cfg = &loaded.cfg;
        Self {
            path: path.to_string(),
            format: loaded.format,
            settings: IntSetting::ALL
                .into_iter()
                .map(|setting| SettingInfo {
                    name: setting.name(),
                    value: cfg.settings.get(setting),
                    default: cfg.settings.is_default(setting),
                })
                .collect(),
            repeat_enabled: cfg.settings.repeat_enabled(),
            storage_enabled: cfg.settings.storage_enabled(),
            assignments: cfg.assignments.len(),
            twiddles: cfg.assignments.twiddle_count(),
            multi_key: cfg
                .assignments
                .iter()
                .filter(|asg| asg.keys().is_multi())
                .map(|asg| MultiKeyInfo {
                    twiddles: asg.twiddles().iter().map(ToString::to_string).collect(),
                    keys: asg.keys().to_string(),
                })
                .collect(),
            mouse: loaded
                .mouse
                .iter()
                .map(|chord| MouseInfo {
                    twiddle: chord.twiddle.to_string(),
                    action: chord.action,
                })
                .collect(),
            remaps: cfg
                .assignments
                .remaps()
                .iter()
                .map(ToString::to_string)
                .collect(),
            warnings: loaded.warnings.clone(),
        }
    }
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
        let loaded = CfgService::load(&self.file, &config.baseline_settings())
            .map_err(|e| CliError::from_anyhow(&e))?;

        let response = InspectResponse::build(&self.file.display().to_string(), &loaded);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            print_human_readable(&response);
        }

        Ok(())
    }
}

fn print_human_readable(response: &InspectResponse) {
    println!("{} ({})", response.path, response.format);

    println!("\nSettings:");
    for setting in &response.settings {
        let marker = if setting.default { "" } else { " *" };
        println!("  {:<20} {}{marker}", setting.name, setting.value);
    }
    println!("  {:<20} {}", ENABLE_REPEAT_NAME, response.repeat_enabled);
    println!("  {:<20} {}", ENABLE_STORAGE_NAME, response.storage_enabled);

    println!(
        "\nAssignments: {} ({} twiddles, {} multi-key)",
        response.assignments,
        response.twiddles,
        response.multi_key.len()
    );
    for entry in &response.multi_key {
        println!("  {} = {}", entry.twiddles.join(" "), entry.keys);
    }

    if !response.mouse.is_empty() {
        println!("\nMouse chords: {}", response.mouse.len());
        for chord in &response.mouse {
            println!("  {} -> {:#04x}", chord.twiddle, chord.action);
        }
    }

    if !response.remaps.is_empty() {
        println!("\nRemaps:");
        for remap in &response.remaps {
            println!("  ✗ {remap}");
        }
    }

    if !response.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &response.warnings {
            println!("  ⚠ {warning}");
        }
    }
}
