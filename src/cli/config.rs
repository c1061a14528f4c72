//! Configuration management CLI commands.

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::models::{IntSetting, ENABLE_REPEAT_NAME, ENABLE_STORAGE_NAME};
use clap::{Args, Subcommand};
use serde::Serialize;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Print the configuration file path
    Path,
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Treat warnings as failures by default (true or false)
    #[arg(long, value_name = "BOOL")]
    strict: Option<bool>,

    /// Default log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Baseline setting for text input, e.g. `StartSpeed=4` or `EnableRepeat=true`
    #[arg(long = "default", value_name = "NAME=VALUE")]
    defaults: Vec<String>,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput {
    path: String,
    defaults: Vec<DefaultOutput>,
    diagnostics: DiagnosticsOutput,
}

#[derive(Serialize, Debug)]
struct DefaultOutput {
    name: &'static str,
    value: String,
}

#[derive(Serialize, Debug)]
struct DiagnosticsOutput {
    strict: bool,
    log_level: String,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Path => {
                let path = Config::config_file_path()
                    .map_err(|e| CliError::io(format!("{e:#}")))?;
                println!("{}", path.display());
                Ok(())
            }
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            output_json(&config)?;
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.strict.is_none() && self.log_level.is_none() && self.defaults.is_empty() {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --strict, --log-level, or --default",
            ));
        }

        let mut config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if let Some(strict) = self.strict {
            config.diagnostics.strict = strict;
        }
        if let Some(level) = &self.log_level {
            config.diagnostics.log_level = level.to_lowercase();
        }
        for assignment in &self.defaults {
            apply_default(&mut config, assignment)?;
        }

        config
            .validate()
            .map_err(|e| CliError::validation(format!("{e:#}")))?;
        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");
        Ok(())
    }
}

/// Applies one `Name=value` baseline override.
fn apply_default(config: &mut Config, assignment: &str) -> CliResult<()> {
    let (name, value) = assignment.split_once('=').ok_or_else(|| {
        CliError::validation(format!("Expected NAME=VALUE, got '{assignment}'"))
    })?;
    let (name, value) = (name.trim(), value.trim());
    let defaults = &mut config.defaults;

    if name.eq_ignore_ascii_case(ENABLE_REPEAT_NAME) || name.eq_ignore_ascii_case(ENABLE_STORAGE_NAME) {
        let enabled: bool = value
            .parse()
            .map_err(|_| CliError::validation(format!("Invalid boolean '{value}' for {name}")))?;
        if name.eq_ignore_ascii_case(ENABLE_REPEAT_NAME) {
            defaults.enable_repeat = Some(enabled);
        } else {
            defaults.enable_storage = Some(enabled);
        }
        return Ok(());
    }

    let setting: IntSetting = name
        .parse()
        .map_err(|e| CliError::validation(format!("{e}")))?;
    let value: u32 = value
        .parse()
        .map_err(|_| CliError::validation(format!("Invalid value '{value}' for {setting}")))?;

    let slot = match setting {
        IntSetting::MajorVersion => &mut defaults.major_version,
        IntSetting::MinorVersion => &mut defaults.minor_version,
        IntSetting::MouseExitDelay => &mut defaults.mouse_exit_delay,
        IntSetting::MsBetweenTwiddles => &mut defaults.ms_between_twiddles,
        IntSetting::StartSpeed => &mut defaults.start_speed,
        IntSetting::FastSpeed => &mut defaults.fast_speed,
        IntSetting::MouseAcceleration => &mut defaults.mouse_acceleration,
        IntSetting::MsRepeatDelay => &mut defaults.ms_repeat_delay,
    };
    *slot = Some(value);
    Ok(())
}

/// Output configuration in JSON format
fn output_json(config: &Config) -> CliResult<()> {
    let path = Config::config_file_path()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let baseline = config.baseline_settings();

    let mut defaults: Vec<DefaultOutput> = IntSetting::ALL
        .into_iter()
        .map(|setting| DefaultOutput {
            name: setting.name(),
            value: baseline.get(setting).to_string(),
        })
        .collect();
    defaults.push(DefaultOutput {
        name: ENABLE_REPEAT_NAME,
        value: baseline.repeat_enabled().to_string(),
    });
    defaults.push(DefaultOutput {
        name: ENABLE_STORAGE_NAME,
        value: baseline.storage_enabled().to_string(),
    });

    let output = ConfigOutput {
        path,
        defaults,
        diagnostics: DiagnosticsOutput {
            strict: config.diagnostics.strict,
            log_level: config.diagnostics.log_level.clone(),
        },
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::io(format!("Failed to serialize configuration to JSON: {}", e)))?;

    println!("{}", json);
    Ok(())
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    let baseline = config.baseline_settings();

    println!("Twiddler Config Configuration");
    println!("=============================");
    println!();

    if let Ok(path) = Config::config_file_path() {
        let state = if Config::exists() { "" } else { " (not created yet)" };
        println!("File: {}{state}", path.display());
        println!();
    }

    println!("Text input defaults:");
    for setting in IntSetting::ALL {
        let marker = if baseline.is_default(setting) { "" } else { " *" };
        println!("  {:<20} {}{marker}", setting.name(), baseline.get(setting));
    }
    println!("  {:<20} {}", ENABLE_REPEAT_NAME, baseline.repeat_enabled());
    println!("  {:<20} {}", ENABLE_STORAGE_NAME, baseline.storage_enabled());
    println!();

    println!("Diagnostics:");
    println!("  Strict: {}", config.diagnostics.strict);
    println!("  Log level: {}", config.diagnostics.log_level);
    println!();
}
