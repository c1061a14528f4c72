//! Convert command: binary and text configurations in either direction.

use crate::cli::common::{print_warnings, CliError, CliResult};
use crate::config::Config;
use crate::services::{CfgFormat, CfgService};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

/// Convert a configuration between the binary (.cfg) and text formats
#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Input file (.cfg is read as binary, anything else as text)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (.cfg is written as binary, anything else as text)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Treat warnings as errors (exit non-zero, nothing written)
    #[arg(long)]
    pub strict: bool,
}

impl ConvertArgs {
    /// Execute the convert command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
        let strict = self.strict || config.diagnostics.strict;

        let loaded = CfgService::load(&self.input, &config.baseline_settings())
            .map_err(|e| CliError::from_anyhow(&e))?;
        debug!(
            "Loaded {} ({}): {} assignments",
            self.input.display(),
            loaded.format,
            loaded.cfg.assignments.len()
        );

        // Both loaders report remap collisions, so this list gates the save too
        let warnings = loaded.warnings;
        print_warnings(&warnings);

        if strict && !warnings.is_empty() {
            return Err(CliError::validation(format!(
                "{} warning(s) in strict mode, {} not written",
                warnings.len(),
                self.output.display()
            )));
        }

        let save_warnings =
            CfgService::save(&loaded.cfg, &self.output).map_err(|e| CliError::from_anyhow(&e))?;
        print_warnings(&save_warnings);

        println!(
            "✓ Wrote {} ({}, {} assignments, {} twiddles)",
            self.output.display(),
            CfgFormat::from_path(&self.output),
            loaded.cfg.assignments.len(),
            loaded.cfg.assignments.twiddle_count()
        );

        if strict && !save_warnings.is_empty() {
            return Err(CliError::validation("Warnings found in strict mode"));
        }

        Ok(())
    }
}
