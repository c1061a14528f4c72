//! Twiddler Config - convert and inspect Twiddler chorded keyboard configurations
//!
//! Reads the device's binary `.cfg` files and an editable text format, converts
//! between them, and reports corruption and suspicious assignments.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twiddlecfg::cli::{ChordArgs, CliResult, ConfigArgs, ConvertArgs, ExitCode, InspectArgs};
use twiddlecfg::config::Config;
use twiddlecfg::constants::{APP_BINARY_NAME, APP_NAME};

/// Twiddler Config - convert and inspect Twiddler chorded keyboard configurations
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert between binary (.cfg) and text configurations
    Convert(ConvertArgs),
    /// Show settings, assignments and warnings of a configuration
    Inspect(InspectArgs),
    /// Decode a raw device chord word
    Chord(ChordArgs),
    /// Manage application configuration
    Config(ConfigArgs),
}

impl Commands {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::Convert(args) => args.execute(),
            Self::Inspect(args) => args.execute(),
            Self::Chord(args) => args.execute(),
            Self::Config(args) => args.execute(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        Config::load()
            .map(|config| config.diagnostics.log_level)
            .unwrap_or_else(|_| "warn".to_string())
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let code = match cli.command.execute() {
        Ok(()) => ExitCode::Success,
        Err(err) => {
            eprintln!("Error: {err}");
            err.kind
        }
    };
    std::process::exit(code.code());
}
