//! Chord command: decode a raw device chord word.

use crate::cfg::chord::{device_word_to_twiddle, twiddle_to_device_word};
use crate::cli::common::{CliError, CliResult};
use clap::Args;
use serde::Serialize;

/// Decode a device chord word into twiddle notation
#[derive(Debug, Clone, Args)]
pub struct ChordArgs {
    /// Chord word as hex (0x0020) or decimal (32)
    #[arg(value_name = "WORD")]
    pub word: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON-serializable chord decoding
#[derive(Debug, Serialize)]
pub struct ChordResponse {
    /// Word as given, normalized to hex
    pub word: String,
    /// Twiddle in text notation
    pub twiddle: String,
    /// Packed finger columns
    pub chord: u8,
    /// Thumb mask
    pub thumbs: u8,
    /// Word the encoder would write for this twiddle
    pub canonical: String,
    /// Whether `word` is already the canonical packing
    pub is_canonical: bool,
}

impl ChordArgs {
    /// Execute the chord command
    pub fn execute(&self) -> CliResult<()> {
        let word = parse_word(&self.word)?;
        if word == 0 {
            return Err(CliError::validation(
                "Chord word 0 is the table terminator, not a chord",
            ));
        }

        let twiddle = device_word_to_twiddle(word);
        let canonical = twiddle_to_device_word(twiddle);
        let response = ChordResponse {
            word: format!("{word:#06x}"),
            twiddle: twiddle.to_string(),
            chord: twiddle.chord(),
            thumbs: twiddle.thumbs(),
            canonical: format!("{canonical:#06x}"),
            is_canonical: canonical == word,
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            println!("{} -> {}", response.word, response.twiddle);
            if response.is_canonical {
                println!("  canonical");
            } else {
                println!("  non-canonical, re-encodes as {}", response.canonical);
            }
        }

        Ok(())
    }
}

fn parse_word(input: &str) -> CliResult<u16> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| {
        CliError::validation(format!(
            "Invalid chord word '{input}': expected a 16-bit hex (0x0020) or decimal value"
        ))
    })
}
