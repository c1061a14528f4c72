//! Shared test fixtures for codec and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use twiddlecfg::cfg::{Cfg, MOUSE_PAYLOAD};
use twiddlecfg::config::CONFIG_DIR_ENV;
use twiddlecfg::parser::parse_text_cfg;

/// Text configuration exercising thumbs, modifiers and multi-key lists.
pub const SAMPLE_TEXT: &str = "\
# sample layout
L000 = a
0L00 = b
N0M00 = Ctrl+c
00LL 00MM = t h e Space
S000R = Q
MsRepeatDelay 120
StartSpeed 4
EnableRepeat true
";

/// Path to the twiddlecfg binary
pub fn twiddlecfg_bin() -> &'static str {
    env!("CARGO_BIN_EXE_twiddlecfg")
}

/// Parses [`SAMPLE_TEXT`].
pub fn sample_cfg() -> Cfg {
    let (cfg, warnings) = parse_text_cfg(SAMPLE_TEXT);
    assert!(warnings.is_empty(), "sample text should parse cleanly: {warnings:?}");
    cfg
}

/// Creates a Command whose config directory is `config_dir`, so tests never
/// see the user's real configuration.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(twiddlecfg_bin());
    cmd.env(CONFIG_DIR_ENV, config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}

/// Runs the binary inside `dir`, which doubles as the config directory.
pub fn run_in(dir: &TempDir, args: &[&str]) -> Output {
    isolated_command(args, dir.path())
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute command")
}

/// Writes a text file under `dir` and returns its path.
pub fn write_text_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write text file");
    path
}

/// Encodes `cfg` into a binary file under `dir` and returns its path.
pub fn write_binary_file(dir: &Path, name: &str, cfg: &Cfg) -> PathBuf {
    let path = dir.join(name);
    cfg.write_binary(&path).expect("Failed to write binary file");
    path
}

/// Builds a binary buffer by hand with default settings.
///
/// `pairs` are raw (chord word, key field) values, so tests can write
/// anything the encoder would refuse to produce.
pub fn raw_binary(pairs: &[(u16, u16)], multi: &[&[u16]]) -> Vec<u8> {
    let end_of_twiddles = 16 + (pairs.len() + 1) * 4;
    let start_of_multi = end_of_twiddles + MOUSE_PAYLOAD.len();

    let mut bytes = vec![5, 0, 0];
    bytes
        .write_u16::<LittleEndian>(u16::try_from(end_of_twiddles).unwrap())
        .unwrap();
    bytes
        .write_u16::<LittleEndian>(u16::try_from(start_of_multi).unwrap())
        .unwrap();
    bytes.write_u16::<LittleEndian>(1500).unwrap();
    bytes.write_u16::<LittleEndian>(0).unwrap();
    bytes.extend([3, 6, 10, 10, 0x04]);

    for (word, key) in pairs {
        bytes.write_u16::<BigEndian>(*word).unwrap();
        bytes.write_u16::<BigEndian>(*key).unwrap();
    }
    bytes.extend([0, 0, 0, 0]);
    bytes.extend_from_slice(&MOUSE_PAYLOAD);

    for keys in multi {
        let descriptor = u16::try_from((keys.len() + 1) << 9).unwrap();
        bytes.write_u16::<BigEndian>(descriptor).unwrap();
        for key in *keys {
            bytes.write_u16::<BigEndian>(*key).unwrap();
        }
    }
    bytes
}

/// Asserts the command exited with `code`, showing stderr otherwise.
pub fn assert_exit(output: &Output, code: i32, context: &str) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "{context}. stdout: {} stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Parses stdout as JSON.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout should be valid JSON ({e}): {stdout}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_sample_cfg() {
        let cfg = sample_cfg();
        assert_eq!(cfg.assignments.len(), 5);
        assert_eq!(cfg.assignments.twiddle_count(), 6);
        assert_eq!(cfg.assignments.multi_key_count(), 1);
    }

    #[test]
    fn test_fixture_raw_binary_length() {
        let bytes = raw_binary(&[(0x0020, 0x0004)], &[&[0x0004, 0x0005]]);
        assert_eq!(bytes.len(), 16 + 8 + 39 + 6);
    }
}
