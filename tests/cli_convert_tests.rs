//! End-to-end tests for `twiddlecfg convert`.

use std::fs;
use tempfile::TempDir;
use twiddlecfg::cfg::Cfg;
use twiddlecfg::models::IntSetting;
use twiddlecfg::parser::parse_text_cfg;

mod fixtures;
use fixtures::*;

#[test]
fn test_convert_text_to_binary() {
    let temp_dir = TempDir::new().unwrap();
    write_text_file(temp_dir.path(), "layout.txt", SAMPLE_TEXT);

    let output = run_in(&temp_dir, &["convert", "layout.txt", "layout.cfg"]);
    assert_exit(&output, 0, "Convert should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✓ Wrote layout.cfg"), "{stdout}");
    assert!(stdout.contains("binary, 5 assignments, 6 twiddles"), "{stdout}");

    let decoded = Cfg::read_binary(&temp_dir.path().join("layout.cfg")).unwrap();
    assert!(decoded.cfg.assignments.same_mappings(&sample_cfg().assignments));
    assert_eq!(decoded.cfg.settings.get(IntSetting::MsRepeatDelay), 120);
}

#[test]
fn test_convert_binary_to_text() {
    let temp_dir = TempDir::new().unwrap();
    write_binary_file(temp_dir.path(), "layout.cfg", &sample_cfg());

    let output = run_in(&temp_dir, &["convert", "layout.cfg", "layout.txt"]);
    assert_exit(&output, 0, "Convert should succeed");

    let text = fs::read_to_string(temp_dir.path().join("layout.txt")).unwrap();
    assert!(text.contains("L000 = a\n"), "{text}");
    assert!(text.contains("EnableRepeat true\n"), "{text}");

    let (cfg, warnings) = parse_text_cfg(&text);
    assert!(warnings.is_empty());
    assert!(cfg.assignments.same_mappings(&sample_cfg().assignments));
}

#[test]
fn test_convert_prints_warnings_and_still_writes() {
    let temp_dir = TempDir::new().unwrap();
    write_text_file(temp_dir.path(), "remap.txt", "L000 = a\nL000 = b\nbogus line\n");

    let output = run_in(&temp_dir, &["convert", "remap.txt", "remap.cfg"]);
    assert_exit(&output, 0, "Warnings are not fatal by default");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("⚠ "), "{stderr}");
    assert!(stderr.contains("L000 is assigned both 'a' and 'b'"), "{stderr}");
    assert!(temp_dir.path().join("remap.cfg").exists());
}

#[test]
fn test_convert_strict_refuses_to_write() {
    let temp_dir = TempDir::new().unwrap();
    write_text_file(temp_dir.path(), "remap.txt", "L000 = a\nL000 = b\n");

    let output = run_in(&temp_dir, &["convert", "remap.txt", "remap.cfg", "--strict"]);
    assert_exit(&output, 1, "Strict mode should fail on warnings");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("strict mode"), "{stderr}");
    assert!(!temp_dir.path().join("remap.cfg").exists());
}

#[test]
fn test_convert_strict_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[diagnostics]\nstrict = true\n",
    )
    .unwrap();
    write_text_file(temp_dir.path(), "remap.txt", "L000 = a\nL000 = b\n");

    let output = run_in(&temp_dir, &["convert", "remap.txt", "remap.cfg"]);
    assert_exit(&output, 1, "Configured strict mode should fail on warnings");
    assert!(!temp_dir.path().join("remap.cfg").exists());
}

#[test]
fn test_convert_strict_passes_clean_input() {
    let temp_dir = TempDir::new().unwrap();
    write_text_file(temp_dir.path(), "layout.txt", SAMPLE_TEXT);

    let output = run_in(&temp_dir, &["convert", "layout.txt", "layout.cfg", "--strict"]);
    assert_exit(&output, 0, "Clean input passes strict mode");
}

#[test]
fn test_convert_missing_input_is_io_error() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(&temp_dir, &["convert", "missing.cfg", "out.txt"]);
    assert_exit(&output, 2, "Missing input should be an I/O failure");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("missing.cfg"), "{stderr}");
}

#[test]
fn test_convert_corrupt_binary_is_validation_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("corrupt.cfg"),
        raw_binary(&[(0x0020, 0x0000)], &[]),
    )
    .unwrap();

    let output = run_in(&temp_dir, &["convert", "corrupt.cfg", "out.txt"]);
    assert_exit(&output, 1, "Corrupt input should be a validation failure");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("format error"), "{stderr}");
    assert!(!temp_dir.path().join("out.txt").exists());
}

#[test]
fn test_convert_unencodable_setting_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_text_file(temp_dir.path(), "big.txt", "L000 = a\nStartSpeed 300\n");

    let output = run_in(&temp_dir, &["convert", "big.txt", "big.cfg"]);
    assert_exit(&output, 1, "Out-of-range setting cannot be encoded");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot encode"), "{stderr}");
    assert!(!temp_dir.path().join("big.cfg").exists());
}

#[test]
fn test_convert_repeat_delay_off_the_10ms_step_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_text_file(temp_dir.path(), "delay.txt", "L000 = a\nMsRepeatDelay 125\n");

    let output = run_in(&temp_dir, &["convert", "delay.txt", "delay.cfg"]);
    assert_exit(&output, 1, "Repeat delay must be a multiple of 10");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MsRepeatDelay 125"), "{stderr}");
    assert!(!temp_dir.path().join("delay.cfg").exists());
}

#[test]
fn test_convert_uses_configured_defaults_for_text() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[defaults]\nstart_speed = 7\nenable_storage = true\n",
    )
    .unwrap();
    write_text_file(temp_dir.path(), "plain.txt", "L000 = a\n");

    let output = run_in(&temp_dir, &["convert", "plain.txt", "plain.cfg"]);
    assert_exit(&output, 0, "Convert should succeed");

    let bytes = fs::read(temp_dir.path().join("plain.cfg")).unwrap();
    assert_eq!(bytes[11], 7);
    assert_eq!(bytes[15], 0x04 | 0x02);
}

#[test]
fn test_convert_requires_both_paths() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_in(&temp_dir, &["convert", "only.txt"]);
    assert!(!output.status.success());
}
