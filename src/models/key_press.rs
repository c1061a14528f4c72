//! Key codes and key code sequences.
//!
//! A key code is 16 bits: the low byte is a USB HID keyboard usage, the high
//! byte holds HID modifier bits. Text notation uses key names (`a`, `Enter`,
//! `F1`), optional modifier prefixes (`Ctrl+`, `RShift+`) and a `0xNNNN`
//! escape for codes without a name.

// Allow intentional type casts between code halves
#![allow(clippy::cast_possible_truncation)]

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// HID modifier bits as stored in the high byte of a key code.
const MODIFIERS: [(u8, &str); 8] = [
    (0x01, "Ctrl"),
    (0x02, "Shift"),
    (0x04, "Alt"),
    (0x08, "Gui"),
    (0x10, "RCtrl"),
    (0x20, "RShift"),
    (0x40, "RAlt"),
    (0x80, "RGui"),
];

/// Left shift modifier bit.
const LEFT_SHIFT: u8 = 0x02;

/// Names for HID keyboard usages that are not letters or digits.
const NAMED_USAGES: &[(u8, &str)] = &[
    (0x28, "Enter"),
    (0x29, "Escape"),
    (0x2A, "Backspace"),
    (0x2B, "Tab"),
    (0x2C, "Space"),
    (0x2D, "-"),
    (0x2E, "="),
    (0x2F, "["),
    (0x30, "]"),
    (0x31, "\\"),
    (0x32, "NonUsHash"),
    (0x33, ";"),
    (0x34, "'"),
    (0x35, "`"),
    (0x36, ","),
    (0x37, "."),
    (0x38, "/"),
    (0x39, "CapsLock"),
    (0x3A, "F1"),
    (0x3B, "F2"),
    (0x3C, "F3"),
    (0x3D, "F4"),
    (0x3E, "F5"),
    (0x3F, "F6"),
    (0x40, "F7"),
    (0x41, "F8"),
    (0x42, "F9"),
    (0x43, "F10"),
    (0x44, "F11"),
    (0x45, "F12"),
    (0x46, "PrintScreen"),
    (0x47, "ScrollLock"),
    (0x48, "Pause"),
    (0x49, "Insert"),
    (0x4A, "Home"),
    (0x4B, "PageUp"),
    (0x4C, "Delete"),
    (0x4D, "End"),
    (0x4E, "PageDown"),
    (0x4F, "Right"),
    (0x50, "Left"),
    (0x51, "Down"),
    (0x52, "Up"),
    (0x53, "NumLock"),
    (0x54, "KpSlash"),
    (0x55, "KpStar"),
    (0x56, "KpMinus"),
    (0x57, "KpPlus"),
    (0x58, "KpEnter"),
    (0x59, "Kp1"),
    (0x5A, "Kp2"),
    (0x5B, "Kp3"),
    (0x5C, "Kp4"),
    (0x5D, "Kp5"),
    (0x5E, "Kp6"),
    (0x5F, "Kp7"),
    (0x60, "Kp8"),
    (0x61, "Kp9"),
    (0x62, "Kp0"),
    (0x63, "KpDot"),
    (0x64, "NonUsBackslash"),
    (0x65, "Application"),
    (0xE0, "LeftCtrl"),
    (0xE1, "LeftShift"),
    (0xE2, "LeftAlt"),
    (0xE3, "LeftGui"),
    (0xE4, "RightCtrl"),
    (0xE5, "RightShift"),
    (0xE6, "RightAlt"),
    (0xE7, "RightGui"),
];

/// First letter usage (`a`).
const USAGE_A: u8 = 0x04;
/// Last letter usage (`z`).
const USAGE_Z: u8 = 0x1D;
/// First digit usage (`1`); `0` follows `9`.
const USAGE_1: u8 = 0x1E;
const USAGE_0: u8 = 0x27;

fn usage_name(usage: u8) -> Option<String> {
    match usage {
        USAGE_A..=USAGE_Z => Some(char::from(b'a' + (usage - USAGE_A)).to_string()),
        USAGE_1..=0x26 => Some(char::from(b'1' + (usage - USAGE_1)).to_string()),
        USAGE_0 => Some("0".to_string()),
        _ => NAMED_USAGES
            .iter()
            .find(|(code, _)| *code == usage)
            .map(|(_, name)| (*name).to_string()),
    }
}

fn usage_from_name(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        match c {
            'a'..='z' => return Some(USAGE_A + (c as u8 - b'a')),
            '1'..='9' => return Some(USAGE_1 + (c as u8 - b'1')),
            '0' => return Some(USAGE_0),
            _ => {}
        }
    }
    NAMED_USAGES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
}

/// A single key code as stored by the device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
pub struct KeyPress {
    code: u16,
}

impl KeyPress {
    /// Wraps a raw 16-bit key code. Validity is checked separately with [`KeyPress::is_valid`].
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        Self { code }
    }

    /// Builds a key code from a HID usage and modifier bits.
    #[must_use]
    pub const fn with_modifiers(usage: u8, modifiers: u8) -> Self {
        Self {
            code: ((modifiers as u16) << 8) | usage as u16,
        }
    }

    /// Raw 16-bit key code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// HID keyboard usage (low byte).
    #[must_use]
    pub const fn usage(&self) -> u8 {
        (self.code & 0xFF) as u8
    }

    /// HID modifier bits (high byte).
    #[must_use]
    pub const fn modifiers(&self) -> u8 {
        (self.code >> 8) as u8
    }

    /// Whether the usage is a known keyboard usage.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        usage_name(self.usage()).is_some()
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(name) = usage_name(self.usage()) else {
            return write!(f, "{:#06x}", self.code);
        };

        // Shifted letters read better as capitals
        if self.modifiers() == LEFT_SHIFT && (USAGE_A..=USAGE_Z).contains(&self.usage()) {
            return write!(f, "{}", name.to_ascii_uppercase());
        }

        for (bit, prefix) in MODIFIERS {
            if self.modifiers() & bit != 0 {
                write!(f, "{prefix}+")?;
            }
        }
        write!(f, "{name}")
    }
}

impl FromStr for KeyPress {
    type Err = anyhow::Error;

    /// Parses a key token such as `a`, `Q`, `Ctrl+c`, `RAlt+Enter` or `0x0204`.
    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            let code = u16::from_str_radix(hex, 16)
                .map_err(|_| anyhow::anyhow!("Invalid hex key code '{token}'"))?;
            return Ok(Self::from_code(code));
        }

        // A lone '+' is not a key, but "Ctrl++" is not meaningful either
        let (prefixes, name) = match token.rsplit_once('+') {
            Some((prefixes, name)) if !name.is_empty() => (Some(prefixes), name),
            _ => (None, token),
        };

        let mut modifiers = 0;
        if let Some(prefixes) = prefixes {
            for prefix in prefixes.split('+') {
                let bit = MODIFIERS
                    .iter()
                    .find(|(_, m)| m.eq_ignore_ascii_case(prefix))
                    .map(|(bit, _)| *bit)
                    .ok_or_else(|| anyhow::anyhow!("Unknown modifier '{prefix}' in '{token}'"))?;
                modifiers |= bit;
            }
        }

        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                let usage = USAGE_A + (c as u8 - b'A');
                return Ok(Self::with_modifiers(usage, modifiers | LEFT_SHIFT));
            }
        }

        let usage =
            usage_from_name(name).ok_or_else(|| anyhow::anyhow!("Unknown key name '{name}'"))?;
        Ok(Self::with_modifiers(usage, modifiers))
    }
}

/// An ordered, non-empty sequence of key codes.
///
/// A list of one key is a simple assignment; longer lists are multi-key
/// (macro) assignments stored in the device's multi-key table.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
pub struct KeyPressList {
    keys: Vec<KeyPress>,
}

impl KeyPressList {
    /// Creates a list holding a single key.
    #[must_use]
    pub fn new(first: KeyPress) -> Self {
        Self { keys: vec![first] }
    }

    /// Creates a list from a sequence of keys.
    pub fn from_keys(keys: Vec<KeyPress>) -> Result<Self> {
        if keys.is_empty() {
            anyhow::bail!("A key list must contain at least one key");
        }
        Ok(Self { keys })
    }

    /// Appends a key.
    pub fn push(&mut self, key: KeyPress) {
        self.keys.push(key);
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false for a constructed list; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<KeyPress> {
        self.keys.get(index).copied()
    }

    /// First key in the list.
    #[must_use]
    pub fn first(&self) -> KeyPress {
        self.keys[0]
    }

    /// Iterates over the keys in order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyPress> {
        self.keys.iter()
    }

    /// Whether this list needs the multi-key table.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.keys.len() > 1
    }

    /// Whether every key code is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.keys.iter().all(KeyPress::is_valid)
    }
}

impl From<KeyPress> for KeyPressList {
    fn from(key: KeyPress) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for KeyPressList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromStr for KeyPressList {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let keys = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<KeyPress>>>()?;
        Self::from_keys(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_digits() {
        assert_eq!("a".parse::<KeyPress>().unwrap().code(), 0x04);
        assert_eq!("z".parse::<KeyPress>().unwrap().code(), 0x1D);
        assert_eq!("1".parse::<KeyPress>().unwrap().code(), 0x1E);
        assert_eq!("0".parse::<KeyPress>().unwrap().code(), 0x27);
        assert_eq!(KeyPress::from_code(0x26).to_string(), "9");
    }

    #[test]
    fn test_capital_letter_is_shifted() {
        let key: KeyPress = "Q".parse().unwrap();
        assert_eq!(key.modifiers(), LEFT_SHIFT);
        assert_eq!(key.usage(), 0x14);
        assert_eq!(key.to_string(), "Q");
    }

    #[test]
    fn test_modifier_prefixes() {
        let key: KeyPress = "Ctrl+Alt+Delete".parse().unwrap();
        assert_eq!(key.code(), 0x054C);
        assert_eq!(key.to_string(), "Ctrl+Alt+Delete");

        let key: KeyPress = "rgui+Tab".parse().unwrap();
        assert_eq!(key.modifiers(), 0x80);
    }

    #[test]
    fn test_punctuation_names() {
        assert_eq!("=".parse::<KeyPress>().unwrap().usage(), 0x2E);
        assert_eq!("Shift+=".parse::<KeyPress>().unwrap().code(), 0x022E);
        assert_eq!("enter".parse::<KeyPress>().unwrap().usage(), 0x28);
    }

    #[test]
    fn test_hex_escape_for_unknown_usage() {
        let key = KeyPress::from_code(0x00F0);
        assert!(!key.is_valid());
        assert_eq!(key.to_string(), "0x00f0");
        assert_eq!("0x00f0".parse::<KeyPress>().unwrap(), key);
    }

    #[test]
    fn test_validity_range() {
        assert!(KeyPress::from_code(0x04).is_valid());
        assert!(KeyPress::from_code(0xE7).is_valid());
        assert!(!KeyPress::from_code(0x00).is_valid());
        assert!(!KeyPress::from_code(0x03).is_valid());
        assert!(!KeyPress::from_code(0x66).is_valid());
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert!("Hyper+a".parse::<KeyPress>().is_err());
        assert!("NoSuchKey".parse::<KeyPress>().is_err());
    }

    #[test]
    fn test_key_list_parse_and_display() {
        let list: KeyPressList = "c d Enter".parse().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.is_multi());
        assert_eq!(list.get(2).unwrap().usage(), 0x28);
        assert_eq!(list.to_string(), "c d Enter");
    }

    #[test]
    fn test_key_list_must_not_be_empty() {
        assert!("   ".parse::<KeyPressList>().is_err());
        assert!(KeyPressList::from_keys(Vec::new()).is_err());
        assert!(!KeyPressList::new(KeyPress::from_code(4)).is_multi());
    }
}
