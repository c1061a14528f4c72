//! Device timing and behavior settings.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Text name of the key-repeat flag.
pub const ENABLE_REPEAT_NAME: &str = "EnableRepeat";
/// Text name of the mass-storage flag.
pub const ENABLE_STORAGE_NAME: &str = "EnableStorage";

/// Named integer settings stored in the binary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntSetting {
    /// Format major version (1 byte)
    MajorVersion,
    /// Format minor version (2 bytes)
    MinorVersion,
    /// Milliseconds before mouse mode exits (2 bytes)
    MouseExitDelay,
    /// Minimum milliseconds between twiddles (2 bytes)
    MsBetweenTwiddles,
    /// Initial mouse speed (1 byte)
    StartSpeed,
    /// Fast mouse speed (1 byte)
    FastSpeed,
    /// Mouse acceleration factor (1 byte)
    MouseAcceleration,
    /// Key repeat delay in milliseconds, stored in tens (1 byte)
    MsRepeatDelay,
}

impl IntSetting {
    /// All settings in header order.
    pub const ALL: [Self; 8] = [
        Self::MajorVersion,
        Self::MinorVersion,
        Self::MouseExitDelay,
        Self::MsBetweenTwiddles,
        Self::StartSpeed,
        Self::FastSpeed,
        Self::MouseAcceleration,
        Self::MsRepeatDelay,
    ];

    /// Camel-case name used in the text format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MajorVersion => "MajorVersion",
            Self::MinorVersion => "MinorVersion",
            Self::MouseExitDelay => "MouseExitDelay",
            Self::MsBetweenTwiddles => "MsBetweenTwiddles",
            Self::StartSpeed => "StartSpeed",
            Self::FastSpeed => "FastSpeed",
            Self::MouseAcceleration => "MouseAcceleration",
            Self::MsRepeatDelay => "MsRepeatDelay",
        }
    }

    /// Value a fresh configuration starts with.
    #[must_use]
    pub const fn default_value(self) -> u32 {
        match self {
            Self::MajorVersion => 5,
            Self::MinorVersion | Self::MsBetweenTwiddles => 0,
            Self::MouseExitDelay => 1500,
            Self::StartSpeed => 3,
            Self::FastSpeed => 6,
            Self::MouseAcceleration => 10,
            Self::MsRepeatDelay => 100,
        }
    }

    /// Largest value the binary header can hold for this setting.
    #[must_use]
    pub const fn max_value(self) -> u32 {
        match self {
            Self::MajorVersion | Self::StartSpeed | Self::FastSpeed | Self::MouseAcceleration => {
                u8::MAX as u32
            }
            Self::MinorVersion | Self::MouseExitDelay | Self::MsBetweenTwiddles => u16::MAX as u32,
            Self::MsRepeatDelay => u8::MAX as u32 * 10,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for IntSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntSetting {
    type Err = anyhow::Error;

    /// Matches setting names case-insensitively.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|setting| setting.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown setting '{s}'"))
    }
}

/// Integer settings plus the repeat and storage flags.
///
/// # Examples
///
/// ```
/// use twiddlecfg::models::{IntSetting, Settings};
///
/// let mut settings = Settings::default();
/// assert!(settings.is_default(IntSetting::MsRepeatDelay));
///
/// settings.set(IntSetting::MsRepeatDelay, 120);
/// assert_eq!(settings.get(IntSetting::MsRepeatDelay), 120);
/// assert!(!settings.is_default(IntSetting::MsRepeatDelay));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    values: [u32; IntSetting::ALL.len()],
    repeat_enabled: bool,
    storage_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            values: IntSetting::ALL.map(IntSetting::default_value),
            repeat_enabled: false,
            storage_enabled: false,
        }
    }
}

impl Settings {
    /// Current value of `setting`.
    #[must_use]
    pub const fn get(&self, setting: IntSetting) -> u32 {
        self.values[setting.index()]
    }

    /// Sets `setting`. Range checks belong to whoever serializes the value.
    pub fn set(&mut self, setting: IntSetting, value: u32) {
        self.values[setting.index()] = value;
    }

    /// Whether `setting` still holds its default.
    #[must_use]
    pub const fn is_default(&self, setting: IntSetting) -> bool {
        self.get(setting) == setting.default_value()
    }

    /// Restores every integer setting and both flags to their defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Non-default integer settings in header order.
    pub fn non_default(&self) -> impl Iterator<Item = (IntSetting, u32)> + '_ {
        IntSetting::ALL
            .into_iter()
            .filter(|s| !self.is_default(*s))
            .map(|s| (s, self.get(s)))
    }

    /// Whether key repeat is enabled.
    #[must_use]
    pub const fn repeat_enabled(&self) -> bool {
        self.repeat_enabled
    }

    /// Enables or disables key repeat.
    pub fn set_repeat_enabled(&mut self, enabled: bool) {
        self.repeat_enabled = enabled;
    }

    /// Whether mass storage is enabled.
    #[must_use]
    pub const fn storage_enabled(&self) -> bool {
        self.storage_enabled
    }

    /// Enables or disables mass storage.
    pub fn set_storage_enabled(&mut self, enabled: bool) {
        self.storage_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_default() {
        let settings = Settings::default();
        for setting in IntSetting::ALL {
            assert!(settings.is_default(setting), "{setting} should be default");
        }
        assert!(!settings.repeat_enabled());
        assert!(!settings.storage_enabled());
        assert_eq!(settings.non_default().count(), 0);
    }

    #[test]
    fn test_set_and_reset() {
        let mut settings = Settings::default();
        settings.set(IntSetting::StartSpeed, 9);
        settings.set_storage_enabled(true);
        assert_eq!(
            settings.non_default().collect::<Vec<_>>(),
            vec![(IntSetting::StartSpeed, 9)]
        );

        settings.reset();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_flags_are_independent() {
        let mut settings = Settings::default();
        settings.set_repeat_enabled(true);
        assert!(settings.repeat_enabled());
        assert!(!settings.storage_enabled());
    }

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        assert_eq!(
            "msrepeatdelay".parse::<IntSetting>().unwrap(),
            IntSetting::MsRepeatDelay
        );
        assert_eq!(
            "MOUSEEXITDELAY".parse::<IntSetting>().unwrap(),
            IntSetting::MouseExitDelay
        );
        assert!("RepeatDelay".parse::<IntSetting>().is_err());
    }

    #[test]
    fn test_max_values_match_field_widths() {
        assert_eq!(IntSetting::MajorVersion.max_value(), 255);
        assert_eq!(IntSetting::MinorVersion.max_value(), 65535);
        assert_eq!(IntSetting::MsRepeatDelay.max_value(), 2550);
    }
}
