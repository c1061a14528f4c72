//! Chord gestures ("twiddles") and their text notation.

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Number of finger columns on the device.
pub const FINGER_COUNT: usize = 4;

/// Characters used for the finger column values 0..=3 in text notation.
const FINGER_CHARS: [char; 4] = ['0', 'L', 'M', 'R'];

/// One of the four thumb keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Thumb {
    /// Num thumb key (bit 0)
    Num,
    /// Alt thumb key (bit 1)
    Alt,
    /// Ctrl thumb key (bit 2)
    Ctrl,
    /// Shift thumb key (bit 3)
    Shift,
}

impl Thumb {
    /// All thumb keys in mask bit order.
    pub const ALL: [Self; 4] = [Self::Num, Self::Alt, Self::Ctrl, Self::Shift];

    /// Bit in the 4-bit thumb mask.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Num => 0x1,
            Self::Alt => 0x2,
            Self::Ctrl => 0x4,
            Self::Shift => 0x8,
        }
    }

    /// Letter used in text notation.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Num => 'N',
            Self::Alt => 'A',
            Self::Ctrl => 'C',
            Self::Shift => 'S',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|thumb| thumb.letter() == c.to_ascii_uppercase())
    }
}

/// A chord gesture: four 2-bit finger columns plus a 4-bit thumb mask.
///
/// The chord pattern stores the first finger in its two most significant bits.
/// A column value of 0 means the finger is not pressed; 1..=3 select one of the
/// three buttons in that column.
///
/// # Examples
///
/// ```
/// use twiddlecfg::models::Twiddle;
///
/// let twiddle: Twiddle = "NS0MR0".parse().unwrap();
/// assert_eq!(twiddle.chord(), 0b0010_1100);
/// assert_eq!(twiddle.thumbs(), 0b1001);
/// assert_eq!(twiddle.to_string(), "NS0MR0");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
pub struct Twiddle {
    chord: u8,
    thumbs: u8,
}

impl Twiddle {
    /// Creates a twiddle, rejecting thumb bits above the low nibble and the empty gesture.
    pub fn new(chord: u8, thumbs: u8) -> Result<Self> {
        if thumbs > 0x0F {
            anyhow::bail!("Thumb mask {thumbs:#x} uses more than 4 bits");
        }
        if chord == 0 && thumbs == 0 {
            anyhow::bail!("A twiddle must press at least one key");
        }
        Ok(Self { chord, thumbs })
    }

    /// Builds a twiddle from raw fields, masking the thumb mask to 4 bits.
    #[must_use]
    pub const fn from_raw(chord: u8, thumbs: u8) -> Self {
        Self {
            chord,
            thumbs: thumbs & 0x0F,
        }
    }

    /// Packed 4×2-bit finger columns.
    #[must_use]
    pub const fn chord(&self) -> u8 {
        self.chord
    }

    /// 4-bit thumb mask.
    #[must_use]
    pub const fn thumbs(&self) -> u8 {
        self.thumbs
    }

    /// Column value (0..=3) for finger `index` (0 = first finger).
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`FINGER_COUNT`].
    #[must_use]
    pub fn finger(&self, index: usize) -> u8 {
        assert!(index < FINGER_COUNT, "finger index {index} out of range");
        (self.chord >> (6 - 2 * index)) & 0b11
    }

    /// Whether the given thumb key is part of this chord.
    #[must_use]
    pub const fn has_thumb(&self, thumb: Thumb) -> bool {
        self.thumbs & thumb.bit() != 0
    }
}

impl fmt::Display for Twiddle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for thumb in Thumb::ALL {
            if self.has_thumb(thumb) {
                write!(f, "{}", thumb.letter())?;
            }
        }
        for index in 0..FINGER_COUNT {
            write!(f, "{}", FINGER_CHARS[self.finger(index) as usize])?;
        }
        Ok(())
    }
}

impl FromStr for Twiddle {
    type Err = anyhow::Error;

    /// Parses `[thumbs]fingers`, e.g. `L000`, `NS0MR0`.
    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() < FINGER_COUNT {
            anyhow::bail!("Invalid twiddle '{s}': expected four finger columns (0, L, M or R)");
        }
        let (thumb_chars, finger_chars) = chars.split_at(chars.len() - FINGER_COUNT);

        let mut thumbs = 0;
        for &c in thumb_chars {
            let thumb = Thumb::from_letter(c).ok_or_else(|| {
                anyhow::anyhow!("Invalid thumb key '{c}' in twiddle '{s}' (expected N, A, C or S)")
            })?;
            thumbs |= thumb.bit();
        }

        let mut chord = 0;
        for &c in finger_chars {
            let value = FINGER_CHARS
                .iter()
                .position(|&f| f == c.to_ascii_uppercase())
                .ok_or_else(|| {
                    anyhow::anyhow!("Invalid finger column '{c}' in twiddle '{s}' (expected 0, L, M or R)")
                })?;
            chord = (chord << 2) | value as u8;
        }

        Self::new(chord, thumbs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finger_columns_first_finger_most_significant() {
        let twiddle = Twiddle::from_raw(0b0100_0000, 0);
        assert_eq!(twiddle.finger(0), 1);
        assert_eq!(twiddle.finger(1), 0);
        assert_eq!(twiddle.to_string(), "L000");
    }

    #[test]
    fn test_parse_with_thumbs() {
        let twiddle: Twiddle = "NS0MR0".parse().unwrap();
        assert!(twiddle.has_thumb(Thumb::Num));
        assert!(twiddle.has_thumb(Thumb::Shift));
        assert!(!twiddle.has_thumb(Thumb::Alt));
        assert_eq!(twiddle.finger(1), 2);
        assert_eq!(twiddle.finger(2), 3);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let lower: Twiddle = "a0lmr".parse().unwrap();
        let upper: Twiddle = "A0LMR".parse().unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_display_orders_thumbs() {
        let twiddle: Twiddle = "SN000R".parse().unwrap();
        assert_eq!(twiddle.to_string(), "NS000R");
    }

    #[test]
    fn test_thumb_only_twiddle() {
        let twiddle: Twiddle = "C0000".parse().unwrap();
        assert_eq!(twiddle.chord(), 0);
        assert_eq!(twiddle.thumbs(), Thumb::Ctrl.bit());
    }

    #[test]
    fn test_rejects_empty_and_malformed() {
        assert!("0000".parse::<Twiddle>().is_err());
        assert!("L00".parse::<Twiddle>().is_err());
        assert!("XL000".parse::<Twiddle>().is_err());
        assert!("L00Q".parse::<Twiddle>().is_err());
        assert!(Twiddle::new(0x40, 0x10).is_err());
    }

    #[test]
    fn test_from_raw_masks_thumbs() {
        assert_eq!(Twiddle::from_raw(0, 0xF3).thumbs(), 0x03);
    }
}
