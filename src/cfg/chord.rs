//! Conversion between device chord words and twiddles.
//!
//! The device stores a twiddle as one 16-bit word made of four nibbles. Bit 0
//! of each nibble is a thumb key; bits 1..=3 select the row pressed in one
//! finger column. Nibbles are stored swapped within each byte, so the finger
//! columns appear in the order 1, 0, 3, 2 and the thumb bits in the order
//! 1, 0, 2, 3.

use crate::models::{Twiddle, FINGER_COUNT};

/// Nibble holding each finger column, first finger first.
const COLUMN_NIBBLE: [u32; FINGER_COUNT] = [1, 0, 3, 2];

/// Nibble holding each thumb bit, bit 0 first.
const THUMB_NIBBLE: [u32; 4] = [1, 0, 2, 3];

/// Extracts the packed finger columns from a device chord word.
///
/// A nibble with several row bits set collapses to the OR of the row numbers,
/// so distinct words can decode to the same chord.
///
/// # Examples
///
/// ```
/// use twiddlecfg::cfg::chord::device_word_to_chord;
///
/// assert_eq!(device_word_to_chord(0x0020), 0b0100_0000);
/// ```
#[must_use]
pub fn device_word_to_chord(word: u16) -> u8 {
    let mut cfg = ((word & 0xF0F0) >> 4) | ((word & 0x0F0F) << 4);
    let mut chord: u8 = 0;
    for _ in 0..FINGER_COUNT {
        chord <<= 2;
        for row in 1..4u8 {
            if cfg & (1 << row) != 0 {
                chord |= row;
            }
        }
        cfg >>= 4;
    }
    chord
}

/// Extracts the 4-bit thumb mask from a device chord word.
#[must_use]
pub fn device_word_to_thumbs(word: u16) -> u8 {
    let mut cfg = ((word & 0x00F0) >> 4) | ((word & 0x000F) << 4) | (word & 0xFF00);
    let mut thumbs = 0;
    for bit in 0..4 {
        if cfg & 1 != 0 {
            thumbs |= 1 << bit;
        }
        cfg >>= 4;
    }
    thumbs
}

/// Decodes a device chord word into a twiddle.
#[must_use]
pub fn device_word_to_twiddle(word: u16) -> Twiddle {
    Twiddle::from_raw(device_word_to_chord(word), device_word_to_thumbs(word))
}

/// Packs a twiddle into its canonical device chord word.
///
/// Each pressed column sets exactly one row bit, so the result always decodes
/// back to an equal twiddle.
///
/// # Examples
///
/// ```
/// use twiddlecfg::cfg::chord::{device_word_to_twiddle, twiddle_to_device_word};
/// use twiddlecfg::models::Twiddle;
///
/// let twiddle: Twiddle = "NS0MR0".parse().unwrap();
/// let word = twiddle_to_device_word(twiddle);
/// assert_eq!(device_word_to_twiddle(word), twiddle);
/// ```
#[must_use]
pub fn twiddle_to_device_word(twiddle: Twiddle) -> u16 {
    let mut word = 0u16;
    for (index, nibble) in COLUMN_NIBBLE.iter().enumerate() {
        let row = u32::from(twiddle.finger(index));
        if row != 0 {
            word |= 1 << (4 * nibble + row);
        }
    }
    for (bit, nibble) in THUMB_NIBBLE.iter().enumerate() {
        if twiddle.thumbs() & (1 << bit) != 0 {
            word |= 1 << (4 * nibble);
        }
    }
    word
}
