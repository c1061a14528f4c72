//! Binary configuration decoder.
//!
//! # Layout
//!
//! ```text
//! [16 bytes] header: versions, section offsets, timings, flags
//! [4n + 4]   twiddle table: (u16 BE chord word, u16 BE key or 0xFF index) until (0, 0)
//! [3m + 3]   mouse block: (u16 BE chord word, u8 action) until (0, 0)
//! [...]      multi-key table: (u16 BE descriptor, len x u16 BE key) until 0 or end of data
//! ```

use super::chord::device_word_to_twiddle;
use super::error::{CfgError, CfgWarning, Result};
use super::Cfg;
use crate::models::{Assignment, Assignments, IntSetting, KeyPress, KeyPressList, Settings, Twiddle};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::{debug, warn};

/// Size of the fixed header.
pub const HEADER_LEN: usize = 16;

/// Flag bit enabling key repeat.
pub const FLAG_REPEAT: u8 = 0x01;
/// Flag bit enabling mass storage.
pub const FLAG_STORAGE: u8 = 0x02;
/// Reserved flag bit, always set when writing.
pub const FLAG_RESERVED: u8 = 0x04;

/// Key field bit marking a multi-key table reference.
pub(crate) const MULTI_KEY_MARKER: u16 = 0x8000;

/// A mouse-button chord from the mouse block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MouseChord {
    /// Chord that triggers the action
    pub twiddle: Twiddle,
    /// Raw mouse action byte
    pub action: u8,
}

/// Everything recovered from one binary buffer.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Settings and key assignments
    pub cfg: Cfg,
    /// Mouse chords, kept apart from the key assignments
    pub mouse: Vec<MouseChord>,
    /// Recoverable problems, in the order they were found
    pub warnings: Vec<CfgWarning>,
}

/// Key side of a twiddle-table pair, resolved once the multi-key table is read.
#[derive(Debug, Clone, Copy)]
enum PendingKey {
    Single(KeyPress),
    Multi(u8),
}

/// Per-call decoder state.
struct DecodeContext<'a> {
    label: &'a str,
    warned: HashSet<u16>,
    warnings: Vec<CfgWarning>,
}

impl<'a> DecodeContext<'a> {
    fn new(label: &'a str) -> Self {
        Self {
            label,
            warned: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Records an invalid key code, once per distinct code.
    fn invalid_key(&mut self, code: u16, location: String) {
        if !self.warned.insert(code) {
            return;
        }
        let warning = CfgWarning::InvalidKeyCode {
            path: self.label.to_string(),
            code,
            location,
        };
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Cursor over the input that reports short reads as truncation.
struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
    label: &'a str,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8], label: &'a str) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            label,
        }
    }

    fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len();
        len.saturating_sub(usize::try_from(self.cursor.position()).unwrap_or(len))
    }

    fn truncated(&self, section: &'static str, offset: u64) -> CfgError {
        CfgError::Truncated {
            path: self.label.to_string(),
            section,
            offset,
        }
    }

    fn u8(&mut self, section: &'static str) -> Result<u8> {
        let offset = self.position();
        self.cursor
            .read_u8()
            .map_err(|_| self.truncated(section, offset))
    }

    fn u16_be(&mut self, section: &'static str) -> Result<u16> {
        let offset = self.position();
        self.cursor
            .read_u16::<BigEndian>()
            .map_err(|_| self.truncated(section, offset))
    }

    fn u16_le(&mut self, section: &'static str) -> Result<u16> {
        let offset = self.position();
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.truncated(section, offset))
    }
}

/// Section offsets as recorded in the header.
struct HeaderOffsets {
    end_of_twiddles: u16,
    start_of_multi: u16,
}

/// Decodes a binary configuration.
///
/// `label` names the source (usually its path) in errors and warnings.
/// Corruption yields an error and no partial result.
///
/// # Errors
///
/// Returns [`CfgError::Truncated`], [`CfgError::TerminatorMismatch`],
/// [`CfgError::MalformedMultiKey`] or [`CfgError::DanglingMultiKeyIndex`]
/// when the buffer is structurally invalid.
pub fn decode(bytes: &[u8], label: &str) -> Result<Decoded> {
    let mut reader = ByteReader::new(bytes, label);
    let mut ctx = DecodeContext::new(label);

    let (settings, offsets) = read_header(&mut reader)?;
    let pending = read_twiddle_table(&mut reader, &mut ctx)?;
    let end_of_twiddles = reader.position();
    let mouse = read_mouse_block(&mut reader)?;
    let start_of_multi = reader.position();
    let entries = read_multi_key_table(&mut reader, &mut ctx)?;

    if u64::from(offsets.end_of_twiddles) != end_of_twiddles
        || u64::from(offsets.start_of_multi) != start_of_multi
    {
        debug!(
            "{label}: header offsets ({}, {}) differ from layout ({end_of_twiddles}, {start_of_multi})",
            offsets.end_of_twiddles, offsets.start_of_multi
        );
    }
    debug!(
        "{label}: {} twiddle pairs, {} mouse chords, {} multi-key entries",
        pending.len(),
        mouse.len(),
        entries.len()
    );

    let assignments = finalize(pending, &entries, label)?;
    for remap in assignments.remaps() {
        let warning = CfgWarning::Remap {
            path: label.to_string(),
            remap,
        };
        warn!("{warning}");
        ctx.warnings.push(warning);
    }

    Ok(Decoded {
        cfg: Cfg {
            settings,
            assignments,
        },
        mouse,
        warnings: ctx.warnings,
    })
}

fn read_header(reader: &mut ByteReader<'_>) -> Result<(Settings, HeaderOffsets)> {
    const SECTION: &str = "header";
    let mut settings = Settings::default();

    settings.set(IntSetting::MajorVersion, reader.u8(SECTION)?.into());
    settings.set(IntSetting::MinorVersion, reader.u16_le(SECTION)?.into());
    let offsets = HeaderOffsets {
        end_of_twiddles: reader.u16_le(SECTION)?,
        start_of_multi: reader.u16_le(SECTION)?,
    };
    settings.set(IntSetting::MouseExitDelay, reader.u16_le(SECTION)?.into());
    settings.set(IntSetting::MsBetweenTwiddles, reader.u16_le(SECTION)?.into());
    settings.set(IntSetting::StartSpeed, reader.u8(SECTION)?.into());
    settings.set(IntSetting::FastSpeed, reader.u8(SECTION)?.into());
    settings.set(IntSetting::MouseAcceleration, reader.u8(SECTION)?.into());
    settings.set(IntSetting::MsRepeatDelay, u32::from(reader.u8(SECTION)?) * 10);

    let flags = reader.u8(SECTION)?;
    settings.set_repeat_enabled(flags & FLAG_REPEAT != 0);
    settings.set_storage_enabled(flags & FLAG_STORAGE != 0);

    Ok((settings, offsets))
}

fn read_twiddle_table(
    reader: &mut ByteReader<'_>,
    ctx: &mut DecodeContext<'_>,
) -> Result<Vec<(Twiddle, PendingKey)>> {
    const SECTION: &str = "twiddle table";
    let mut pending = Vec::new();

    loop {
        let offset = reader.position();
        let chord_word = reader.u16_be(SECTION)?;
        let key = reader.u16_be(SECTION)?;

        match (chord_word, key) {
            (0, 0) => break,
            (0, _) | (_, 0) => {
                return Err(CfgError::TerminatorMismatch {
                    path: ctx.label.to_string(),
                    section: SECTION,
                    offset,
                    chord_word,
                    key,
                })
            }
            _ => {}
        }

        let twiddle = device_word_to_twiddle(chord_word);
        if key & MULTI_KEY_MARKER != 0 {
            let [_, index] = key.to_be_bytes();
            pending.push((twiddle, PendingKey::Multi(index)));
            continue;
        }

        let key_press = KeyPress::from_code(key);
        if !key_press.is_valid() {
            ctx.invalid_key(key, format!("twiddle table ({twiddle})"));
            continue;
        }
        pending.push((twiddle, PendingKey::Single(key_press)));
    }

    Ok(pending)
}

fn read_mouse_block(reader: &mut ByteReader<'_>) -> Result<Vec<MouseChord>> {
    const SECTION: &str = "mouse block";
    let mut mouse = Vec::new();

    loop {
        let offset = reader.position();
        let chord_word = reader.u16_be(SECTION)?;
        let action = reader.u8(SECTION)?;

        match (chord_word, action) {
            (0, 0) => break,
            (0, _) | (_, 0) => {
                return Err(CfgError::TerminatorMismatch {
                    path: reader.label.to_string(),
                    section: SECTION,
                    offset,
                    chord_word,
                    key: action.into(),
                })
            }
            _ => mouse.push(MouseChord {
                twiddle: device_word_to_twiddle(chord_word),
                action,
            }),
        }
    }

    Ok(mouse)
}

fn read_multi_key_table(
    reader: &mut ByteReader<'_>,
    ctx: &mut DecodeContext<'_>,
) -> Result<Vec<KeyPressList>> {
    const SECTION: &str = "multi-key table";
    let mut entries = Vec::new();

    // The table may end with a zero descriptor or simply at the end of data
    while reader.remaining() > 0 {
        let descriptor = reader.u16_be(SECTION)?;
        if descriptor == 0 {
            break;
        }

        let index = entries.len();
        let len = usize::from((descriptor >> 9) & 0xFF);
        if len < 2 {
            return Err(CfgError::MalformedMultiKey {
                path: ctx.label.to_string(),
                index,
                descriptor,
            });
        }

        let mut keys: Option<KeyPressList> = None;
        for _ in 0..len - 1 {
            let code = reader.u16_be(SECTION)?;
            let key = KeyPress::from_code(code);
            if !key.is_valid() {
                ctx.invalid_key(code, format!("multi-key entry {index}"));
            }
            match keys.as_mut() {
                Some(list) => list.push(key),
                None => keys = Some(KeyPressList::new(key)),
            }
        }
        entries.extend(keys);
    }

    Ok(entries)
}

/// Turns recorded pairs into assignments in twiddle-table order.
fn finalize(
    pending: Vec<(Twiddle, PendingKey)>,
    entries: &[KeyPressList],
    label: &str,
) -> Result<Assignments> {
    pending
        .into_iter()
        .map(|(twiddle, key)| match key {
            PendingKey::Single(key) => Ok(Assignment::new(twiddle, KeyPressList::new(key))),
            PendingKey::Multi(index) => entries
                .get(usize::from(index))
                .map(|keys| Assignment::new(twiddle, keys.clone()))
                .ok_or_else(|| CfgError::DanglingMultiKeyIndex {
                    path: label.to_string(),
                    index,
                    entries: entries.len(),
                }),
        })
        .collect()
}
