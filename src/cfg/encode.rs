//! Binary configuration encoder.

use super::chord::twiddle_to_device_word;
use super::decode::{FLAG_REPEAT, FLAG_RESERVED, FLAG_STORAGE, HEADER_LEN, MULTI_KEY_MARKER};
use super::error::{CfgError, CfgWarning, Result};
use super::Cfg;
use crate::models::{IntSetting, KeyPressList, Settings};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use tracing::{debug, warn};

/// Built-in mouse block written into every configuration, terminator included.
pub const MOUSE_PAYLOAD: [u8; 39] = [
    0x08, 0x00, 0x02, 0x04, 0x00, 0x04, 0x02, 0x00, 0x01, 0x80, 0x00, 0x82, 0x40, 0x00, 0x84, 0x20,
    0x00, 0x81, 0x00, 0x08, 0x21, 0x00, 0x04, 0x11, 0x00, 0x02, 0x41, 0x00, 0x80, 0xA1, 0x00, 0x40,
    0x0A, 0x00, 0x20, 0x09, 0x00, 0x00, 0x00,
];

/// Most entries the one-byte multi-key index can address.
pub const MAX_MULTI_KEY_ENTRIES: usize = 256;

/// Longest key list the 7-bit descriptor length can describe.
pub const MAX_MULTI_KEY_LEN: usize = 126;

/// Size of one twiddle-table pair.
const PAIR_LEN: usize = 4;

/// An encoded buffer and the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// Complete file contents
    pub bytes: Vec<u8>,
    /// Parity self-check findings
    pub warnings: Vec<CfgWarning>,
}

/// Key field of one twiddle-table pair.
#[derive(Debug, Clone, Copy)]
enum KeyField {
    Code(u16),
    MultiIndex(u8),
}

/// A fully validated layout, ready to serialize.
struct Plan<'a> {
    pairs: Vec<(u16, KeyField)>,
    multi: Vec<&'a KeyPressList>,
    end_of_twiddles: u16,
    start_of_multi: u16,
    total_len: usize,
}

/// Encodes settings and assignments into the device layout.
///
/// Everything is validated and sized before the first byte is written.
///
/// # Errors
///
/// Returns [`CfgError::Unencodable`] when a setting does not fit its field
/// (`MsRepeatDelay` must also be a multiple of 10), when there are more than
/// [`MAX_MULTI_KEY_ENTRIES`] multi-key lists, when a list is longer than
/// [`MAX_MULTI_KEY_LEN`], or when a key code of 0 or an empty twiddle is assigned.
///
/// A single key with the right-GUI bit (`0x8000`) collides with the multi-key
/// marker, so it is stored as a one-key multi-key entry.
pub fn encode(cfg: &Cfg) -> Result<Encoded> {
    check_settings(&cfg.settings)?;
    let plan = plan(cfg)?;
    debug!(
        "Encoding {} pairs, {} multi-key entries: end of twiddles {}, start of multi {}, {} bytes",
        plan.pairs.len(),
        plan.multi.len(),
        plan.end_of_twiddles,
        plan.start_of_multi,
        plan.total_len
    );

    let mut bytes = Vec::with_capacity(plan.total_len);
    write_header(&mut bytes, &cfg.settings, &plan)?;

    for (word, key) in &plan.pairs {
        bytes.write_u16::<BigEndian>(*word)?;
        match key {
            KeyField::Code(code) => bytes.write_u16::<BigEndian>(*code)?,
            KeyField::MultiIndex(index) => {
                bytes.write_u8(0xFF)?;
                bytes.write_u8(*index)?;
            }
        }
    }
    bytes.write_u32::<BigEndian>(0)?;
    bytes.extend_from_slice(&MOUSE_PAYLOAD);

    for keys in &plan.multi {
        let descriptor = u16::try_from((keys.len() + 1) << 9)
            .map_err(|_| CfgError::Unencodable(format!("multi-key list too long: {keys}")))?;
        bytes.write_u16::<BigEndian>(descriptor)?;
        for key in keys.iter() {
            bytes.write_u16::<BigEndian>(key.code())?;
        }
    }

    let mut warnings = Vec::new();
    if let Some(warning) = parity_check(bytes.len()) {
        warn!("{warning}");
        warnings.push(warning);
    }
    debug_assert_eq!(bytes.len(), plan.total_len);

    Ok(Encoded { bytes, warnings })
}

fn check_settings(settings: &Settings) -> Result<()> {
    for setting in IntSetting::ALL {
        let value = settings.get(setting);
        if value > setting.max_value() {
            return Err(CfgError::Unencodable(format!(
                "{setting} {value} exceeds {}",
                setting.max_value()
            )));
        }
    }

    let delay = settings.get(IntSetting::MsRepeatDelay);
    if delay % 10 != 0 {
        return Err(CfgError::Unencodable(format!(
            "{} {delay} is not a multiple of 10",
            IntSetting::MsRepeatDelay
        )));
    }
    Ok(())
}

fn plan(cfg: &Cfg) -> Result<Plan<'_>> {
    let mut pairs = Vec::with_capacity(cfg.assignments.twiddle_count());
    let mut multi = Vec::new();

    for assignment in &cfg.assignments {
        let keys = assignment.keys();
        let first = keys.first().code();
        // A direct key field cannot carry the marker bit, so RGui keys go through the table
        let key_field = if keys.is_multi() || first & MULTI_KEY_MARKER != 0 {
            if keys.len() > MAX_MULTI_KEY_LEN {
                return Err(CfgError::Unencodable(format!(
                    "multi-key list of {} keys exceeds {MAX_MULTI_KEY_LEN}",
                    keys.len()
                )));
            }
            let index = u8::try_from(multi.len()).map_err(|_| {
                CfgError::Unencodable(format!(
                    "more than {MAX_MULTI_KEY_ENTRIES} multi-key assignments"
                ))
            })?;
            multi.push(keys);
            KeyField::MultiIndex(index)
        } else if first == 0 {
            return Err(CfgError::Unencodable(
                "key code 0x0000 would end the twiddle table".to_string(),
            ));
        } else {
            KeyField::Code(first)
        };

        for twiddle in assignment.twiddles() {
            let word = twiddle_to_device_word(*twiddle);
            if word == 0 {
                return Err(CfgError::Unencodable(format!(
                    "empty twiddle assigned to '{keys}'"
                )));
            }
            pairs.push((word, key_field));
        }
    }

    let end_of_twiddles = HEADER_LEN + (pairs.len() + 1) * PAIR_LEN;
    let start_of_multi = end_of_twiddles + MOUSE_PAYLOAD.len();
    let multi_len: usize = multi.iter().map(|keys| (keys.len() + 1) * 2).sum();
    let total_len = start_of_multi + multi_len;

    let (Ok(end_of_twiddles), Ok(start_of_multi)) =
        (u16::try_from(end_of_twiddles), u16::try_from(start_of_multi))
    else {
        return Err(CfgError::Unencodable(format!(
            "{} twiddles overflow the header offsets",
            pairs.len()
        )));
    };

    Ok(Plan {
        end_of_twiddles,
        start_of_multi,
        pairs,
        multi,
        total_len,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn write_header(bytes: &mut Vec<u8>, settings: &Settings, plan: &Plan<'_>) -> Result<()> {
    // Values were range-checked in check_settings
    bytes.write_u8(settings.get(IntSetting::MajorVersion) as u8)?;
    bytes.write_u16::<LittleEndian>(settings.get(IntSetting::MinorVersion) as u16)?;
    bytes.write_u16::<LittleEndian>(plan.end_of_twiddles)?;
    bytes.write_u16::<LittleEndian>(plan.start_of_multi)?;
    bytes.write_u16::<LittleEndian>(settings.get(IntSetting::MouseExitDelay) as u16)?;
    bytes.write_u16::<LittleEndian>(settings.get(IntSetting::MsBetweenTwiddles) as u16)?;
    bytes.write_u8(settings.get(IntSetting::StartSpeed) as u8)?;
    bytes.write_u8(settings.get(IntSetting::FastSpeed) as u8)?;
    bytes.write_u8(settings.get(IntSetting::MouseAcceleration) as u8)?;
    bytes.write_u8((settings.get(IntSetting::MsRepeatDelay) / 10) as u8)?;

    let mut flags = FLAG_RESERVED;
    if settings.repeat_enabled() {
        flags |= FLAG_REPEAT;
    }
    if settings.storage_enabled() {
        flags |= FLAG_STORAGE;
    }
    bytes.write_u8(flags)?;
    Ok(())
}

/// Flags a written length whose predecessor is neither a multiple of 4 nor of 2.
fn parity_check(len: usize) -> Option<CfgWarning> {
    let last = len.checked_sub(1)?;
    (last % 4 != 0 && last % 2 != 0).then_some(CfgWarning::OddByteCount { len })
}
