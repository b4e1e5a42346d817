//! Byte and bit level helpers shared by every section parser.
//!
//! All offsets are absolute positions in the raw response frame, i.e. byte 0 is
//! the device id, byte 1 the function code, byte 2 the payload length and the
//! payload starts at byte 3. Multi-byte values are big-endian.

use crate::error::DecodeError;
use crate::value::Value;

/// Text encodings used by the string registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Ascii,
    Utf8,
}

/// Borrow `width` bytes at `offset`, failing instead of truncating.
pub fn field_bytes(frame: &[u8], offset: usize, width: usize) -> Result<&[u8], DecodeError> {
    offset
        .checked_add(width)
        .filter(|&end| end <= frame.len())
        .map(|end| &frame[offset..end])
        .ok_or(DecodeError::OutOfRange {
            offset,
            width,
            len: frame.len(),
        })
}

/// Read an unsigned big-endian integer of 1 to 8 bytes.
pub fn read_uint(frame: &[u8], offset: usize, width: usize) -> Result<u64, DecodeError> {
    if width == 0 || width > 8 {
        return Err(DecodeError::UnsupportedWidth(width));
    }
    let bytes = field_bytes(frame, offset, width)?;
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Read a two's-complement big-endian integer of 1 to 8 bytes, sign extended
/// from the field width.
pub fn read_int(frame: &[u8], offset: usize, width: usize) -> Result<i64, DecodeError> {
    let raw = read_uint(frame, offset, width)?;
    let unused = 64 - 8 * width as u32;
    Ok(((raw << unused) as i64) >> unused)
}

/// Extract a register value, optionally signed, multiplied by `scale`.
///
/// A scale of exactly `1.0` yields [`Value::Int`]; anything else yields
/// [`Value::Float`] rounded to the precision the scale implies, so a raw
/// `2401` with scale `0.1` is exactly `240.1`.
pub fn extract_value(
    frame: &[u8],
    offset: usize,
    width: usize,
    signed: bool,
    scale: f64,
) -> Result<Value, DecodeError> {
    let raw = if signed {
        read_int(frame, offset, width)?
    } else {
        // an unsigned 8 byte field above i64::MAX cannot be represented
        i64::try_from(read_uint(frame, offset, width)?)
            .map_err(|_| DecodeError::UnsupportedWidth(width))?
    };

    if scale == 1.0 {
        Ok(Value::Int(raw))
    } else {
        Ok(Value::Float(apply_scale(raw, scale)))
    }
}

fn apply_scale(raw: i64, scale: f64) -> f64 {
    let scaled = raw as f64 * scale;
    if scale <= 0.0 || scale >= 1.0 {
        return scaled;
    }
    let decimals = (-scale.log10() - 1e-9).ceil().min(9.0) as i32;
    let factor = 10f64.powi(decimals);
    (scaled * factor).round() / factor
}

/// Decode a text register. Trailing NUL padding is stripped.
///
/// Bytes that are not valid for `encoding` are returned as a hex string so a
/// garbled name never fails the whole section.
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> String {
    let decoded = match encoding {
        TextEncoding::Ascii if !bytes.is_ascii() => None,
        TextEncoding::Ascii | TextEncoding::Utf8 => std::str::from_utf8(bytes).ok(),
    };

    match decoded {
        Some(text) => text.trim_end_matches('\0').to_owned(),
        None => {
            let h = hex::encode(bytes);
            log::warn!("Failed to decode {encoding:?} text, keeping raw bytes 0x{h}");
            h
        }
    }
}

/// Decode a two word version register: two 2-character segments, e.g. `"01"`
/// and `"05"`, read as the decimal number `1.05`.
pub fn decode_version(bytes: &[u8]) -> Result<f64, DecodeError> {
    if bytes.len() != 4 {
        return Err(DecodeError::MalformedVersion(format!(
            "expected 4 bytes, got {}",
            bytes.len()
        )));
    }
    let major = version_segment(&bytes[0..2])?;
    let minor = version_segment(&bytes[2..4])?;
    let version = format!("{major}.{minor}");
    version
        .parse::<f64>()
        .map_err(|_| DecodeError::MalformedVersion(format!("{version:?} is not a number")))
}

fn version_segment(bytes: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(bytes)
        .map_err(|_| DecodeError::MalformedVersion(format!("invalid text 0x{}", hex::encode(bytes))))
}

/// Label for the Modbus function code at byte 1.
pub fn function_label(code: u64) -> &'static str {
    match code {
        3 => "READ",
        6 => "WRITE",
        _ => "unknown",
    }
}
