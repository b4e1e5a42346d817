//! Modbus RTU style framing used between the host and the battery.
//!
//! A read request is:
//!
//! Byte | Meaning
//! 0    | Device id
//! 1    | Function code, 0x03 (read holding registers)
//! 2..4 | First register, big-endian
//! 4..6 | Number of registers, big-endian
//! 6..8 | MODBUS CRC over bytes 0..6, little-endian
//!
//! The response is:
//!
//! Start Byte | End Byte     | Meaning
//! 0          | 0            | Device id
//! 1          | 1            | Function code, with bit 7 set for an exception response
//! 2          | 2            | The length in bytes of the payload (the exception code for an exception)
//! 3          | x            | The payload
//! x+1        | x+2          | A MODBUS CRC over the bytes 0-x

use crc16::{State, MODBUS};

pub const READ_FUNCTION: u8 = 0x03;
const EXCEPTION_FLAG: u8 = 0x80;
const CRC_LEN: usize = 2;

/// Build a request for `words` registers starting at `register`.
pub fn read_request(device_id: u8, register: u16, words: u16) -> [u8; 8] {
    let [reg_hi, reg_lo] = register.to_be_bytes();
    let [words_hi, words_lo] = words.to_be_bytes();
    let mut rq = [device_id, READ_FUNCTION, reg_hi, reg_lo, words_hi, words_lo, 0, 0];
    let crc = crc(&rq[..6]);
    rq[6..].copy_from_slice(&crc);
    rq
}

#[derive(PartialEq, Eq, Debug)]
pub enum TryParseMessageResult {
    /// A complete, CRC checked frame, header and CRC included.
    Ok(Vec<u8>),
    Incomplete,
    /// The device answered with a Modbus exception code.
    Exception(u8),
    Invalid(&'static str),
}

/// Attempt to parse a response from `device_id` out of the bytes received so far.
///
/// The whole frame is returned on success so section parsers can keep using
/// absolute offsets.
pub fn try_parse_msg(buffer: &[u8], device_id: u8) -> TryParseMessageResult {
    if buffer.len() < 3 {
        return TryParseMessageResult::Incomplete;
    }

    if buffer[0] != device_id {
        return TryParseMessageResult::Invalid("Unexpected device id");
    }

    let expected_len = match buffer[1] {
        READ_FUNCTION => buffer[2] as usize + 3 + CRC_LEN,
        f if f == READ_FUNCTION | EXCEPTION_FLAG => 3 + CRC_LEN,
        _ => return TryParseMessageResult::Invalid("Unexpected function code"),
    };
    if buffer.len() < expected_len {
        return TryParseMessageResult::Incomplete;
    }

    if buffer.len() > expected_len {
        return TryParseMessageResult::Invalid("Too long");
    }

    let crc_actual = &buffer[buffer.len() - CRC_LEN..];
    let crc_expected = crc(&buffer[0..buffer.len() - CRC_LEN]);
    if crc_actual != crc_expected {
        return TryParseMessageResult::Invalid("CRC check failed");
    }

    if buffer[1] & EXCEPTION_FLAG != 0 {
        return TryParseMessageResult::Exception(buffer[2]);
    }

    TryParseMessageResult::Ok(buffer.to_vec())
}

/// Compute the CRC check value for the given bytes
pub(crate) fn crc(data: &[u8]) -> [u8; 2] {
    State::<MODBUS>::calculate(data).to_le_bytes()
}
