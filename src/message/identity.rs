//! Text and version registers: serial number, names and firmware versions.

use super::{ParseContext, SectionFields};
use crate::error::DecodeError;
use crate::primitives::{decode_text, decode_version, extract_value, field_bytes, TextEncoding};

pub(crate) const SERIAL_NUMBER_REGISTER: u16 = 5110;
pub(crate) const SERIAL_NUMBER_WORDS: u16 = 8;
pub(crate) const MANUFACTURE_VERSION_REGISTER: u16 = 5118;
pub(crate) const MANUFACTURE_VERSION_WORDS: u16 = 1;
pub(crate) const MAIN_LINE_VERSION_REGISTER: u16 = 5119;
pub(crate) const MAIN_LINE_VERSION_WORDS: u16 = 2;
pub(crate) const COMMUNICATION_VERSION_REGISTER: u16 = 5121;
pub(crate) const COMMUNICATION_VERSION_WORDS: u16 = 1;
pub(crate) const BATTERY_NAME_REGISTER: u16 = 5122;
pub(crate) const BATTERY_NAME_WORDS: u16 = 8;
pub(crate) const SOFTWARE_VERSION_REGISTER: u16 = 5130;
pub(crate) const SOFTWARE_VERSION_WORDS: u16 = 2;
pub(crate) const MANUFACTURER_NAME_REGISTER: u16 = 5132;
pub(crate) const MANUFACTURER_NAME_WORDS: u16 = 10;

fn text_section(
    frame: &[u8],
    field: &str,
    len: usize,
    encoding: TextEncoding,
) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    fields.insert(field, decode_text(field_bytes(frame, 3, len)?, encoding));
    Ok(fields)
}

/// A malformed version is recorded against its field, the rest of the
/// section still merges.
fn version_section(frame: &[u8], field: &str) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    match decode_version(field_bytes(frame, 3, 4)?) {
        Ok(version) => fields.insert(field, version),
        Err(err) => {
            log::warn!("Failed to decode {field}: {err}");
            fields.record_error(field, err);
        }
    }
    Ok(fields)
}

pub(crate) fn parse_serial_number(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    text_section(frame, "serial_number", 16, TextEncoding::Ascii)
}

pub(crate) fn parse_manufacture_version(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    text_section(frame, "manufacture_version", 2, TextEncoding::Utf8)
}

pub(crate) fn parse_main_line_version(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    version_section(frame, "main_line_version")
}

pub(crate) fn parse_communication_version(
    frame: &[u8],
    _ctx: &ParseContext,
) -> Result<SectionFields, DecodeError> {
    text_section(frame, "communication_protocol_version", 2, TextEncoding::Utf8)
}

/// The battery name section also reports the responding device id from byte 0.
pub(crate) fn parse_battery_name(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let mut fields = text_section(frame, "battery_name", 16, TextEncoding::Utf8)?;
    fields.insert("device", extract_value(frame, 0, 1, false, 1.0)?);
    Ok(fields)
}

pub(crate) fn parse_software_version(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    version_section(frame, "software_version")
}

pub(crate) fn parse_manufacturer_name(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    text_section(frame, "manufacturer_name", 20, TextEncoding::Utf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery_state::BatteryState;
    use crate::config::TemperatureUnit;
    use crate::message::test_frame;
    use crate::value::Value;

    type Parser = fn(&[u8], &ParseContext) -> Result<SectionFields, DecodeError>;

    fn parse_payload(parser: Parser, payload: &[u8]) -> Result<SectionFields, DecodeError> {
        let state = BatteryState::default();
        let ctx = ParseContext { temperature_unit: TemperatureUnit::Celsius, state: &state };
        parser(&test_frame(payload), &ctx)
    }

    #[test]
    fn test_serial_number() {
        let fields = parse_payload(parse_serial_number, b"2209RB1000345\0\0\0").unwrap();
        assert_eq!(fields.get("function"), Some(&Value::from("READ")));
        assert_eq!(fields.get("serial_number"), Some(&Value::from("2209RB1000345")));
    }

    #[test]
    fn test_serial_number_not_ascii() {
        let mut payload = b"2209RB10003\0\0\0\0\0".to_vec();
        payload[4] = 0xb2;
        let fields = parse_payload(parse_serial_number, &payload).unwrap();
        // the raw bytes, padding included
        assert_eq!(
            fields.get("serial_number"),
            Some(&Value::from("32323039b24231303030330000000000"))
        );
    }

    #[test]
    fn test_battery_name_and_device() {
        let fields = parse_payload(parse_battery_name, b"RBT100LFP12S-G1\0").unwrap();
        assert_eq!(fields.get("battery_name"), Some(&Value::from("RBT100LFP12S-G1")));
        assert_eq!(fields.get("device"), Some(&Value::Int(0x30)));
    }

    #[test]
    fn test_short_versions_and_names() {
        let fields = parse_payload(parse_manufacture_version, b"10").unwrap();
        assert_eq!(fields.get("manufacture_version"), Some(&Value::from("10")));

        let fields = parse_payload(parse_communication_version, b"02").unwrap();
        assert_eq!(fields.get("communication_protocol_version"), Some(&Value::from("02")));

        let fields = parse_payload(parse_manufacturer_name, b"RENOGY\0\0\0\0\0\0\0\0\0\0\0\0\0\0").unwrap();
        assert_eq!(fields.get("manufacturer_name"), Some(&Value::from("RENOGY")));
    }

    #[test]
    fn test_versions() {
        let fields = parse_payload(parse_main_line_version, b"0105").unwrap();
        assert_eq!(fields.get("main_line_version"), Some(&Value::Float(1.05)));

        let fields = parse_payload(parse_software_version, b"0210").unwrap();
        assert_eq!(fields.get("software_version"), Some(&Value::Float(2.1)));
    }

    #[test]
    fn test_malformed_version_keeps_other_fields() {
        let fields = parse_payload(parse_software_version, &[0xff, 0xfe, 0x30, 0x31]).unwrap();
        assert_eq!(fields.get("function"), Some(&Value::from("READ")));
        assert!(fields.get("software_version").is_none());
        assert!(matches!(fields.error("software_version"), Some(DecodeError::MalformedVersion(_))));
    }

    #[test]
    fn test_truncated_text_fails() {
        let err = parse_payload(parse_serial_number, b"2209").unwrap_err();
        assert!(matches!(err, DecodeError::OutOfRange { offset: 3, width: 16, .. }));
    }
}
