//! Device configuration block and the single value device registers.

use super::{ParseContext, SectionFields};
use crate::error::DecodeError;

pub(crate) const CONFIGURATION_REGISTER: u16 = 5200;
pub(crate) const CONFIGURATION_WORDS: u16 = 22;
pub(crate) const ADDRESS_REGISTER: u16 = 5223;
pub(crate) const ADDRESS_WORDS: u16 = 1;
pub(crate) const UNIQUE_ID_REGISTER: u16 = 5226;
pub(crate) const UNIQUE_ID_WORDS: u16 = 2;
pub(crate) const CHARGE_POWER_REGISTER: u16 = 5228;
pub(crate) const CHARGE_POWER_WORDS: u16 = 1;
pub(crate) const DISCHARGE_POWER_REGISTER: u16 = 5229;
pub(crate) const DISCHARGE_POWER_WORDS: u16 = 1;

const VOLTS: f64 = 0.1;
const DEGREES: f64 = 0.1;
const AMPS: f64 = 0.01;

/// `(field, offset, scale, signed)` for each configured limit, one word each.
const CONFIGURATION_LIMITS: [(&str, usize, f64, bool); 22] = [
    ("config_cell_over_voltage_limit", 3, VOLTS, false),
    ("config_cell_high_voltage_limit", 5, VOLTS, false),
    ("config_cell_low_voltage_limit", 7, VOLTS, false),
    ("config_cell_under_voltage_limit", 9, VOLTS, false),
    ("config_charge_over_temp_limit", 11, DEGREES, false),
    ("config_charge_high_temp_limit", 13, DEGREES, false),
    ("config_charge_low_temp_limit", 15, DEGREES, false),
    ("config_charge_under_temp_limit", 17, DEGREES, false),
    ("config_charge_over2_current_limit", 19, AMPS, false),
    ("config_charge_over_current_limit", 21, AMPS, false),
    ("config_charge_high_current_limit", 23, AMPS, false),
    ("config_module_over_voltage_limit", 25, VOLTS, false),
    ("config_module_high_voltage_limit", 27, VOLTS, false),
    ("config_module_low_voltage_limit", 29, VOLTS, false),
    ("config_module_under_voltage_limit", 31, VOLTS, false),
    ("config_discharge_over_temp_limit", 33, DEGREES, false),
    ("config_discharge_high_temp_limit", 35, DEGREES, false),
    ("config_discharge_low_temp_limit", 37, DEGREES, true),
    ("config_discharge_under_temp_limit", 39, DEGREES, true),
    ("config_discharge_over2_current_limit", 41, AMPS, true),
    ("config_discharge_over_current_limit", 43, AMPS, true),
    ("config_discharge_high_current_limit", 45, AMPS, true),
];

/// Limits are reported as stored, temperatures are not unit converted.
pub(crate) fn parse_configuration(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    for (field, offset, scale, signed) in CONFIGURATION_LIMITS {
        fields.extract(frame, field, offset, 2, signed, scale)?;
    }
    Ok(fields)
}

/// The address register carries no function field.
pub(crate) fn parse_address(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.extract(frame, "device_id", 3, 2, false, 1.0)?;
    Ok(fields)
}

pub(crate) fn parse_unique_id(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    fields.extract(frame, "unique_id", 3, 4, false, 1.0)?;
    Ok(fields)
}

pub(crate) fn parse_charge_power(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    fields.extract(frame, "charge_power_percent", 3, 2, false, 1.0)?;
    Ok(fields)
}

pub(crate) fn parse_discharge_power(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    fields.extract(frame, "discharge_power_percent", 3, 2, false, 1.0)?;
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery_state::BatteryState;
    use crate::config::TemperatureUnit;
    use crate::message::test_frame;
    use crate::value::Value;

    type Parser = fn(&[u8], &ParseContext) -> Result<SectionFields, DecodeError>;

    fn parse_payload(parser: Parser, payload: &str) -> SectionFields {
        let payload = hex::decode(payload).unwrap();
        let state = BatteryState::default();
        let ctx = ParseContext { temperature_unit: TemperatureUnit::Fahrenheit, state: &state };
        parser(&test_frame(&payload), &ctx).unwrap()
    }

    #[test]
    fn test_limits_are_contiguous_words() {
        for (i, (_, offset, _, _)) in CONFIGURATION_LIMITS.iter().enumerate() {
            assert_eq!(*offset, 3 + i * 2);
        }
        let last = CONFIGURATION_LIMITS[CONFIGURATION_LIMITS.len() - 1].1;
        assert!(last + 2 <= 3 + CONFIGURATION_WORDS as usize * 2);
    }

    #[test]
    fn test_configuration() {
        let mut payload = String::new();
        payload.push_str("0024"); // cell over voltage 3.6 V
        payload.push_str(&"0000".repeat(16));
        payload.push_str("ffec"); // discharge low temp -2.0, kept in °C
        payload.push_str("0000");
        payload.push_str("f830"); // discharge over2 current -20.00 A
        payload.push_str("0000");
        payload.push_str("2710"); // discharge high current limit, signed positive
        let fields = parse_payload(parse_configuration, &payload);

        assert_eq!(fields.len(), 23);
        assert_eq!(fields.get("config_cell_over_voltage_limit"), Some(&Value::Float(3.6)));
        assert_eq!(fields.get("config_discharge_low_temp_limit"), Some(&Value::Float(-2.0)));
        assert_eq!(fields.get("config_discharge_under_temp_limit"), Some(&Value::Float(0.0)));
        assert_eq!(fields.get("config_discharge_over2_current_limit"), Some(&Value::Float(-20.0)));
        assert_eq!(fields.get("config_discharge_high_current_limit"), Some(&Value::Float(100.0)));
    }

    #[test]
    fn test_device_address_has_no_function() {
        let fields = parse_payload(parse_address, "00f7");
        assert_eq!(fields.get("device_id"), Some(&Value::Int(247)));
        assert!(fields.get("function").is_none());
    }

    #[test]
    fn test_single_value_registers() {
        let fields = parse_payload(parse_unique_id, "c0ffee01");
        assert_eq!(fields.get("unique_id"), Some(&Value::Int(0xc0ff_ee01)));

        let fields = parse_payload(parse_charge_power, "0064");
        assert_eq!(fields.get("charge_power_percent"), Some(&Value::Int(100)));

        let fields = parse_payload(parse_discharge_power, "0032");
        assert_eq!(fields.get("discharge_power_percent"), Some(&Value::Int(50)));
    }
}
