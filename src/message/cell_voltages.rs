use super::{without_crc, ParseContext, SectionFields};
use crate::error::DecodeError;
use crate::primitives::read_uint;

/// Register 5000, 17 words: cell count followed by one 0.1 V word per cell.
pub(crate) const REGISTER: u16 = 5000;
pub(crate) const WORDS: u16 = 17;

pub(crate) fn parse(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let frame = without_crc(frame)?;
    let mut fields = SectionFields::default();
    fields.function(frame)?;

    let cell_count = read_uint(frame, 3, 2)?;
    fields.insert("cell_count", cell_count as i64);
    // bounded by the count, the frame may carry padding after the last cell
    for i in 0..cell_count as usize {
        fields.extract(frame, format!("cell_voltage_{i}"), 5 + i * 2, 2, false, 0.1)?;
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery_state::BatteryState;
    use crate::config::TemperatureUnit;
    use crate::message::test_frame;
    use crate::value::Value;

    fn parse_payload(payload: &[u8]) -> Result<SectionFields, DecodeError> {
        let state = BatteryState::default();
        let ctx = ParseContext { temperature_unit: TemperatureUnit::Celsius, state: &state };
        parse(&test_frame(payload), &ctx)
    }

    #[test]
    fn test_four_cells() {
        let mut payload = hex::decode("00040960096109620963").unwrap();
        // remaining 12 cell slots are padding
        payload.resize(34, 0);
        let fields = parse_payload(&payload).unwrap();

        assert_eq!(fields.get("function"), Some(&Value::from("READ")));
        assert_eq!(fields.get("cell_count"), Some(&Value::Int(4)));
        assert_eq!(fields.get("cell_voltage_0"), Some(&Value::Float(240.0)));
        assert_eq!(fields.get("cell_voltage_1"), Some(&Value::Float(240.1)));
        assert_eq!(fields.get("cell_voltage_2"), Some(&Value::Float(240.2)));
        assert_eq!(fields.get("cell_voltage_3"), Some(&Value::Float(240.3)));
        assert_eq!(fields.get("cell_voltage_4"), None);
        assert_eq!(fields.len(), 6);
    }

    #[test]
    fn test_count_larger_than_frame() {
        // 16 cells declared, one present
        let payload = hex::decode("00100021").unwrap();
        let err = parse_payload(&payload).unwrap_err();
        assert_eq!(err, DecodeError::OutOfRange { offset: 7, width: 2, len: 7 });
    }

    #[test]
    fn test_crc_is_not_read_as_a_cell() {
        // 5 cells declared, 4 present, the CRC follows directly
        let payload = hex::decode("00050960096109620963").unwrap();
        let err = parse_payload(&payload).unwrap_err();
        assert_eq!(err, DecodeError::OutOfRange { offset: 13, width: 2, len: 13 });
    }

    #[test]
    fn test_truncated_frame() {
        // length byte claims more payload than arrived
        let mut frame = test_frame(&hex::decode("00040960096109620963").unwrap());
        frame.truncate(9);
        let state = BatteryState::default();
        let ctx = ParseContext { temperature_unit: TemperatureUnit::Celsius, state: &state };
        let err = parse(&frame, &ctx).unwrap_err();
        assert_eq!(err, DecodeError::OutOfRange { offset: 0, width: 13, len: 9 });
    }
}
