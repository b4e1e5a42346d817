//! Register 5100: alarm and status words.
//!
//! The bit layouts below follow the device register map exactly, including
//! the reserved runs. Do not reorder them.

use super::bitfield::{
    Layout, Step, ALARM, CHARGED_STATE, CHARGE_ENABLE_REQUEST, CHARGE_REQUEST,
    DISCHARGE_ENABLE_REQUEST, EFFECTIVE_STATE, ERROR_STATE, PROTECTION, STATE, USING, WARNING,
};
use super::{ParseContext, SectionFields};
use crate::error::DecodeError;

pub(crate) const REGISTER: u16 = 5100;
pub(crate) const WORDS: u16 = 10;

/// Written by the cell voltage section, sizes the per-cell groups here.
const CELL_COUNT: &str = "cell_count";

pub(crate) const CELL_VOLTAGE_ALARMS: Layout = Layout {
    raw_field: "cell_voltage_alarm",
    offset: 3,
    width: 4,
    steps: &[Step::PerCell("cell_voltage_alarm", ALARM)],
};

pub(crate) const CELL_TEMPERATURE_ALARMS: Layout = Layout {
    raw_field: "cell_temperature_alarm",
    offset: 7,
    width: 4,
    steps: &[Step::PerCell("cell_temperature_alarm", ALARM)],
};

pub(crate) const OTHER_ALARMS: Layout = Layout {
    raw_field: "other_alarm",
    offset: 11,
    width: 4,
    steps: &[
        Step::Reserved(18),
        Step::Field("discharge_current_alarm", ALARM),
        Step::Field("charge_current_alarm", ALARM),
        Step::Field("heater_temperature_2_alarm", ALARM),
        Step::Field("heater_temperature_1_alarm", ALARM),
        Step::Field("env_temperature_2_alarm", ALARM),
        Step::Field("env_temperature_1_alarm", ALARM),
        Step::Field("bms_board_temperature_alarm", ALARM),
    ],
};

pub(crate) const STATUS_1: Layout = Layout {
    raw_field: "status_1",
    offset: 15,
    width: 2,
    steps: &[
        Step::Field("short_circuit", PROTECTION),
        Step::Field("charge_MOSFET", STATE),
        Step::Field("discharge_MOSFET", STATE),
        Step::Field("using_battery_module_power", USING),
        Step::Field("charge_over_current_2", PROTECTION),
        Step::Field("discharge_over_current_2", PROTECTION),
        Step::Field("module_over_voltage", PROTECTION),
        Step::Field("cell_under_voltage", PROTECTION),
        Step::Field("cell_over_voltage", PROTECTION),
        Step::Field("charge_over_current_1", PROTECTION),
        Step::Field("discharge_over_current_1", PROTECTION),
        Step::Field("discharge_under_temp", PROTECTION),
        Step::Field("discharge_over_temp", PROTECTION),
        Step::Field("charge_under_temp", PROTECTION),
        Step::Field("charge_over_temp", PROTECTION),
        Step::Field("module_under_voltage", PROTECTION),
    ],
};

pub(crate) const STATUS_2: Layout = Layout {
    raw_field: "status_2",
    offset: 17,
    width: 2,
    steps: &[
        Step::Field("cell_low_voltage", WARNING),
        Step::Field("cell_high_voltage", WARNING),
        Step::Field("module_low_voltage", WARNING),
        Step::Field("module_high_voltage", WARNING),
        Step::Field("charge_low_temp", WARNING),
        Step::Field("charge_high_temp", WARNING),
        Step::Field("discharge_low_temp", WARNING),
        Step::Field("discharge_high_temp", WARNING),
        Step::Field("buzzer", STATE),
        Step::Reserved(2),
        Step::Field("fully_charged", CHARGED_STATE),
        Step::Reserved(1),
        Step::Field("heater_on", STATE),
        Step::Field("effective_discharge_current", EFFECTIVE_STATE),
        Step::Field("effective_charge_current", EFFECTIVE_STATE),
    ],
};

pub(crate) const STATUS_3: Layout = Layout {
    raw_field: "status_3",
    offset: 19,
    width: 2,
    steps: &[Step::PerCell("cell_voltage_error_state", ERROR_STATE)],
};

pub(crate) const CHARGE_DISCHARGE_STATUS: Layout = Layout {
    raw_field: "charge_discharge_status",
    offset: 21,
    width: 2,
    steps: &[
        Step::Reserved(3),
        Step::Field("full_charge_request", CHARGE_REQUEST),
        Step::Field("charge_immediately_1", CHARGE_REQUEST),
        Step::Field("charge_immediately_2", CHARGE_REQUEST),
        Step::Field("discharge_enable", DISCHARGE_ENABLE_REQUEST),
        Step::Field("charge_enable", CHARGE_ENABLE_REQUEST),
    ],
};

const LAYOUTS: [&Layout; 7] = [
    &CELL_VOLTAGE_ALARMS,
    &CELL_TEMPERATURE_ALARMS,
    &OTHER_ALARMS,
    &STATUS_1,
    &STATUS_2,
    &STATUS_3,
    &CHARGE_DISCHARGE_STATUS,
];

pub(crate) fn parse(frame: &[u8], ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let cell_count = ctx.state.get_int(CELL_COUNT).ok_or(DecodeError::MissingDependency {
        register: REGISTER,
        field: CELL_COUNT,
    })?;
    let cell_count = usize::try_from(cell_count).unwrap_or_default();

    let mut fields = SectionFields::default();
    fields.function(frame)?;
    for layout in LAYOUTS {
        layout.decode(frame, cell_count, &mut fields)?;
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

    fn state_with_cells(cell_count: i64) -> BatteryState {
        let mut cells = SectionFields::default();
        cells.insert(CELL_COUNT, cell_count);
        let mut state = BatteryState::default();
        state.merge(cells);
        state
    }

    fn parse_payload(payload: &str, state: &BatteryState) -> Result<SectionFields, DecodeError> {
        let payload = hex::decode(payload).unwrap();
        let ctx = ParseContext { temperature_unit: TemperatureUnit::Celsius, state };
        parse(&test_frame(&payload), &ctx)
    }

    fn text<'a>(fields: &'a SectionFields, field: &str) -> &'a str {
        fields.get(field).and_then(Value::as_str).unwrap_or_else(|| panic!("{field} missing"))
    }

    #[test]
    fn test_layouts_fit_their_words() {
        for layout in [&OTHER_ALARMS, &STATUS_1, &STATUS_2, &CHARGE_DISCHARGE_STATUS] {
            assert!(layout.bit_len(0) <= layout.width as u32 * 8, "{}", layout.raw_field);
        }
        assert_eq!(OTHER_ALARMS.bit_len(0), 32);
        assert_eq!(STATUS_1.bit_len(0), 16);
        assert_eq!(STATUS_2.bit_len(0), 16);
        assert_eq!(CHARGE_DISCHARGE_STATUS.bit_len(0), 8);
        // one ALARM pair per cell fills the 32 bit word at 16 cells
        assert_eq!(CELL_VOLTAGE_ALARMS.bit_len(16), 32);
    }

    #[test]
    fn test_missing_cell_count() {
        let err = parse_payload("0000000000000000000000000000000000000000", &BatteryState::default())
            .unwrap_err();
        assert_eq!(err, DecodeError::MissingDependency { register: 5100, field: "cell_count" });
    }

    #[test]
    fn test_all_clear() {
        let state = state_with_cells(4);
        let fields = parse_payload("0000000000000000000000000000000000000000", &state).unwrap();

        assert_eq!(fields.get("function"), Some(&Value::from("READ")));
        assert_eq!(fields.get("status_1"), Some(&Value::Int(0)));
        for i in 0..4 {
            assert_eq!(text(&fields, &format!("cell_voltage_alarm_{i}")), "none");
            assert_eq!(text(&fields, &format!("cell_temperature_alarm_{i}")), "none");
            assert_eq!(text(&fields, &format!("cell_voltage_error_state_{i}")), "normal");
        }
        assert!(fields.get("cell_voltage_alarm_4").is_none());
        assert!(fields.get("cell_voltage_error_state_4").is_none());
        assert_eq!(text(&fields, "charge_MOSFET"), "off");
        assert_eq!(text(&fields, "fully_charged"), "normal");
        assert_eq!(text(&fields, "charge_enable"), "normal");
    }

    #[test]
    fn test_decode_alarm_section() {
        let state = state_with_cells(4);
        let fields = parse_payload(
            concat!(
                "000000e4", // cell voltage alarms: cells 0..3 = none, below, above, other
                "00000001", // cell temperature alarms: cell 0 below
                "c0240000", // other alarms
                "8006",     // status 1
                "e501",     // status 2
                "0005",     // status 3
                "00a8",     // charge/discharge status
            ),
            &state,
        )
        .unwrap();

        assert_eq!(fields.get("cell_voltage_alarm"), Some(&Value::Int(0xe4)));
        assert_eq!(text(&fields, "cell_voltage_alarm_0"), "none");
        assert_eq!(text(&fields, "cell_voltage_alarm_1"), "below");
        assert_eq!(text(&fields, "cell_voltage_alarm_2"), "above");
        assert_eq!(text(&fields, "cell_voltage_alarm_3"), "other");
        assert_eq!(text(&fields, "cell_temperature_alarm_0"), "below");
        assert_eq!(text(&fields, "cell_temperature_alarm_1"), "none");

        // bits 18..19 = 01, 20..21 = 10, 30..31 = 11
        assert_eq!(fields.get("other_alarm"), Some(&Value::Int(0xc024_0000)));
        assert_eq!(text(&fields, "discharge_current_alarm"), "below");
        assert_eq!(text(&fields, "charge_current_alarm"), "above");
        assert_eq!(text(&fields, "heater_temperature_2_alarm"), "none");
        assert_eq!(text(&fields, "heater_temperature_1_alarm"), "none");
        assert_eq!(text(&fields, "env_temperature_2_alarm"), "none");
        assert_eq!(text(&fields, "env_temperature_1_alarm"), "none");
        assert_eq!(text(&fields, "bms_board_temperature_alarm"), "other");

        // bits 1, 2 and 15
        assert_eq!(text(&fields, "short_circuit"), "normal");
        assert_eq!(text(&fields, "charge_MOSFET"), "on");
        assert_eq!(text(&fields, "discharge_MOSFET"), "on");
        assert_eq!(text(&fields, "using_battery_module_power"), "not");
        assert_eq!(text(&fields, "charge_over_temp"), "normal");
        assert_eq!(text(&fields, "module_under_voltage"), "trigger");

        // bits 0, 8, 10, 13, 14, 15
        assert_eq!(text(&fields, "cell_low_voltage"), "trigger");
        assert_eq!(text(&fields, "cell_high_voltage"), "normal");
        assert_eq!(text(&fields, "discharge_high_temp"), "normal");
        assert_eq!(text(&fields, "buzzer"), "on");
        assert_eq!(text(&fields, "fully_charged"), "normal");
        assert_eq!(text(&fields, "heater_on"), "on");
        assert_eq!(text(&fields, "effective_discharge_current"), "effective");
        assert_eq!(text(&fields, "effective_charge_current"), "effective");

        assert_eq!(text(&fields, "cell_voltage_error_state_0"), "error");
        assert_eq!(text(&fields, "cell_voltage_error_state_1"), "normal");
        assert_eq!(text(&fields, "cell_voltage_error_state_2"), "error");
        assert_eq!(text(&fields, "cell_voltage_error_state_3"), "normal");

        // bits 3, 5, 7
        assert_eq!(text(&fields, "full_charge_request"), "yes");
        assert_eq!(text(&fields, "charge_immediately_1"), "normal");
        assert_eq!(text(&fields, "charge_immediately_2"), "yes");
        assert_eq!(text(&fields, "discharge_enable"), "normal");
        assert_eq!(text(&fields, "charge_enable"), "requestStopCharge");
    }

    #[test]
    fn test_reserved_bits_emit_nothing() {
        let state = state_with_cells(0);
        // every reserved bit set, nothing else
        let fields = parse_payload(
            concat!("00000000", "00000000", "0003ffff", "0000", "1600", "0000", "0007"),
            &state,
        )
        .unwrap();
        for field in ["discharge_current_alarm", "bms_board_temperature_alarm"] {
            assert_eq!(text(&fields, field), "none");
        }
        assert_eq!(text(&fields, "buzzer"), "off");
        assert_eq!(text(&fields, "fully_charged"), "normal");
        assert_eq!(text(&fields, "heater_on"), "off");
        assert_eq!(text(&fields, "full_charge_request"), "normal");
        assert!(fields.get("cell_voltage_alarm_0").is_none());
    }

    #[test]
    fn test_redecoding_is_idempotent() {
        let state = state_with_cells(4);
        let payload = "000000e400000001c02400008006e501000500a8";
        let first = parse_payload(payload, &state).unwrap().into_parts();
        let second = parse_payload(payload, &state).unwrap().into_parts();
        assert_eq!(first.0, second.0);
    }
}
