use super::{without_crc, ParseContext, SectionFields};
use crate::error::DecodeError;
use crate::primitives::read_uint;

/// Register 5035, 7 words: BMS board temperature, then the environment and
/// heater sensor groups, each a count word followed by its readings.
pub(crate) const REGISTER: u16 = 5035;
pub(crate) const WORDS: u16 = 7;

pub(crate) fn parse(frame: &[u8], ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let frame = without_crc(frame)?;
    let unit = ctx.temperature_unit;
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    fields.temperature(frame, "bms_board_temp", 3, unit)?;

    let environment_count = read_uint(frame, 5, 2)?;
    fields.insert("environment_temperature_count", environment_count as i64);
    for i in 0..environment_count as usize {
        fields.temperature(frame, format!("environment_temperature_{i}"), 7 + i * 2, unit)?;
    }

    // the heater group sits at a fixed offset regardless of the environment count
    let heater_count = read_uint(frame, 11, 2)?;
    fields.insert("heater_temperature_count", heater_count as i64);
    for i in 0..heater_count as usize {
        fields.temperature(frame, format!("heater_temperature_{i}"), 13 + i * 2, unit)?;
    }

    Ok(fields)
}
