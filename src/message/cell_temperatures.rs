use super::{without_crc, ParseContext, SectionFields};
use crate::error::DecodeError;
use crate::primitives::read_uint;

/// Register 5017, 17 words: sensor count followed by one signed 0.1 °C word per sensor.
pub(crate) const REGISTER: u16 = 5017;
pub(crate) const WORDS: u16 = 17;

pub(crate) fn parse(frame: &[u8], ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let frame = without_crc(frame)?;
    let mut fields = SectionFields::default();
    fields.function(frame)?;

    let sensor_count = read_uint(frame, 3, 2)?;
    fields.insert("sensor_count", sensor_count as i64);
    for i in 0..sensor_count as usize {
        fields.temperature(frame, format!("temperature_{i}"), 5 + i * 2, ctx.temperature_unit)?;
    }

    Ok(fields)
}
