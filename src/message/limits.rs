use super::{ParseContext, SectionFields};
use crate::error::DecodeError;

/// Register 5048, 5 words: cycle count and the charge/discharge limits.
pub(crate) const REGISTER: u16 = 5048;
pub(crate) const WORDS: u16 = 5;

pub(crate) fn parse(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    fields.extract(frame, "cycle_count", 3, 2, false, 1.0)?;
    fields.extract(frame, "charge_voltage_limit", 5, 2, false, 0.1)?;
    fields.extract(frame, "discharge_voltage_limit", 7, 2, false, 0.1)?;
    fields.extract(frame, "charge_current_limit", 9, 2, false, 0.01)?;
    fields.extract(frame, "discharge_current_limit", 11, 2, true, 0.01)?;
    Ok(fields)
}
