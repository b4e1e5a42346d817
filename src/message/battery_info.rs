use super::{ParseContext, SectionFields};
use crate::error::DecodeError;

/// Register 5042, 6 words: current, voltage, remaining charge and capacity.
pub(crate) const REGISTER: u16 = 5042;
pub(crate) const WORDS: u16 = 6;

pub(crate) fn parse(frame: &[u8], _ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
    let mut fields = SectionFields::default();
    fields.function(frame)?;
    // negative while discharging
    fields.extract(frame, "current", 3, 2, true, 0.01)?;
    fields.extract(frame, "voltage", 5, 2, false, 0.1)?;
    fields.extract(frame, "remaining_charge", 7, 4, false, 0.001)?;
    fields.extract(frame, "capacity", 11, 4, false, 0.001)?;
    Ok(fields)
}
