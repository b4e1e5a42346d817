//! One module per register section. Each parser takes the whole response
//! frame for its section and stages the decoded fields in a [`SectionFields`],
//! which is merged into the [`BatteryState`] only if the section succeeds.

pub(crate) mod alarms;
pub(crate) mod battery_info;
pub(crate) mod bitfield;
pub(crate) mod cell_temperatures;
pub(crate) mod cell_voltages;
pub(crate) mod device;
pub(crate) mod environment;
pub(crate) mod identity;
pub(crate) mod limits;

use crate::battery_state::BatteryState;
use crate::config::TemperatureUnit;
use crate::error::DecodeError;
use crate::primitives::{extract_value, field_bytes, function_label, read_uint};
use crate::value::Value;

/// What a parser may consult besides its own frame.
pub(crate) struct ParseContext<'a> {
    pub temperature_unit: TemperatureUnit,
    /// Fields merged by earlier sections of the same cycle.
    pub state: &'a BatteryState,
}

/// Fields decoded from a single section, not yet merged.
#[derive(Debug, Default)]
pub(crate) struct SectionFields {
    values: Vec<(String, Value)>,
    errors: Vec<(String, DecodeError)>,
}

impl SectionFields {
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.push((field.into(), value.into()));
    }

    pub fn record_error(&mut self, field: impl Into<String>, err: DecodeError) {
        self.errors.push((field.into(), err));
    }

    /// Extract a value straight from the frame into `field`.
    pub fn extract(
        &mut self,
        frame: &[u8],
        field: impl Into<String>,
        offset: usize,
        width: usize,
        signed: bool,
        scale: f64,
    ) -> Result<(), DecodeError> {
        let value = extract_value(frame, offset, width, signed, scale)?;
        self.insert(field, value);
        Ok(())
    }

    /// Extract a signed 0.1 °C register and convert it to the configured unit.
    pub fn temperature(
        &mut self,
        frame: &[u8],
        field: impl Into<String>,
        offset: usize,
        unit: TemperatureUnit,
    ) -> Result<(), DecodeError> {
        let celsius = extract_value(frame, offset, 2, true, 0.1)?;
        let celsius = celsius.as_f64().unwrap_or_default();
        self.insert(field, unit.format(celsius));
        Ok(())
    }

    /// The `function` field every section except the device address carries.
    pub fn function(&mut self, frame: &[u8]) -> Result<(), DecodeError> {
        let code = read_uint(frame, 1, 1)?;
        self.insert("function", function_label(code));
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<(String, Value)>, Vec<(String, DecodeError)>) {
        (self.values, self.errors)
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.iter().rev().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    #[cfg(test)]
    pub fn error(&self, field: &str) -> Option<&DecodeError> {
        self.errors.iter().rev().find(|(k, _)| k == field).map(|(_, e)| e)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// The frame cut at the end of the payload its length byte declares, so a
/// count larger than the registers read fails instead of reaching the CRC.
pub(crate) fn without_crc(frame: &[u8]) -> Result<&[u8], DecodeError> {
    let len = read_uint(frame, 2, 1)? as usize;
    field_bytes(frame, 0, 3 + len)
}

/// Wrap a payload in a read response from device 0x30, CRC included.
#[cfg(test)]
pub(crate) fn test_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x30, 0x03, payload.len() as u8];
    frame.extend_from_slice(payload);
    let crc = crate::frame::crc(&frame);
    frame.extend_from_slice(&crc);
    frame
}
