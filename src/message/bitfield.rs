//! Table driven decoding of packed status words.
//!
//! A [`Layout`] lists the groups of a status word from the least significant
//! bit upwards. The word is consumed like a shift register: each step takes
//! its bits off the bottom and shifts them out, reserved steps shift without
//! emitting anything.

use super::SectionFields;
use crate::error::DecodeError;
use crate::primitives::read_uint;

/// Width of a bit group and the label for each raw value it can hold.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kind {
    pub bits: u32,
    pub labels: &'static [&'static str],
}

pub(crate) const ALARM: Kind = Kind { bits: 2, labels: &["none", "below", "above", "other"] };
pub(crate) const PROTECTION: Kind = Kind { bits: 1, labels: &["normal", "trigger"] };
pub(crate) const WARNING: Kind = Kind { bits: 1, labels: &["normal", "trigger"] };
pub(crate) const USING: Kind = Kind { bits: 1, labels: &["not", "using"] };
pub(crate) const STATE: Kind = Kind { bits: 1, labels: &["off", "on"] };
pub(crate) const CHARGED_STATE: Kind = Kind { bits: 1, labels: &["normal", "full"] };
pub(crate) const EFFECTIVE_STATE: Kind = Kind { bits: 1, labels: &["normal", "effective"] };
pub(crate) const ERROR_STATE: Kind = Kind { bits: 1, labels: &["normal", "error"] };
pub(crate) const CHARGE_REQUEST: Kind = Kind { bits: 1, labels: &["normal", "yes"] };
pub(crate) const CHARGE_ENABLE_REQUEST: Kind = Kind { bits: 1, labels: &["normal", "requestStopCharge"] };
pub(crate) const DISCHARGE_ENABLE_REQUEST: Kind =
    Kind { bits: 1, labels: &["normal", "requestStopDischarge"] };

#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    /// One named group.
    Field(&'static str, Kind),
    /// One group per cell, named `{prefix}_{index}`.
    PerCell(&'static str, Kind),
    /// Bits with no meaning, shifted past.
    Reserved(u32),
}

/// Where a status word lives in the frame and how its bits are laid out.
#[derive(Debug)]
pub(crate) struct Layout {
    /// Name the raw word itself is reported under.
    pub raw_field: &'static str,
    pub offset: usize,
    pub width: usize,
    pub steps: &'static [Step],
}

impl Layout {
    /// Bits consumed for a given cell count.
    #[cfg(test)]
    pub fn bit_len(&self, cell_count: usize) -> u32 {
        self.steps
            .iter()
            .map(|step| match *step {
                Step::Field(_, kind) => kind.bits,
                Step::PerCell(_, kind) => kind.bits * cell_count as u32,
                Step::Reserved(bits) => bits,
            })
            .sum()
    }

    /// Decode the word at `offset` into `fields`.
    pub fn decode(
        &self,
        frame: &[u8],
        cell_count: usize,
        fields: &mut SectionFields,
    ) -> Result<(), DecodeError> {
        let word = read_uint(frame, self.offset, self.width)?;
        fields.insert(self.raw_field, word as i64);

        let mut register = ShiftRegister(word);
        for step in self.steps {
            match *step {
                Step::Field(name, kind) => fields.insert(name, register.take(kind)),
                Step::PerCell(prefix, kind) => {
                    for i in 0..cell_count {
                        fields.insert(format!("{prefix}_{i}"), register.take(kind));
                    }
                }
                Step::Reserved(bits) => register.skip(bits),
            }
        }
        Ok(())
    }
}

struct ShiftRegister(u64);

impl ShiftRegister {
    fn take(&mut self, kind: Kind) -> &'static str {
        let raw = self.0 & ((1u64 << kind.bits) - 1);
        self.skip(kind.bits);
        kind.labels.get(raw as usize).copied().unwrap_or("unknown")
    }

    /// Bits shifted in from beyond the word are zero.
    fn skip(&mut self, bits: u32) {
        self.0 = self.0.checked_shr(bits).unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    const KINDS: [Kind; 11] = [
        ALARM,
        PROTECTION,
        WARNING,
        USING,
        STATE,
        CHARGED_STATE,
        EFFECTIVE_STATE,
        ERROR_STATE,
        CHARGE_REQUEST,
        CHARGE_ENABLE_REQUEST,
        DISCHARGE_ENABLE_REQUEST,
    ];

    #[test]
    fn test_every_kind_labels_all_values() {
        for kind in KINDS {
            assert_eq!(kind.labels.len(), 1 << kind.bits, "{kind:?}");
        }
    }

    #[test]
    fn test_reserved_bits_are_skipped() {
        const STEPS: &[Step] = &[
            Step::Reserved(3),
            Step::Field("a", STATE),
            Step::Field("b", ALARM),
            Step::Field("c", STATE),
        ];
        let layout = Layout { raw_field: "word", offset: 0, width: 1, steps: STEPS };
        assert_eq!(layout.bit_len(0), 7);

        // 0b0110_1000: a = 1, b = 0b10, c = 1
        let mut fields = SectionFields::default();
        layout.decode(&[0b0110_1000], 0, &mut fields).unwrap();
        assert_eq!(fields.get("word"), Some(&Value::Int(0x68)));
        assert_eq!(fields.get("a"), Some(&Value::from("on")));
        assert_eq!(fields.get("b"), Some(&Value::from("above")));
        assert_eq!(fields.get("c"), Some(&Value::from("on")));
    }

    #[test]
    fn test_per_cell_beyond_word_reads_zero() {
        const STEPS: &[Step] = &[Step::PerCell("cell", ALARM)];
        let layout = Layout { raw_field: "word", offset: 0, width: 1, steps: STEPS };

        let mut fields = SectionFields::default();
        layout.decode(&[0xff], 40, &mut fields).unwrap();
        assert_eq!(fields.get("cell_0"), Some(&Value::from("other")));
        assert_eq!(fields.get("cell_3"), Some(&Value::from("other")));
        assert_eq!(fields.get("cell_4"), Some(&Value::from("none")));
        assert_eq!(fields.get("cell_39"), Some(&Value::from("none")));
    }
}
