use crate::battery_state::BatteryState;
use crate::config::Config;
use crate::error::DecodeError;
use crate::message::ParseContext;
use crate::section::{Section, SectionDescriptor};

/// Decodes the frames of one polling cycle into a single [`BatteryState`].
///
/// Frames are delivered one section at a time. A section either merges all of
/// its fields or none of them, so a failing frame never disturbs what earlier
/// sections produced.
#[derive(Debug, Default)]
pub struct DecodingSession {
    config: Config,
    state: BatteryState,
    /// Sections merged since the cycle started.
    merged: Vec<Section>,
}

impl DecodingSession {
    pub fn new(config: Config) -> Self {
        Self { config, state: BatteryState::default(), merged: Vec::new() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode the response `frame` read from `register` and merge it.
    ///
    /// `UnknownSection` and `OutOfRange` only concern this frame; callers can
    /// skip it and keep polling. `MissingDependency` means sections were
    /// delivered in the wrong order.
    pub fn deliver_frame(&mut self, register: u16, frame: &[u8]) -> Result<&BatteryState, DecodeError> {
        let descriptor = SectionDescriptor::find(register).map_err(|err| {
            log::warn!("Skipping frame: {err}");
            err
        })?;

        let ctx = ParseContext { temperature_unit: self.config.temperature_unit, state: &self.state };
        match descriptor.section.parse(frame, &ctx) {
            Ok(fields) => {
                self.state.merge(fields);
                if !self.merged.contains(&descriptor.section) {
                    self.merged.push(descriptor.section);
                }
                Ok(&self.state)
            }
            Err(err @ DecodeError::MissingDependency { .. }) => {
                log::error!("{:?} delivered out of order: {err}", descriptor.section);
                Err(err)
            }
            Err(err) => {
                let h = hex::encode(frame);
                log::warn!("Failed to decode {:?} at register {register}: {err}: 0x{h}", descriptor.section);
                Err(err)
            }
        }
    }

    /// Fields decoded so far in this cycle.
    pub fn state(&self) -> &BatteryState {
        &self.state
    }

    /// Whether `section` was merged since the cycle started.
    pub fn is_merged(&self, section: Section) -> bool {
        self.merged.contains(&section)
    }

    /// The prerequisite of `section` that has not been merged this cycle, if any.
    /// A section with a missing prerequisite can only fail with `MissingDependency`.
    pub fn missing_prerequisite(&self, section: Section) -> Option<Section> {
        section.prerequisite().filter(|&required| !self.is_merged(required))
    }

    /// Hand over the accumulated state and start a new cycle.
    pub fn finish_cycle(&mut self) -> BatteryState {
        self.merged.clear();
        std::mem::take(&mut self.state)
    }
}
