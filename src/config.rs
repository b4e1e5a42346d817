use std::env::VarError;
use std::str::FromStr;

use crate::error::ConfigError;

/// Environment variable holding the temperature unit, `C` or `F`.
pub const TEMPERATURE_UNIT_ENV: &str = "BATTERY_TEMPERATURE_UNIT";

/// Unit that decoded temperatures are reported in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    pub fn format(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => ((celsius * 9.0 / 5.0 + 32.0) * 100.0).round() / 100.0,
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(TemperatureUnit::Celsius),
            "F" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(ConfigError::UnsupportedUnit(other.to_owned())),
        }
    }
}

/// Convert a Celsius reading into the unit named by `unit`.
pub fn format_temperature(celsius: f64, unit: &str) -> Result<f64, ConfigError> {
    Ok(unit.parse::<TemperatureUnit>()?.format(celsius))
}

/// Decoder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub temperature_unit: TemperatureUnit,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// An unset unit means Celsius. An invalid one is an error, it is never
    /// silently replaced by the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Result<String, VarError>) -> Result<Self, ConfigError> {
        let temperature_unit = match lookup(TEMPERATURE_UNIT_ENV) {
            Ok(unit) => unit.parse()?,
            Err(VarError::NotPresent) => TemperatureUnit::default(),
            Err(VarError::NotUnicode(unit)) => {
                return Err(ConfigError::UnsupportedUnit(unit.to_string_lossy().into_owned()))
            }
        };
        Ok(Self { temperature_unit })
    }
}
