//! Decode status data from Renogy-style LiFePO4 batteries.
//!
//! The battery exposes its state as Modbus holding registers, usually reached
//! through a BT-2 Bluetooth Low Energy module. The registers are grouped into
//! sections (cell voltages, temperatures, alarms, identity, ...); each section
//! is read with one request and its response frame decoded by a dedicated
//! parser into a cumulative [`BatteryState`].
//!
//! Currently the following data can be accessed:
//!
//! - Cell voltages (V) and cell/board/environment/heater temperatures
//! - Current (A), voltage (V), remaining charge and capacity (Ah)
//! - Cycle count and charge/discharge limits
//! - Alarm, protection and warning states
//! - Serial number, names and firmware versions
//! - Configured protection limits
//!
//! Decoding is independent of the transport. Enable the `bluetooth` feature
//! for [`BatteryClient`], which polls a battery over BLE.
//!
//! # Example
//!
//! ```rust
//! use renogy_battery::{Config, DecodingSession, Value};
//!
//! let mut session = DecodingSession::new(Config::default());
//!
//! // response to a read of register 5000: four cells
//! let frame = hex::decode("30030a00040021002100220021b810").unwrap();
//! let state = session.deliver_frame(5000, &frame).unwrap();
//!
//! assert_eq!(state.get_int("cell_count"), Some(4));
//! assert_eq!(state.get("cell_voltage_2"), Some(&Value::Float(3.4)));
//! ```

#[cfg(feature = "bluetooth")]
mod battery_client;
mod battery_state;
mod config;
mod error;
pub mod frame;
mod message;
pub mod primitives;
mod section;
mod session;
mod value;

#[cfg(feature = "bluetooth")]
pub use battery_client::BatteryClient;
pub use battery_state::BatteryState;
pub use config::{format_temperature, Config, TemperatureUnit, TEMPERATURE_UNIT_ENV};
pub use error::{ConfigError, DecodeError};
pub use primitives::{decode_text, extract_value, TextEncoding};
pub use section::{Section, SectionDescriptor, SECTIONS};
pub use session::DecodingSession;
pub use value::Value;
