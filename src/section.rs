//! The register sections a battery exposes and the parser for each.

use crate::error::DecodeError;
use crate::message::{
    alarms, battery_info, cell_temperatures, cell_voltages, device, environment, identity, limits,
    ParseContext, SectionFields,
};

/// A contiguous run of registers decoded by one parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    CellVoltages,
    CellTemperatures,
    Environment,
    BatteryInfo,
    Limits,
    Alarms,
    SerialNumber,
    ManufactureVersion,
    MainLineVersion,
    CommunicationVersion,
    BatteryName,
    SoftwareVersion,
    ManufacturerName,
    DeviceConfiguration,
    DeviceAddress,
    UniqueId,
    ChargePower,
    DischargePower,
}

impl Section {
    /// The section whose fields must already be decoded before this one.
    pub fn prerequisite(self) -> Option<Section> {
        match self {
            Section::Alarms => Some(Section::CellVoltages),
            _ => None,
        }
    }

    pub(crate) fn parse(self, frame: &[u8], ctx: &ParseContext) -> Result<SectionFields, DecodeError> {
        match self {
            Section::CellVoltages => cell_voltages::parse(frame, ctx),
            Section::CellTemperatures => cell_temperatures::parse(frame, ctx),
            Section::Environment => environment::parse(frame, ctx),
            Section::BatteryInfo => battery_info::parse(frame, ctx),
            Section::Limits => limits::parse(frame, ctx),
            Section::Alarms => alarms::parse(frame, ctx),
            Section::SerialNumber => identity::parse_serial_number(frame, ctx),
            Section::ManufactureVersion => identity::parse_manufacture_version(frame, ctx),
            Section::MainLineVersion => identity::parse_main_line_version(frame, ctx),
            Section::CommunicationVersion => identity::parse_communication_version(frame, ctx),
            Section::BatteryName => identity::parse_battery_name(frame, ctx),
            Section::SoftwareVersion => identity::parse_software_version(frame, ctx),
            Section::ManufacturerName => identity::parse_manufacturer_name(frame, ctx),
            Section::DeviceConfiguration => device::parse_configuration(frame, ctx),
            Section::DeviceAddress => device::parse_address(frame, ctx),
            Section::UniqueId => device::parse_unique_id(frame, ctx),
            Section::ChargePower => device::parse_charge_power(frame, ctx),
            Section::DischargePower => device::parse_discharge_power(frame, ctx),
        }
    }
}

/// Where a section lives in the register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDescriptor {
    /// First register of the section
    pub register: u16,
    /// Number of 2-byte registers to read
    pub words: u16,
    pub section: Section,
}

impl SectionDescriptor {
    const fn new(register: u16, words: u16, section: Section) -> Self {
        Self { register, words, section }
    }

    /// Look up the section starting exactly at `register`.
    pub fn find(register: u16) -> Result<&'static SectionDescriptor, DecodeError> {
        SECTIONS
            .iter()
            .find(|d| d.register == register)
            .ok_or(DecodeError::UnknownSection(register))
    }
}

/// Every section, in an order that satisfies [`Section::prerequisite`].
pub static SECTIONS: [SectionDescriptor; 18] = [
    SectionDescriptor::new(cell_voltages::REGISTER, cell_voltages::WORDS, Section::CellVoltages),
    SectionDescriptor::new(cell_temperatures::REGISTER, cell_temperatures::WORDS, Section::CellTemperatures),
    SectionDescriptor::new(environment::REGISTER, environment::WORDS, Section::Environment),
    SectionDescriptor::new(battery_info::REGISTER, battery_info::WORDS, Section::BatteryInfo),
    SectionDescriptor::new(limits::REGISTER, limits::WORDS, Section::Limits),
    SectionDescriptor::new(alarms::REGISTER, alarms::WORDS, Section::Alarms),
    SectionDescriptor::new(identity::SERIAL_NUMBER_REGISTER, identity::SERIAL_NUMBER_WORDS, Section::SerialNumber),
    SectionDescriptor::new(
        identity::MANUFACTURE_VERSION_REGISTER,
        identity::MANUFACTURE_VERSION_WORDS,
        Section::ManufactureVersion,
    ),
    SectionDescriptor::new(
        identity::MAIN_LINE_VERSION_REGISTER,
        identity::MAIN_LINE_VERSION_WORDS,
        Section::MainLineVersion,
    ),
    SectionDescriptor::new(
        identity::COMMUNICATION_VERSION_REGISTER,
        identity::COMMUNICATION_VERSION_WORDS,
        Section::CommunicationVersion,
    ),
    SectionDescriptor::new(identity::BATTERY_NAME_REGISTER, identity::BATTERY_NAME_WORDS, Section::BatteryName),
    SectionDescriptor::new(
        identity::SOFTWARE_VERSION_REGISTER,
        identity::SOFTWARE_VERSION_WORDS,
        Section::SoftwareVersion,
    ),
    SectionDescriptor::new(
        identity::MANUFACTURER_NAME_REGISTER,
        identity::MANUFACTURER_NAME_WORDS,
        Section::ManufacturerName,
    ),
    SectionDescriptor::new(
        device::CONFIGURATION_REGISTER,
        device::CONFIGURATION_WORDS,
        Section::DeviceConfiguration,
    ),
    SectionDescriptor::new(device::ADDRESS_REGISTER, device::ADDRESS_WORDS, Section::DeviceAddress),
    SectionDescriptor::new(device::UNIQUE_ID_REGISTER, device::UNIQUE_ID_WORDS, Section::UniqueId),
    SectionDescriptor::new(device::CHARGE_POWER_REGISTER, device::CHARGE_POWER_WORDS, Section::ChargePower),
    SectionDescriptor::new(
        device::DISCHARGE_POWER_REGISTER,
        device::DISCHARGE_POWER_WORDS,
        Section::DischargePower,
    ),
];
