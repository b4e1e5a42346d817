use thiserror::Error;

/// Failures while decoding a register section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The frame is shorter than a field's declared offset + width.
    #[error("read of {width} bytes at offset {offset} exceeds frame length {len}")]
    OutOfRange { offset: usize, width: usize, len: usize },

    #[error("unsupported field width of {0} bytes")]
    UnsupportedWidth(usize),

    /// No section is registered at the delivered register address.
    #[error("no section registered at register {0}")]
    UnknownSection(u16),

    #[error("malformed version field: {0}")]
    MalformedVersion(String),

    /// A section was delivered before the section that produces a field it needs.
    #[error("section at register {register} needs `{field}`, which has not been decoded yet")]
    MissingDependency { register: u16, field: &'static str },
}

/// Invalid configuration, rejected before any frame is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unsupported temperature unit {0:?}, expected \"C\" or \"F\"")]
    UnsupportedUnit(String),
}
