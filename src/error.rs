//! Error types for the codec, numeric and selection layers

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Truncated input: {0}")]
    TruncatedInput(String),

    #[error("Malformed field: {0}")]
    MalformedField(String),

    #[error("Version too old: {command} requires {minimum}, negotiated {version}")]
    VersionTooOld {
        command: &'static str,
        minimum: u32,
        version: u32,
    },

    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    #[error("Target overflow: compact {0:#010x}")]
    TargetOverflow(u32),
}

pub type Result<T> = std::result::Result<T, DomainError>;
