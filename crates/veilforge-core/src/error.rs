use serde::Serialize;
use thiserror::Error;
use zip::result::ZipError;

pub use veilforge_cipher::CipherError;

#[derive(Error, Debug)]
pub enum VeilError {
    /// Represents a carrier whose signature matches none of the supported formats
    #[error("Carrier format is not supported")]
    UnsupportedFormat,

    /// Represents a carrier of a known format that cannot be parsed, for example a broken PNG file
    #[error("Invalid {format} carrier: {reason}")]
    InvalidCarrier {
        format: &'static str,
        reason: String,
    },

    #[error(
        "Capacity Error: {required} bytes are required but the carrier offers only {capacity} bytes"
    )]
    CapacityExceeded { required: usize, capacity: usize },

    /// Represents a wrong password or a ciphertext that was tampered with
    #[error("Authentication failed, the password is wrong or the data was altered")]
    AuthenticationFailed,

    /// Represents hidden data with the right structure but damaged content
    #[error("Hidden data is corrupted: {0}")]
    EnvelopeCorrupt(String),

    /// Represents an unveil of no secret data. For example when a carrier did not contain any secrets
    #[error("No hidden data found")]
    NoHiddenDataFound,

    #[error("Layer {index} is corrupted")]
    PartialLayerCorrupt { index: usize },

    #[error("Cipher error")]
    Cipher(CipherError),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("No carrier set")]
    CarrierNotSet,

    #[error("API Error: Missing payload")]
    MissingPayload,

    #[error("API Error: Missing password")]
    MissingPassword,

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl From<CipherError> for VeilError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::AuthenticationFailed => VeilError::AuthenticationFailed,
            e => VeilError::Cipher(e),
        }
    }
}

impl From<ZipError> for VeilError {
    fn from(e: ZipError) -> Self {
        match e {
            ZipError::Io(e) => VeilError::IoError(e),
            e => VeilError::InvalidCarrier {
                format: "zip package",
                reason: e.to_string(),
            },
        }
    }
}

/// Coarse classification of a [`VeilError`], stable for reporting to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CapacityExceeded,
    AuthenticationFailed,
    EnvelopeCorrupt,
    NoHiddenDataFound,
    UnsupportedFormat,
    PartialLayerCorrupt,
    InvalidCarrier,
    InvalidInput,
    Io,
}

impl VeilError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VeilError::UnsupportedFormat => ErrorKind::UnsupportedFormat,
            VeilError::InvalidCarrier { .. } => ErrorKind::InvalidCarrier,
            VeilError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            VeilError::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            VeilError::EnvelopeCorrupt(_) => ErrorKind::EnvelopeCorrupt,
            VeilError::NoHiddenDataFound => ErrorKind::NoHiddenDataFound,
            VeilError::PartialLayerCorrupt { .. } => ErrorKind::PartialLayerCorrupt,
            VeilError::Cipher(_)
            | VeilError::InvalidOptions(_)
            | VeilError::CarrierNotSet
            | VeilError::MissingPayload
            | VeilError::MissingPassword => ErrorKind::InvalidInput,
            VeilError::IoError(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid_carrier(format: &'static str, reason: impl Into<String>) -> Self {
        VeilError::InvalidCarrier {
            format,
            reason: reason.into(),
        }
    }
}
