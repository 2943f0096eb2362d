mod password;

pub use password::*;

use std::path::Path;

use crate::{Result, VeilError};

/// Carrier bytes plus the file name used as a detection hint.
#[derive(Debug, Default, Clone)]
pub(crate) struct CarrierSource {
    pub bytes: Vec<u8>,
    pub name_hint: Option<String>,
}

impl CarrierSource {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name_hint = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        Ok(Self { bytes, name_hint })
    }
}

pub(crate) fn require_carrier(carrier: Option<CarrierSource>) -> Result<CarrierSource> {
    carrier.ok_or(VeilError::CarrierNotSet)
}
