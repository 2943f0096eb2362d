//! Flat result record for services that drive the engine, built from the
//! outcome of any hide or unveil call.

use serde::Serialize;

use crate::api::unveil::payload_bytes;
use crate::content::ContentKind;
use crate::engine::{Concealed, Revealed};
use crate::error::ErrorKind;
use crate::layers::LayerWarning;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationReport {
    pub success: bool,
    /// carrier bytes after hiding, or the revealed payload bytes
    #[serde(skip)]
    pub output_bytes: Vec<u8>,
    pub content_kind: Option<ContentKind>,
    pub display_name: Option<String>,
    pub layer_index: Option<usize>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub warnings: Vec<String>,
}

impl OperationReport {
    fn failure(e: &crate::VeilError) -> Self {
        Self {
            error_kind: Some(e.kind()),
            error_message: Some(e.to_string()),
            ..Self::default()
        }
    }

    fn warnings(warnings: &[LayerWarning]) -> Vec<String> {
        warnings.iter().map(ToString::to_string).collect()
    }

    pub fn to_json(&self) -> String {
        // the report only holds plain strings, numbers and enums
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<Result<Concealed>> for OperationReport {
    fn from(result: Result<Concealed>) -> Self {
        match result {
            Ok(concealed) => Self {
                success: true,
                content_kind: Some(concealed.kind),
                display_name: Some(concealed.display_name),
                layer_index: Some(concealed.layer_index),
                warnings: Self::warnings(&concealed.warnings),
                output_bytes: concealed.carrier,
                ..Self::default()
            },
            Err(e) => Self::failure(&e),
        }
    }
}

impl From<Result<Revealed>> for OperationReport {
    fn from(result: Result<Revealed>) -> Self {
        match result {
            Ok(revealed) => {
                let output_bytes = match payload_bytes(&revealed.payload) {
                    Ok(bytes) => bytes,
                    Err(e) => return Self::failure(&e),
                };
                Self {
                    success: true,
                    content_kind: Some(revealed.kind()),
                    display_name: Some(revealed.display_name().to_string()),
                    layer_index: Some(revealed.layer_index),
                    warnings: Self::warnings(&revealed.warnings),
                    output_bytes,
                    ..Self::default()
                }
            }
            Err(e) => Self::failure(&e),
        }
    }
}
