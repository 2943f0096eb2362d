use std::path::{Path, PathBuf};

use log::info;

use super::shared::{require_carrier, CarrierSource};
use super::Password;
use crate::content::file_name;
use crate::engine::{reveal, EngineOptions, Revealed};
use crate::{LayerSelector, Payload, Result, VeilError};

pub fn prepare() -> UnveilApi {
    UnveilApi::default()
}

#[derive(Default, Debug)]
pub struct UnveilApi {
    secret_media: Option<CarrierSource>,
    output_folder: Option<PathBuf>,
    password: Password,
    layer: LayerSelector,
    options: EngineOptions,
}

impl UnveilApi {
    /// Use the given engine options
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// This is the secret carrier that contains the data to be unveiled
    pub fn from_secret_file(mut self, secret_media: impl AsRef<Path>) -> Result<Self> {
        self.secret_media = Some(CarrierSource::from_file(secret_media.as_ref())?);
        Ok(self)
    }

    pub fn from_secret_bytes(mut self, bytes: Vec<u8>, name_hint: Option<&str>) -> Self {
        self.secret_media = Some(CarrierSource {
            bytes,
            name_hint: name_hint.map(str::to_string),
        });
        self
    }

    /// This is the folder where the payload will be saved to, if set
    pub fn into_output_folder(mut self, output_folder: impl AsRef<Path>) -> Self {
        self.output_folder = Some(output_folder.as_ref().to_path_buf());
        self
    }

    /// Set the password used for decrypting the layer
    pub fn using_password<P: Into<Password>>(mut self, password: P) -> Self {
        self.password = password.into();
        self
    }

    /// Pick a layer, the most recent readable one by default
    pub fn with_layer(mut self, layer: LayerSelector) -> Self {
        self.layer = layer;
        self
    }

    /// Execute the unveil process and blocks until it is finished
    pub fn execute(self) -> Result<Revealed> {
        let secret_media = require_carrier(self.secret_media)?;
        let password = self.password.require()?;

        let revealed = reveal(
            &secret_media.bytes,
            secret_media.name_hint.as_deref(),
            password,
            self.layer,
            &self.options,
        )?;

        if let Some(output_folder) = self.output_folder {
            let name = file_name(revealed.display_name()).ok_or_else(|| {
                VeilError::EnvelopeCorrupt("revealed payload names no file".to_string())
            })?;
            let target_file = output_folder.join(name);
            std::fs::write(&target_file, payload_bytes(&revealed.payload)?)?;
            info!("written {}", target_file.display());
        }

        Ok(revealed)
    }
}

/// bytes written for a payload, records as pretty JSON
pub fn payload_bytes(payload: &Payload) -> Result<Vec<u8>> {
    match payload {
        Payload::Text(text) => Ok(text.as_bytes().to_vec()),
        Payload::File { data, .. } => Ok(data.clone()),
        Payload::Record(record) => serde_json::to_vec_pretty(record)
            .map_err(|e| VeilError::InvalidOptions(e.to_string())),
    }
}
