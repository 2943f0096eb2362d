use std::path::{Path, PathBuf};

use log::info;

use super::shared::{require_carrier, CarrierSource};
use super::Password;
use crate::engine::{conceal, Concealed, EngineOptions};
use crate::{MetadataRecord, Payload, Result, VeilError};

pub fn prepare() -> HideApi {
    HideApi::default()
}

#[derive(Debug, Clone)]
enum PayloadSource {
    Ready(Payload),
    File(PathBuf),
}

#[derive(Default, Debug)]
pub struct HideApi {
    carrier: Option<CarrierSource>,
    payload: Option<PayloadSource>,
    output: Option<PathBuf>,
    password: Password,
    options: EngineOptions,
}

impl HideApi {
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Carrier read from a file, the file name serves as format hint
    pub fn with_carrier<A: AsRef<Path>>(mut self, carrier: A) -> Result<Self> {
        self.carrier = Some(CarrierSource::from_file(carrier.as_ref())?);
        Ok(self)
    }

    pub fn with_carrier_bytes(mut self, bytes: Vec<u8>, name_hint: Option<&str>) -> Self {
        self.carrier = Some(CarrierSource {
            bytes,
            name_hint: name_hint.map(str::to_string),
        });
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.payload = Some(PayloadSource::Ready(Payload::text(message)));
        self
    }

    /// Hides the content of the file, read when executing
    pub fn with_file<A: AsRef<Path>>(mut self, data_file: A) -> Self {
        self.payload = Some(PayloadSource::File(data_file.as_ref().to_path_buf()));
        self
    }

    pub fn with_file_bytes(mut self, name: &str, data: Vec<u8>) -> Self {
        self.payload = Some(PayloadSource::Ready(Payload::file(name, data)));
        self
    }

    pub fn with_record(mut self, record: MetadataRecord) -> Self {
        self.payload = Some(PayloadSource::Ready(Payload::Record(record)));
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(PayloadSource::Ready(payload));
        self
    }

    /// Where the new carrier gets written to, if set
    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.into();
        self
    }

    /// Set the password, `None` fails on execute
    pub fn using_password<P: Into<Password>>(mut self, password: P) -> Self {
        self.password = password.into();
        self
    }

    /// Hides the payload as a new layer and returns the new carrier
    pub fn execute(self) -> Result<Concealed> {
        let carrier = require_carrier(self.carrier)?;
        let password = self.password.require()?;
        let payload = match self.payload {
            None => return Err(VeilError::MissingPayload),
            Some(PayloadSource::Ready(payload)) => payload,
            Some(PayloadSource::File(path)) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| {
                        VeilError::InvalidOptions(format!("{} has no file name", path.display()))
                    })?
                    .to_string();
                Payload::file(name, std::fs::read(&path)?)
            }
        };

        let concealed = conceal(
            &carrier.bytes,
            carrier.name_hint.as_deref(),
            &payload,
            password,
            &self.options,
        )?;

        if let Some(output) = self.output {
            std::fs::write(&output, &concealed.carrier)?;
            info!("written {}", output.display());
        }

        Ok(concealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fast_options, text_bytes};
    use tempfile::tempdir;

    #[test]
    fn illustrate_api_usage() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let carrier = temp_dir.path().join("notes.txt");
        std::fs::write(&carrier, text_bytes(300)).unwrap();

        let concealed = crate::api::hide::prepare()
            .with_message("Hello, World!")
            .with_carrier(&carrier)
            .expect("Failed to read carrier")
            .with_password("SuperSecret42")
            .with_options(fast_options())
            .with_output(temp_dir.path().join("notes-with-secret.txt"))
            .execute()
            .expect("Failed to hide message in text");

        let written = std::fs::read(temp_dir.path().join("notes-with-secret.txt")).unwrap();
        assert_eq!(written, concealed.carrier);
    }

    #[test]
    fn should_hide_a_file_by_path() {
        let temp_dir = tempdir().unwrap();
        let data_file = temp_dir.path().join("numbers.csv");
        std::fs::write(&data_file, "1,2,3\n").unwrap();

        let concealed = prepare()
            .with_carrier_bytes(text_bytes(300), None)
            .with_file(&data_file)
            .with_password("pw")
            .with_options(fast_options())
            .execute()
            .unwrap();
        assert_eq!(concealed.display_name, "numbers.csv");
    }

    #[test]
    fn should_complain_about_missing_parts() {
        assert!(matches!(
            prepare().with_message("x").with_password("pw").execute(),
            Err(VeilError::CarrierNotSet)
        ));
        assert!(matches!(
            prepare()
                .with_carrier_bytes(text_bytes(300), None)
                .with_password("pw")
                .execute(),
            Err(VeilError::MissingPayload)
        ));
        assert!(matches!(
            prepare()
                .with_carrier_bytes(text_bytes(300), None)
                .with_message("x")
                .execute(),
            Err(VeilError::MissingPassword)
        ));
    }
}
