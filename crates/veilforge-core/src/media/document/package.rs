use std::io::{Cursor, Read, Write};

use log::{debug, error};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::pdf::MIN_SLOT_CAPACITY;
use crate::media::frame;
use crate::media::{CarrierFormat, Concealer};
use crate::{Result, VeilError};

const FORMAT: &str = "zip package";

/// archive entry holding the framed region
pub const PAYLOAD_ENTRY: &str = "veilforge/payload.bin";

/// Zip based office package (OOXML, ODF) or any other zip archive.
#[derive(Debug, Clone)]
pub struct PackageCarrier {
    bytes: Vec<u8>,
    entries: Vec<String>,
}

impl PackageCarrier {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        let entries: Vec<String> = archive.file_names().map(str::to_string).collect();
        debug!("{FORMAT} with {} entries", entries.len());

        Ok(Self {
            bytes: bytes.to_vec(),
            entries,
        })
    }

    /// a stored payload entry can never be larger than the archive holding it
    fn payload_limit(&self) -> usize {
        self.bytes.len()
    }

    /// entry names of the archive, the payload entry included
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Concealer for PackageCarrier {
    fn format(&self) -> CarrierFormat {
        CarrierFormat::Package
    }

    fn raw_capacity(&self) -> usize {
        (self.bytes.len() / 4).max(MIN_SLOT_CAPACITY)
    }

    fn embed(&self, region: &[u8]) -> Result<Vec<u8>> {
        let framed = frame::wrap(region)?;
        if framed.len() > self.raw_capacity() {
            return Err(VeilError::CapacityExceeded {
                required: framed.len(),
                capacity: self.raw_capacity(),
            });
        }

        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(
            self.bytes.len() + framed.len(),
        )));
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            if entry.name() == PAYLOAD_ENTRY {
                continue;
            }
            writer.raw_copy_file(entry)?;
        }

        writer.start_file(
            PAYLOAD_ENTRY,
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        )?;
        writer.write_all(&framed)?;
        let out = writer.finish().map_err(|e| {
            error!("Error finishing zip package: {e}");
            VeilError::from(e)
        })?;

        Ok(out.into_inner())
    }

    fn extract(&self) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        let mut entry = match archive.by_name(PAYLOAD_ENTRY) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(VeilError::NoHiddenDataFound),
            Err(e) => return Err(e.into()),
        };
        let limit = self.payload_limit();
        if entry.size() > limit as u64 {
            error!("payload entry declares {} bytes, archive has {limit}", entry.size());
            return Err(VeilError::invalid_carrier(
                FORMAT,
                "payload entry is larger than the archive",
            ));
        }
        let mut framed = Vec::with_capacity(entry.size() as usize);
        entry.by_ref().take(limit as u64 + 1).read_to_end(&mut framed)?;
        if framed.len() > limit {
            return Err(VeilError::invalid_carrier(
                FORMAT,
                "payload entry inflates past its declared size",
            ));
        }

        frame::unwrap(&framed).map(|region| region.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::package_bytes;

    #[test]
    fn should_add_the_payload_entry_and_keep_the_others() {
        let bytes = package_bytes();
        let carrier = PackageCarrier::parse(&bytes).unwrap();
        let original = carrier.entries().to_vec();

        let out = carrier.embed(b"in the package").unwrap();
        let reparsed = PackageCarrier::parse(&out).unwrap();

        assert_eq!(&reparsed.entries()[..original.len()], &original[..]);
        assert_eq!(reparsed.entries().last().map(String::as_str), Some(PAYLOAD_ENTRY));
        assert_eq!(reparsed.extract().unwrap(), b"in the package");

        let mut archive = ZipArchive::new(Cursor::new(out.as_slice())).unwrap();
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("Hello package"));
    }

    #[test]
    fn should_replace_an_existing_payload_entry() {
        let carrier = PackageCarrier::parse(&package_bytes()).unwrap();
        let once = carrier.embed(b"first").unwrap();
        let twice = PackageCarrier::parse(&once)
            .unwrap()
            .embed(b"first and second")
            .unwrap();

        let reparsed = PackageCarrier::parse(&twice).unwrap();
        let payload_entries = reparsed
            .entries()
            .iter()
            .filter(|name| name.as_str() == PAYLOAD_ENTRY)
            .count();
        assert_eq!(payload_entries, 1);
        assert_eq!(reparsed.extract().unwrap(), b"first and second");
    }

    #[test]
    fn should_report_no_hidden_data_for_a_plain_package() {
        let carrier = PackageCarrier::parse(&package_bytes()).unwrap();

        assert!(matches!(
            carrier.extract(),
            Err(VeilError::NoHiddenDataFound)
        ));
    }

    #[test]
    fn should_refuse_a_payload_entry_that_inflates_past_the_archive() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                PAYLOAD_ENTRY,
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            )
            .unwrap();
        writer.write_all(&vec![0u8; 1024 * 1024]).unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(bytes.len() < 64 * 1024);

        let carrier = PackageCarrier::parse(&bytes).unwrap();
        assert!(matches!(
            carrier.extract(),
            Err(VeilError::InvalidCarrier { .. })
        ));
    }

    #[test]
    fn should_refuse_a_broken_archive() {
        assert!(matches!(
            PackageCarrier::parse(b"PK\x03\x04 not really a zip"),
            Err(VeilError::InvalidCarrier { .. })
        ));
    }
}
