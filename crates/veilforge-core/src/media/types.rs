use std::fmt::{self, Display, Formatter};
use std::path::Path;

use serde::Serialize;

use crate::{Result, VeilError};

/// every carrier format the engine can hide data in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierFormat {
    Png,
    Bmp,
    Wav,
    Y4m,
    Mp4,
    Text,
    Pdf,
    Package,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFamily {
    Image,
    Audio,
    Video,
    Document,
}

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "csv", "tsv", "log", "json", "xml", "html", "htm", "yaml", "yml", "toml", "ini",
    "rs", "py", "js", "ts", "c", "h", "java", "go", "sh",
];

impl CarrierFormat {
    pub fn family(&self) -> MediaFamily {
        match self {
            CarrierFormat::Png | CarrierFormat::Bmp => MediaFamily::Image,
            CarrierFormat::Wav => MediaFamily::Audio,
            CarrierFormat::Y4m | CarrierFormat::Mp4 => MediaFamily::Video,
            CarrierFormat::Text | CarrierFormat::Pdf | CarrierFormat::Package => {
                MediaFamily::Document
            }
        }
    }

    /// Detects the format by its signature. The optional file name only
    /// decides whether bytes that merely look like text are treated as a
    /// text document.
    pub fn sniff(bytes: &[u8], name_hint: Option<&str>) -> Result<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Ok(CarrierFormat::Png);
        }
        if bytes.len() >= 6
            && bytes.starts_with(b"BM")
            && u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]) as usize == bytes.len()
        {
            return Ok(CarrierFormat::Bmp);
        }
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
            return Ok(CarrierFormat::Wav);
        }
        if bytes.starts_with(b"YUV4MPEG2 ") {
            return Ok(CarrierFormat::Y4m);
        }
        if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
            return Ok(CarrierFormat::Mp4);
        }
        if bytes.starts_with(b"%PDF-") {
            return Ok(CarrierFormat::Pdf);
        }
        if bytes.starts_with(b"PK\x03\x04") {
            return Ok(CarrierFormat::Package);
        }
        if !bytes.is_empty()
            && !bytes.contains(&0)
            && std::str::from_utf8(bytes).is_ok()
            && name_hint.map_or(true, has_text_extension)
        {
            return Ok(CarrierFormat::Text);
        }

        Err(VeilError::UnsupportedFormat)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            CarrierFormat::Png => "png",
            CarrierFormat::Bmp => "bmp",
            CarrierFormat::Wav => "wav",
            CarrierFormat::Y4m => "y4m",
            CarrierFormat::Mp4 => "mp4",
            CarrierFormat::Text => "txt",
            CarrierFormat::Pdf => "pdf",
            CarrierFormat::Package => "zip",
        }
    }
}

/// a hint without any extension does not rule text out
fn has_text_extension(name: &str) -> bool {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        None => true,
        Some(ext) => TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
    }
}

impl CarrierFormat {
    pub fn name(&self) -> &'static str {
        match self {
            CarrierFormat::Png => "PNG image",
            CarrierFormat::Bmp => "BMP image",
            CarrierFormat::Wav => "WAV audio",
            CarrierFormat::Y4m => "Y4M video",
            CarrierFormat::Mp4 => "MP4 video",
            CarrierFormat::Text => "text document",
            CarrierFormat::Pdf => "PDF document",
            CarrierFormat::Package => "zip package",
        }
    }
}

impl Display for CarrierFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
