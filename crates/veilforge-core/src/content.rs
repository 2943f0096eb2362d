//! The things that can be hidden: a text message, a named file or an
//! authorship record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Result, VeilError};

pub const DEFAULT_TEXT_NAME: &str = "secret-message.txt";
pub const DEFAULT_RECORD_NAME: &str = "metadata.json";
pub const DEFAULT_FILE_NAME: &str = "hidden-file.bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    File,
    Record,
}

impl ContentKind {
    pub fn id(&self) -> u8 {
        match self {
            ContentKind::Text => 1,
            ContentKind::File => 2,
            ContentKind::Record => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(ContentKind::Text),
            2 => Some(ContentKind::File),
            3 => Some(ContentKind::Record),
            _ => None,
        }
    }
}

/// Copyright and authorship record, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MetadataRecord {
    pub fn new(author_name: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            ..Self::default()
        }
    }

    pub fn with_copyright_alias(mut self, alias: impl Into<String>) -> Self {
        self.copyright_alias = Some(alias.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VeilError::InvalidOptions(e.to_string()))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| VeilError::InvalidOptions(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    File { name: String, data: Vec<u8> },
    Record(MetadataRecord),
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    /// only the file name part of `name` is kept, directories are dropped
    pub fn file(name: impl AsRef<str>, data: Vec<u8>) -> Self {
        let name = file_name(name.as_ref())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        Payload::File { name, data }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Payload::Text(_) => ContentKind::Text,
            Payload::File { .. } => ContentKind::File,
            Payload::Record(_) => ContentKind::Record,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Payload::Text(_) => DEFAULT_TEXT_NAME,
            Payload::File { name, .. } => name,
            Payload::Record(_) => DEFAULT_RECORD_NAME,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Payload::Text(text) => Ok(text.as_bytes().to_vec()),
            Payload::File { data, .. } => Ok(data.clone()),
            Payload::Record(record) => record.to_json(),
        }
    }

    /// rebuilds a payload from opened plaintext, content that does not match its kind is corrupt
    pub fn from_parts(kind: ContentKind, name: &str, plain: Vec<u8>) -> Result<Self> {
        match kind {
            ContentKind::Text => String::from_utf8(plain)
                .map(Payload::Text)
                .map_err(|_| VeilError::EnvelopeCorrupt("text is not valid UTF-8".to_string())),
            ContentKind::File => {
                let name = file_name(name).ok_or_else(|| {
                    VeilError::EnvelopeCorrupt(format!("file name {name:?} names no file"))
                })?;
                Ok(Payload::File {
                    name: name.to_string(),
                    data: plain,
                })
            }
            ContentKind::Record => serde_json::from_slice(&plain)
                .map(Payload::Record)
                .map_err(|e| VeilError::EnvelopeCorrupt(format!("record is not valid JSON: {e}"))),
        }
    }
}

/// Last path component of `name`, `None` when nothing usable is left.
///
/// `/`, `\` and a drive colon all separate components.
pub(crate) fn file_name(name: &str) -> Option<&str> {
    name.rsplit(['/', '\\', ':'])
        .find(|s| !s.is_empty())
        .filter(|s| !matches!(*s, "." | ".."))
}
