//! Stacking of envelopes inside one hiding region.
//!
//! The region is a plain sequence of `[u32 length][envelope]` slots. New
//! layers are only ever appended, earlier bytes are never rewritten.

use std::fmt::{self, Display, Formatter};
use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};
use log::warn;
use serde::Serialize;

use crate::content::ContentKind;
use crate::envelope::Envelope;
use crate::{Result, VeilError};

/// size of the length prefix in front of every envelope
pub const SLOT_HEADER: usize = 4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LayerSelector {
    /// the most recent layer that unpacks
    #[default]
    Latest,
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerStatus {
    Valid,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSlot {
    pub index: usize,
    /// envelope bytes within the region, without the length prefix
    pub range: Range<usize>,
    pub status: LayerStatus,
    pub kind: Option<ContentKind>,
    pub display_name: Option<String>,
    /// ciphertext length
    pub length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerWarning {
    Malformed {
        index: usize,
        reason: String,
    },
    Truncated {
        offset: usize,
        declared: usize,
        available: usize,
    },
    UnreadableRegion {
        reason: String,
    },
}

impl Display for LayerWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LayerWarning::Malformed { index, reason } => {
                write!(f, "layer {index} skipped: {reason}")
            }
            LayerWarning::Truncated {
                offset,
                declared,
                available,
            } => write!(
                f,
                "region truncated at offset {offset}: {declared} bytes declared, {available} available"
            ),
            LayerWarning::UnreadableRegion { reason } => {
                write!(f, "existing hidden data is unreadable and was replaced: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerListing {
    pub slots: Vec<LayerSlot>,
    pub warnings: Vec<LayerWarning>,
    /// offset right after the last complete slot
    pub end: usize,
}

impl LayerListing {
    pub fn valid(&self) -> impl Iterator<Item = &LayerSlot> {
        self.slots
            .iter()
            .filter(|s| s.status == LayerStatus::Valid)
    }
}

/// Walks all slots of a region. Malformed envelopes are reported and
/// skipped, a slot running past the region ends the walk.
pub fn list_layers(region: &[u8]) -> LayerListing {
    let mut listing = LayerListing::default();
    let mut offset = 0;

    while offset < region.len() {
        if region.len() - offset < SLOT_HEADER {
            warn!("hiding region ends with a partial slot header at {offset}");
            listing.warnings.push(LayerWarning::Truncated {
                offset,
                declared: SLOT_HEADER,
                available: region.len() - offset,
            });
            break;
        }
        let declared = BigEndian::read_u32(&region[offset..offset + SLOT_HEADER]) as usize;
        let available = region.len() - offset - SLOT_HEADER;
        if declared > available {
            warn!("layer at offset {offset} declares {declared} bytes, only {available} left");
            listing.warnings.push(LayerWarning::Truncated {
                offset,
                declared,
                available,
            });
            break;
        }

        let index = listing.slots.len();
        let range = offset + SLOT_HEADER..offset + SLOT_HEADER + declared;
        let slot = match Envelope::unpack(&region[range.clone()]) {
            Ok(envelope) => LayerSlot {
                index,
                range: range.clone(),
                status: LayerStatus::Valid,
                kind: Some(envelope.kind),
                display_name: Some(envelope.display_name),
                length: Some(envelope.sealed.ciphertext.len()),
            },
            Err(e) => {
                warn!("skipping malformed layer {index}: {e}");
                listing.warnings.push(LayerWarning::Malformed {
                    index,
                    reason: e.to_string(),
                });
                LayerSlot {
                    index,
                    range: range.clone(),
                    status: LayerStatus::Malformed,
                    kind: None,
                    display_name: None,
                    length: None,
                }
            }
        };
        listing.slots.push(slot);
        offset = range.end;
        listing.end = offset;
    }

    listing
}

/// Appends one packed envelope after the last complete slot of `region`.
pub fn append_layer(region: &[u8], envelope: &[u8]) -> Result<Vec<u8>> {
    let end = list_layers(region).end;
    let len = u32::try_from(envelope.len())
        .map_err(|_| VeilError::InvalidOptions("layer exceeds 4 GiB".to_string()))?;

    let mut out = Vec::with_capacity(end + SLOT_HEADER + envelope.len());
    out.extend_from_slice(&region[..end]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(envelope);

    Ok(out)
}

/// bytes one more layer occupies in a region
pub fn layer_len(envelope_len: usize) -> usize {
    SLOT_HEADER + envelope_len
}

#[derive(Debug)]
pub struct SelectedLayer {
    pub index: usize,
    pub envelope: Envelope,
    pub warnings: Vec<LayerWarning>,
}

pub fn extract_layer(region: &[u8], selector: LayerSelector) -> Result<SelectedLayer> {
    let listing = list_layers(region);

    let slot = match selector {
        LayerSelector::Latest => match listing.valid().last() {
            Some(slot) => slot,
            None if listing.slots.is_empty() => return Err(VeilError::NoHiddenDataFound),
            None => {
                return Err(VeilError::PartialLayerCorrupt {
                    index: listing.slots.len() - 1,
                })
            }
        },
        LayerSelector::Index(index) => match listing.slots.get(index) {
            None => return Err(VeilError::NoHiddenDataFound),
            Some(slot) if slot.status == LayerStatus::Malformed => {
                return Err(VeilError::PartialLayerCorrupt { index })
            }
            Some(slot) => slot,
        },
    };

    let (index, range) = (slot.index, slot.range.clone());
    let envelope = Envelope::unpack(&region[range])?;

    Ok(SelectedLayer {
        index,
        envelope,
        warnings: listing.warnings,
    })
}
