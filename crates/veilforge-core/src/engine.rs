//! The four engine operations. Every call parses its carrier from scratch,
//! nothing is shared between calls besides the options passed in.

use log::{info, warn};
use veilforge_cipher::CipherOptions;

use crate::capacity::{planned_layer_len, CapacityReport};
use crate::content::{ContentKind, Payload};
use crate::envelope::{Envelope, Plaintext};
use crate::layers::{
    append_layer, extract_layer, list_layers, LayerListing, LayerSelector, LayerWarning,
};
use crate::media::{AudioOptions, Carrier, CarrierFormat, Concealer, ImageOptions, VideoOptions};
use crate::{Result, VeilError};

/// Per call options of all codecs and the cipher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOptions {
    pub image: ImageOptions,
    pub audio: AudioOptions,
    pub video: VideoOptions,
    pub cipher: CipherOptions,
    /// deflate payloads before sealing when that makes them smaller
    pub compress: bool,
}

impl EngineOptions {
    pub fn with_cipher(mut self, cipher: CipherOptions) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Rejects key derivation costs that a later reveal would refuse as corrupt.
    pub fn validate(&self) -> Result<()> {
        let kdf = &self.cipher.kdf;
        if !kdf.is_plausible() {
            return Err(VeilError::InvalidOptions(format!(
                "key derivation costs out of bounds: m={} KiB, t={}, p={}",
                kdf.m_cost, kdf.t_cost, kdf.p_cost
            )));
        }

        Ok(())
    }
}

/// Outcome of a successful [`conceal`].
#[derive(Debug)]
pub struct Concealed {
    /// the new carrier, same format as the input
    pub carrier: Vec<u8>,
    pub format: CarrierFormat,
    /// index of the new layer within the carrier
    pub layer_index: usize,
    pub kind: ContentKind,
    pub display_name: String,
    pub capacity: CapacityReport,
    pub warnings: Vec<LayerWarning>,
}

/// Outcome of a successful [`reveal`].
#[derive(Debug)]
pub struct Revealed {
    pub payload: Payload,
    pub layer_index: usize,
    pub format: CarrierFormat,
    pub warnings: Vec<LayerWarning>,
}

impl Revealed {
    pub fn kind(&self) -> ContentKind {
        self.payload.kind()
    }

    pub fn display_name(&self) -> &str {
        self.payload.display_name()
    }
}

/// Reads the existing region, a carrier without hidden data has an empty one.
fn existing_region(carrier: &Carrier) -> Result<Vec<u8>> {
    match carrier.extract() {
        Err(VeilError::NoHiddenDataFound) => Ok(Vec::new()),
        other => other,
    }
}

/// Hides `payload` as a new layer on top of whatever the carrier holds.
pub fn conceal(
    carrier_bytes: &[u8],
    name_hint: Option<&str>,
    payload: &Payload,
    password: &str,
    options: &EngineOptions,
) -> Result<Concealed> {
    if password.is_empty() {
        return Err(VeilError::MissingPassword);
    }
    options.validate()?;
    let carrier = Carrier::detect(carrier_bytes, name_hint, options)?;
    let format = carrier.format();

    let mut warnings = Vec::new();
    let region = existing_region(&carrier).unwrap_or_else(|e| {
        warn!("{format} carrier holds unreadable hidden data, starting over: {e}");
        warnings.push(LayerWarning::UnreadableRegion {
            reason: e.to_string(),
        });
        Vec::new()
    });
    let listing = list_layers(&region);
    warnings.extend(listing.warnings.iter().cloned());

    let plaintext = Plaintext::prepare(payload, options.compress)?;
    let plain_len = plaintext.bytes.len();
    let compressed = plaintext.compressed;
    let report = CapacityReport::new(
        &carrier,
        listing.end,
        planned_layer_len(plain_len, plaintext.display_name.len(), options.cipher.mode),
    );
    report.check()?;

    let envelope = Envelope::seal_plaintext(plaintext, password, &options.cipher)?;
    let region = append_layer(&region, &envelope.pack()?)?;
    let carrier_bytes = carrier.embed(&region)?;
    let layer_index = listing.slots.len();
    info!(
        "concealed {} bytes{} of {:?} as layer {layer_index} in {format}, {} of {} bytes used",
        plain_len,
        if compressed { " deflated" } else { "" },
        payload.kind(),
        report.required_bytes,
        report.capacity_bytes
    );

    Ok(Concealed {
        carrier: carrier_bytes,
        format,
        layer_index,
        kind: payload.kind(),
        display_name: payload.display_name().to_string(),
        capacity: report,
        warnings,
    })
}

/// Opens the selected layer of a carrier.
pub fn reveal(
    carrier_bytes: &[u8],
    name_hint: Option<&str>,
    password: &str,
    selector: LayerSelector,
    options: &EngineOptions,
) -> Result<Revealed> {
    if password.is_empty() {
        return Err(VeilError::MissingPassword);
    }
    let carrier = Carrier::detect(carrier_bytes, name_hint, options)?;
    let format = carrier.format();

    let region = carrier.extract()?;
    let selected = extract_layer(&region, selector)?;
    let payload = selected.envelope.open(password)?;
    info!(
        "revealed layer {} of {format}: {:?} {}",
        selected.index,
        payload.kind(),
        payload.display_name()
    );

    Ok(Revealed {
        payload,
        layer_index: selected.index,
        format,
        warnings: selected.warnings,
    })
}

/// Lists the layers of a carrier without any password.
pub fn layers(
    carrier_bytes: &[u8],
    name_hint: Option<&str>,
    options: &EngineOptions,
) -> Result<LayerListing> {
    let carrier = Carrier::detect(carrier_bytes, name_hint, options)?;
    let region = existing_region(&carrier)?;

    Ok(list_layers(&region))
}

/// Reports the capacity of a carrier and how much of it existing layers take.
pub fn capacity(
    carrier_bytes: &[u8],
    name_hint: Option<&str>,
    options: &EngineOptions,
) -> Result<CapacityReport> {
    let carrier = Carrier::detect(carrier_bytes, name_hint, options)?;
    let used = existing_region(&carrier)
        .map(|region| list_layers(&region).end)
        .unwrap_or(0);

    Ok(CapacityReport::new(&carrier, used, 0))
}
