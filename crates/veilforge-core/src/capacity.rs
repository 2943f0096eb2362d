//! Safety adjusted capacity of a carrier and the pre-flight check run before
//! any key derivation or carrier mutation.

use log::debug;
use serde::Serialize;
use veilforge_cipher::CipherMode;

use crate::envelope::Envelope;
use crate::layers::layer_len;
use crate::media::frame::FRAME_OVERHEAD;
use crate::media::{CarrierFormat, Concealer};
use crate::{Result, VeilError};

/// Share of the raw capacity that is offered to callers. Lossless pixel and
/// sample carriers keep a margin, slot based containers use their ceiling.
pub fn safety_factor(format: CarrierFormat) -> f64 {
    match format {
        CarrierFormat::Png | CarrierFormat::Bmp => 0.9,
        CarrierFormat::Wav => 0.8,
        CarrierFormat::Y4m => 0.9,
        CarrierFormat::Text => 0.9,
        CarrierFormat::Mp4 | CarrierFormat::Pdf | CarrierFormat::Package => 1.0,
    }
}

/// region bytes a carrier with `raw` framed bytes offers
pub fn safe_capacity(format: CarrierFormat, raw: usize) -> usize {
    ((raw as f64 * safety_factor(format)).floor() as usize).saturating_sub(FRAME_OVERHEAD)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityReport {
    pub format: CarrierFormat,
    /// bytes the codec can physically store, frame included
    pub raw_bytes: usize,
    /// region bytes offered after the safety factor
    pub capacity_bytes: usize,
    /// region bytes taken by existing layers
    pub used_bytes: usize,
    /// region bytes after the planned layer, equal to `used_bytes` when
    /// nothing is planned
    pub required_bytes: usize,
    pub fits: bool,
    /// share of the capacity still free after the planned layer
    pub margin_ratio: f64,
}

impl CapacityReport {
    pub fn new(carrier: &impl Concealer, used_bytes: usize, planned_bytes: usize) -> Self {
        let format = carrier.format();
        let raw_bytes = carrier.raw_capacity();
        let capacity_bytes = safe_capacity(format, raw_bytes);
        let required_bytes = used_bytes + planned_bytes;
        let margin_ratio = if capacity_bytes == 0 {
            0.0
        } else {
            (capacity_bytes as f64 - required_bytes as f64) / capacity_bytes as f64
        };

        Self {
            format,
            raw_bytes,
            capacity_bytes,
            used_bytes,
            required_bytes,
            fits: required_bytes <= capacity_bytes,
            margin_ratio,
        }
    }

    pub fn free_bytes(&self) -> usize {
        self.capacity_bytes.saturating_sub(self.required_bytes)
    }

    /// largest plaintext one more layer can hold
    pub fn max_payload_len(&self, name_len: usize, mode: CipherMode) -> usize {
        let layer_overhead = layer_len(Envelope::overhead(name_len, mode));
        self.capacity_bytes
            .saturating_sub(self.used_bytes)
            .saturating_sub(layer_overhead)
    }

    /// fails with `CapacityExceeded` unless the planned layer fits
    pub fn check(&self) -> Result<()> {
        debug!(
            "{} needs {} of {} bytes ({} raw)",
            self.format, self.required_bytes, self.capacity_bytes, self.raw_bytes
        );
        if !self.fits {
            return Err(VeilError::CapacityExceeded {
                required: self.required_bytes,
                capacity: self.capacity_bytes,
            });
        }

        Ok(())
    }
}

/// region bytes one more layer takes for a plaintext of `payload_len` bytes
pub fn planned_layer_len(payload_len: usize, name_len: usize, mode: CipherMode) -> usize {
    layer_len(Envelope::overhead(name_len, mode) + payload_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::document::TextCarrier;
    use crate::test_utils::text_bytes;

    #[test]
    fn should_apply_the_safety_factor_and_frame() {
        assert_eq!(safe_capacity(CarrierFormat::Wav, 1000), 800 - FRAME_OVERHEAD);
        assert_eq!(safe_capacity(CarrierFormat::Pdf, 4096), 4096 - FRAME_OVERHEAD);
        assert_eq!(safe_capacity(CarrierFormat::Png, 5), 0);
    }

    #[test]
    fn should_fit_exactly_at_capacity() {
        // 1000 lines, 900 usable, 892 for the region
        let carrier = TextCarrier::parse(&text_bytes(1000)).unwrap();
        let empty = CapacityReport::new(&carrier, 0, 0);
        assert_eq!(empty.capacity_bytes, 892);

        let max = empty.max_payload_len(4, CipherMode::Keystream);
        let exact = CapacityReport::new(
            &carrier,
            0,
            planned_layer_len(max, 4, CipherMode::Keystream),
        );
        assert_eq!(exact.required_bytes, 892);
        assert!(exact.check().is_ok());
        assert_eq!(exact.free_bytes(), 0);

        let over = CapacityReport::new(
            &carrier,
            0,
            planned_layer_len(max + 1, 4, CipherMode::Keystream),
        );
        assert!(matches!(
            over.check(),
            Err(VeilError::CapacityExceeded {
                required: 893,
                capacity: 892
            })
        ));
    }

    #[test]
    fn should_count_existing_layers() {
        let carrier = TextCarrier::parse(&text_bytes(1000)).unwrap();
        let report = CapacityReport::new(&carrier, 500, 100);

        assert_eq!(report.required_bytes, 600);
        assert!(report.fits);
        assert!((report.margin_ratio - 292.0 / 892.0).abs() < 1e-9);
        assert_eq!(
            report.max_payload_len(0, CipherMode::Aead),
            892 - 500 - layer_len(Envelope::overhead(0, CipherMode::Aead))
        );
    }
}
