mod dct;
mod qim;

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, error};

use super::frame;
use super::{AudioOptions, CarrierFormat, Concealer};
use crate::{Result, VeilError};

use qim::{QimDecoder, SlotLayout};

const FORMAT: &str = "WAV audio";

/// 16 bit PCM wave audio
#[derive(Debug, Clone)]
pub struct AudioCarrier {
    spec: WavSpec,
    samples: Vec<i16>,
    options: AudioOptions,
}

impl AudioCarrier {
    pub fn parse(bytes: &[u8], options: &AudioOptions) -> Result<Self> {
        options.validate()?;
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| VeilError::invalid_carrier(FORMAT, e.to_string()))?;
        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            debug!(
                "refusing {:?} audio with {} bits per sample",
                spec.sample_format, spec.bits_per_sample
            );
            return Err(VeilError::UnsupportedFormat);
        }
        let samples = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VeilError::invalid_carrier(FORMAT, e.to_string()))?;

        Ok(Self::from_samples(spec, samples, options))
    }

    pub fn from_samples(spec: WavSpec, samples: Vec<i16>, options: &AudioOptions) -> Self {
        Self {
            spec,
            samples,
            options: options.clone(),
        }
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    fn layout(&self) -> SlotLayout {
        SlotLayout::new(self.samples.len(), self.spec.channels as usize, &self.options)
    }

    fn read_region(&self, samples: &[i16]) -> Result<Vec<u8>> {
        let mut decoder = QimDecoder::new(samples, self.layout());

        frame::read_framed(&mut decoder, self.raw_capacity())
    }

    fn write_wav(&self, samples: &[i16]) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut out, self.spec).map_err(|e| {
                error!("Error creating wav writer: {e}");
                VeilError::invalid_carrier(FORMAT, e.to_string())
            })?;
            for s in samples {
                writer
                    .write_sample(*s)
                    .map_err(|e| VeilError::invalid_carrier(FORMAT, e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| VeilError::invalid_carrier(FORMAT, e.to_string()))?;
        }

        Ok(out.into_inner())
    }
}

impl Concealer for AudioCarrier {
    fn format(&self) -> CarrierFormat {
        CarrierFormat::Wav
    }

    fn raw_capacity(&self) -> usize {
        self.layout().bit_capacity() / 8
    }

    fn embed(&self, region: &[u8]) -> Result<Vec<u8>> {
        let framed = frame::wrap(region)?;
        let mut samples = self.samples.clone();

        qim::embed(&mut samples, &self.layout(), &framed).map_err(|e| {
            error!("Error encoding audio: {e}, kind {}", e.kind());
            match e.kind() {
                std::io::ErrorKind::WriteZero => VeilError::CapacityExceeded {
                    required: framed.len(),
                    capacity: self.raw_capacity(),
                },
                _ => VeilError::IoError(e),
            }
        })?;

        // clipping at full scale can flip bits, nothing is returned then
        match self.read_region(&samples) {
            Ok(read_back) if read_back == region => {}
            _ => {
                error!("hidden data did not survive quantization to 16 bit samples");
                return Err(VeilError::invalid_carrier(
                    FORMAT,
                    "samples clip at full scale",
                ));
            }
        }

        self.write_wav(&samples)
    }

    fn extract(&self) -> Result<Vec<u8>> {
        self.read_region(&self.samples)
    }
}
