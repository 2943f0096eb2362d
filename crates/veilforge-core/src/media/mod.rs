pub mod audio;
pub mod codec_options;
pub mod document;
pub mod frame;
pub mod image;
mod lsb;
mod types;
pub mod video;

use enum_dispatch::enum_dispatch;
use log::debug;

pub use codec_options::{AudioOptions, ImageOptions, VideoOptions};
pub use types::*;

use self::audio::AudioCarrier;
use self::document::{PackageCarrier, PdfCarrier, TextCarrier};
use self::image::ImageCarrier;
use self::video::{Mp4Carrier, Y4mCarrier};
use crate::{EngineOptions, Result};

/// One hiding strategy over one parsed carrier.
///
/// Embedding never touches `self`, it always produces fresh carrier bytes.
#[enum_dispatch]
pub trait Concealer {
    fn format(&self) -> CarrierFormat;

    /// bytes the carrier can take, including the region framing
    fn raw_capacity(&self) -> usize;

    /// returns new carrier bytes holding `region`
    fn embed(&self, region: &[u8]) -> Result<Vec<u8>>;

    /// returns the region stored in the carrier, or `NoHiddenDataFound`
    fn extract(&self) -> Result<Vec<u8>>;
}

/// a parsed carrier of any supported format
#[enum_dispatch(Concealer)]
#[derive(Debug)]
pub enum Carrier {
    Image(ImageCarrier),
    Audio(AudioCarrier),
    Video(VideoCarrier),
    Document(DocumentCarrier),
}

#[enum_dispatch(Concealer)]
#[derive(Debug)]
pub enum VideoCarrier {
    Y4m(Y4mCarrier),
    Mp4(Mp4Carrier),
}

#[enum_dispatch(Concealer)]
#[derive(Debug)]
pub enum DocumentCarrier {
    Text(TextCarrier),
    Pdf(PdfCarrier),
    Package(PackageCarrier),
}

impl Carrier {
    /// Detects the format by signature and parses the carrier.
    pub fn detect(bytes: &[u8], name_hint: Option<&str>, options: &EngineOptions) -> Result<Self> {
        let format = CarrierFormat::sniff(bytes, name_hint)?;
        debug!("detected {format} carrier of {} bytes", bytes.len());

        let carrier: Carrier = match format {
            CarrierFormat::Png | CarrierFormat::Bmp => {
                ImageCarrier::parse(bytes, format, &options.image)?.into()
            }
            CarrierFormat::Wav => AudioCarrier::parse(bytes, &options.audio)?.into(),
            CarrierFormat::Y4m => {
                VideoCarrier::from(Y4mCarrier::parse(bytes, &options.video)?).into()
            }
            CarrierFormat::Mp4 => VideoCarrier::from(Mp4Carrier::parse(bytes)?).into(),
            CarrierFormat::Text => DocumentCarrier::from(TextCarrier::parse(bytes)?).into(),
            CarrierFormat::Pdf => DocumentCarrier::from(PdfCarrier::parse(bytes)?).into(),
            CarrierFormat::Package => {
                DocumentCarrier::from(PackageCarrier::parse(bytes)?).into()
            }
        };

        Ok(carrier)
    }
}
