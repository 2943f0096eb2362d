mod iterators;

use std::io::{Cursor, Write};

use image::{ImageFormat, RgbaImage};
use log::{debug, error};

use super::frame;
use super::lsb::{LsbDecoder, LsbEncoder};
use super::{CarrierFormat, Concealer, ImageOptions};
use crate::{Result, VeilError};

use iterators::{channel_position_count, channel_positions};

/// PNG or BMP image, hiding one bit per used color channel
#[derive(Debug, Clone)]
pub struct ImageCarrier {
    format: CarrierFormat,
    image: RgbaImage,
    options: ImageOptions,
}

impl ImageCarrier {
    pub fn parse(bytes: &[u8], format: CarrierFormat, options: &ImageOptions) -> Result<Self> {
        options.validate()?;
        let image_format = image_format(format)?;
        let image = image::load_from_memory_with_format(bytes, image_format)
            .map_err(|e| VeilError::invalid_carrier(format.name(), e.to_string()))?
            .to_rgba8();
        debug!(
            "{format} with {}x{} pixel, {} usable channel bytes",
            image.width(),
            image.height(),
            channel_position_count(image.width(), image.height(), options)
        );

        Ok(Self {
            format,
            image,
            options: options.clone(),
        })
    }

    pub fn from_image(image: RgbaImage, format: CarrierFormat, options: &ImageOptions) -> Self {
        Self {
            format,
            image,
            options: options.clone(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

fn image_format(format: CarrierFormat) -> Result<ImageFormat> {
    match format {
        CarrierFormat::Png => Ok(ImageFormat::Png),
        CarrierFormat::Bmp => Ok(ImageFormat::Bmp),
        _ => Err(VeilError::UnsupportedFormat),
    }
}

impl Concealer for ImageCarrier {
    fn format(&self) -> CarrierFormat {
        self.format
    }

    fn raw_capacity(&self) -> usize {
        channel_position_count(self.image.width(), self.image.height(), &self.options) / 8
    }

    fn embed(&self, region: &[u8]) -> Result<Vec<u8>> {
        let framed = frame::wrap(region)?;
        let mut image = self.image.clone();
        let (width, height) = image.dimensions();

        LsbEncoder::new(&mut image, channel_positions(width, height, &self.options))
            .write_all(&framed)
            .map_err(|e| {
                error!("Error encoding image: {e}, kind {}", e.kind());
                match e.kind() {
                    std::io::ErrorKind::WriteZero => VeilError::CapacityExceeded {
                        required: framed.len(),
                        capacity: self.raw_capacity(),
                    },
                    _ => VeilError::IoError(e),
                }
            })?;

        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, image_format(self.format)?)
            .map_err(|e| {
                error!("Error saving image: {e}");
                VeilError::invalid_carrier(self.format.name(), e.to_string())
            })?;

        Ok(out.into_inner())
    }

    fn extract(&self) -> Result<Vec<u8>> {
        let (width, height) = self.image.dimensions();
        let mut decoder =
            LsbDecoder::new(&self.image, channel_positions(width, height, &self.options));

        frame::read_framed(&mut decoder, self.raw_capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{prepare_5x5_image, prepare_noise_image};

    fn encode(image: &RgbaImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn should_embed_and_extract_in_png() {
        let bytes = encode(&prepare_noise_image(64, 48), ImageFormat::Png);
        let carrier =
            ImageCarrier::parse(&bytes, CarrierFormat::Png, &ImageOptions::default()).unwrap();
        assert_eq!(carrier.raw_capacity(), 63 * 47 * 3 / 8);

        let secret = b"Hello World!".to_vec();
        let out = carrier.embed(&secret).unwrap();
        assert_eq!(&out[..8], b"\x89PNG\r\n\x1a\n");

        let reparsed =
            ImageCarrier::parse(&out, CarrierFormat::Png, &ImageOptions::default()).unwrap();
        assert_eq!(reparsed.extract().unwrap(), secret);
        assert_eq!(reparsed.image().dimensions(), (64, 48));
    }

    #[test]
    fn should_embed_and_extract_in_bmp_with_step() {
        let options = ImageOptions {
            color_channel_step_increment: 2,
            skip_last_row_and_column: false,
            ..ImageOptions::default()
        };
        let bytes = encode(&prepare_noise_image(40, 40), ImageFormat::Bmp);
        let carrier = ImageCarrier::parse(&bytes, CarrierFormat::Bmp, &options).unwrap();
        assert_eq!(carrier.raw_capacity(), 40 * 40 * 3 / 2 / 8);

        let out = carrier.embed(b"bitmap secret").unwrap();
        assert_eq!(&out[..2], b"BM");
        let reparsed = ImageCarrier::parse(&out, CarrierFormat::Bmp, &options).unwrap();
        assert_eq!(reparsed.extract().unwrap(), b"bitmap secret");
    }

    #[test]
    fn should_not_touch_the_source_carrier() {
        let img = prepare_noise_image(16, 16);
        let carrier =
            ImageCarrier::from_image(img.clone(), CarrierFormat::Png, &ImageOptions::default());
        carrier.embed(b"some bytes").unwrap();

        assert_eq!(carrier.image(), &img);
    }

    #[test]
    fn should_report_no_hidden_data_for_a_plain_image() {
        let bytes = encode(&prepare_noise_image(32, 32), ImageFormat::Png);
        let carrier =
            ImageCarrier::parse(&bytes, CarrierFormat::Png, &ImageOptions::default()).unwrap();

        assert!(matches!(
            carrier.extract(),
            Err(VeilError::NoHiddenDataFound)
        ));
    }

    #[test]
    fn should_refuse_a_region_that_does_not_fit() {
        let carrier = ImageCarrier::from_image(
            prepare_5x5_image(),
            CarrierFormat::Png,
            &ImageOptions::default(),
        );
        // 4x4 pixel, 3 channels, 6 bytes
        assert_eq!(carrier.raw_capacity(), 6);

        assert!(matches!(
            carrier.embed(b"too much"),
            Err(VeilError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn should_refuse_a_broken_png() {
        let result = ImageCarrier::parse(
            b"\x89PNG\r\n\x1a\nbroken",
            CarrierFormat::Png,
            &ImageOptions::default(),
        );
        assert!(matches!(result, Err(VeilError::InvalidCarrier { .. })));
    }
}
