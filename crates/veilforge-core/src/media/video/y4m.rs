use std::io::Write;
use std::ops::Range;

use log::{debug, error};

use crate::media::frame;
use crate::media::lsb::{LsbDecoder, LsbEncoder};
use crate::media::{CarrierFormat, Concealer, VideoOptions};
use crate::{Result, VeilError};

const FORMAT: &str = "Y4M video";
const SIGNATURE: &[u8] = b"YUV4MPEG2 ";
const FRAME_TAG: &[u8] = b"FRAME";

/// Uncompressed YUV4MPEG2 stream, data goes into the luma plane of every
/// `frame_stride`-th frame.
#[derive(Debug, Clone)]
pub struct Y4mCarrier {
    bytes: Vec<u8>,
    width: usize,
    height: usize,
    /// luma plane of every frame, as byte ranges into `bytes`
    luma: Vec<Range<usize>>,
    options: VideoOptions,
}

impl Y4mCarrier {
    pub fn parse(bytes: &[u8], options: &VideoOptions) -> Result<Self> {
        options.validate()?;
        if !bytes.starts_with(SIGNATURE) {
            return Err(VeilError::invalid_carrier(FORMAT, "missing stream signature"));
        }
        let header_end = line_end(bytes, 0)
            .ok_or_else(|| VeilError::invalid_carrier(FORMAT, "unterminated stream header"))?;
        let header = std::str::from_utf8(&bytes[SIGNATURE.len()..header_end])
            .map_err(|_| VeilError::invalid_carrier(FORMAT, "stream header is not ASCII"))?;

        let mut width = None;
        let mut height = None;
        let mut chroma = "420jpeg";
        for token in header.split_ascii_whitespace() {
            if !token.is_char_boundary(1) {
                continue;
            }
            let (tag, value) = token.split_at(1);
            match tag {
                "W" => width = value.parse::<usize>().ok(),
                "H" => height = value.parse::<usize>().ok(),
                "C" => chroma = value,
                _ => {}
            }
        }
        let (Some(width), Some(height)) = (width, height) else {
            return Err(VeilError::invalid_carrier(FORMAT, "missing frame dimensions"));
        };
        if width == 0 || height == 0 {
            return Err(VeilError::invalid_carrier(FORMAT, "empty frame dimensions"));
        }
        let luma_len = width.checked_mul(height).ok_or_else(dimensions_overflow)?;
        let frame_len = luma_len
            .checked_add(chroma_len(chroma, width, height)?)
            .ok_or_else(dimensions_overflow)?;

        let mut luma = Vec::new();
        let mut offset = header_end + 1;
        while offset < bytes.len() {
            if !bytes[offset..].starts_with(FRAME_TAG) {
                return Err(VeilError::invalid_carrier(FORMAT, "expected a frame header"));
            }
            let data_start = line_end(bytes, offset)
                .ok_or_else(|| VeilError::invalid_carrier(FORMAT, "unterminated frame header"))?
                + 1;
            let data_end = data_start
                .checked_add(frame_len)
                .filter(|end| *end <= bytes.len())
                .ok_or_else(|| VeilError::invalid_carrier(FORMAT, "last frame is truncated"))?;
            luma.push(data_start..data_start + luma_len);
            offset = data_end;
        }
        debug!(
            "{FORMAT} {width}x{height} chroma {chroma} with {} frames",
            luma.len()
        );

        Ok(Self {
            bytes: bytes.to_vec(),
            width,
            height,
            luma,
            options: options.clone(),
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn frame_count(&self) -> usize {
        self.luma.len()
    }

    fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.luma
            .iter()
            .step_by(self.options.frame_stride)
            .flat_map(|plane| plane.clone())
    }

    fn position_count(&self) -> usize {
        self.luma
            .iter()
            .step_by(self.options.frame_stride)
            .map(|plane| plane.len())
            .sum()
    }
}

/// bytes of both chroma planes (plus alpha) of one frame
fn chroma_len(chroma: &str, width: usize, height: usize) -> Result<usize> {
    let half_width = width.div_ceil(2);
    let half_height = height.div_ceil(2);

    let (planes, plane_width, plane_height) = match chroma {
        "420jpeg" | "420paldv" | "420mpeg2" | "420" => (2, half_width, half_height),
        "422" => (2, half_width, height),
        "444" => (2, width, height),
        "444alpha" => (3, width, height),
        "mono" => return Ok(0),
        other => {
            debug!("refusing Y4M chroma mode {other}");
            return Err(VeilError::UnsupportedFormat);
        }
    };

    plane_width
        .checked_mul(plane_height)
        .and_then(|plane| plane.checked_mul(planes))
        .ok_or_else(dimensions_overflow)
}

fn dimensions_overflow() -> VeilError {
    VeilError::invalid_carrier(FORMAT, "frame dimensions overflow")
}

fn line_end(bytes: &[u8], from: usize) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|b| *b == b'\n')
        .map(|p| from + p)
}

impl Concealer for Y4mCarrier {
    fn format(&self) -> CarrierFormat {
        CarrierFormat::Y4m
    }

    fn raw_capacity(&self) -> usize {
        self.position_count() / 8
    }

    fn embed(&self, region: &[u8]) -> Result<Vec<u8>> {
        let framed = frame::wrap(region)?;
        let mut bytes = self.bytes.clone();

        LsbEncoder::new(&mut bytes, self.positions())
            .write_all(&framed)
            .map_err(|e| {
                error!("Error encoding video: {e}, kind {}", e.kind());
                match e.kind() {
                    std::io::ErrorKind::WriteZero => VeilError::CapacityExceeded {
                        required: framed.len(),
                        capacity: self.raw_capacity(),
                    },
                    _ => VeilError::IoError(e),
                }
            })?;

        Ok(bytes)
    }

    fn extract(&self) -> Result<Vec<u8>> {
        let mut decoder = LsbDecoder::new(&self.bytes, self.positions());

        frame::read_framed(&mut decoder, self.raw_capacity())
    }
}
