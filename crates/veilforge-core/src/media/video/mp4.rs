use byteorder::{BigEndian, ByteOrder};
use log::{debug, error};

use crate::media::frame;
use crate::media::{CarrierFormat, Concealer};
use crate::{Result, VeilError};

const FORMAT: &str = "MP4 video";

/// user type of the box holding the region
pub const VEILFORGE_UUID: [u8; 16] = [
    0x56, 0x46, 0x4c, 0x53, 0x9b, 0x3e, 0x4a, 0x1d, 0x8c, 0x52, 0x2f, 0x61, 0xd0, 0x7e, 0x13, 0xa4,
];
/// ceiling for the metadata box, the container itself has no natural limit
pub const MAX_BOX_PAYLOAD: usize = 16 * 1024 * 1024;

const BOX_HEADER: usize = 8;
const LARGE_BOX_HEADER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TopLevelBox {
    kind: [u8; 4],
    start: usize,
    end: usize,
    header_len: usize,
    /// the size field was 0, the box runs to the end of the file
    open_ended: bool,
}

impl TopLevelBox {
    fn body(&self) -> std::ops::Range<usize> {
        self.start + self.header_len..self.end
    }

    fn is_ours(&self, bytes: &[u8]) -> bool {
        &self.kind == b"uuid" && bytes[self.body()].starts_with(&VEILFORGE_UUID)
    }
}

/// ISO base media file, the region lives in a top level `uuid` box.
#[derive(Debug, Clone)]
pub struct Mp4Carrier {
    bytes: Vec<u8>,
    boxes: Vec<TopLevelBox>,
}

impl Mp4Carrier {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let boxes = walk_boxes(bytes)?;
        if boxes.first().map(|b| &b.kind) != Some(b"ftyp") {
            return Err(VeilError::invalid_carrier(FORMAT, "file does not start with ftyp"));
        }
        debug!(
            "{FORMAT} with top level boxes {:?}",
            boxes
                .iter()
                .map(|b| String::from_utf8_lossy(&b.kind).into_owned())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            bytes: bytes.to_vec(),
            boxes,
        })
    }

    pub fn box_kinds(&self) -> Vec<[u8; 4]> {
        self.boxes.iter().map(|b| b.kind).collect()
    }
}

fn walk_boxes(bytes: &[u8]) -> Result<Vec<TopLevelBox>> {
    let mut boxes = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let header = bytes
            .get(offset..offset + BOX_HEADER)
            .ok_or_else(|| VeilError::invalid_carrier(FORMAT, "truncated box header"))?;
        let size = BigEndian::read_u32(&header[..4]) as u64;
        let mut kind = [0u8; 4];
        kind.copy_from_slice(&header[4..8]);

        let (header_len, end, open_ended) = match size {
            0 => (BOX_HEADER, bytes.len(), true),
            1 => {
                let large = bytes
                    .get(offset + BOX_HEADER..offset + LARGE_BOX_HEADER)
                    .ok_or_else(|| VeilError::invalid_carrier(FORMAT, "truncated box size"))?;
                let size = usize::try_from(BigEndian::read_u64(large))
                    .map_err(|_| VeilError::invalid_carrier(FORMAT, "box size overflows"))?;
                (LARGE_BOX_HEADER, offset.saturating_add(size), false)
            }
            size => (BOX_HEADER, offset + size as usize, false),
        };
        if end < offset + header_len || end > bytes.len() {
            return Err(VeilError::invalid_carrier(
                FORMAT,
                format!("box at offset {offset} has a bad size"),
            ));
        }
        boxes.push(TopLevelBox {
            kind,
            start: offset,
            end,
            header_len,
            open_ended,
        });
        offset = end;
    }

    Ok(boxes)
}

impl Concealer for Mp4Carrier {
    fn format(&self) -> CarrierFormat {
        CarrierFormat::Mp4
    }

    fn raw_capacity(&self) -> usize {
        MAX_BOX_PAYLOAD
    }

    fn embed(&self, region: &[u8]) -> Result<Vec<u8>> {
        let framed = frame::wrap(region)?;
        if framed.len() > MAX_BOX_PAYLOAD {
            error!("region of {} bytes exceeds the metadata box", framed.len());
            return Err(VeilError::CapacityExceeded {
                required: framed.len(),
                capacity: MAX_BOX_PAYLOAD,
            });
        }

        let mut bytes = self.bytes.clone();
        match self.boxes.last() {
            Some(last) if last.is_ours(&self.bytes) => bytes.truncate(last.start),
            Some(last) if last.open_ended => {
                // the new box would be swallowed, so the size gets spelled out
                let size = u32::try_from(last.end - last.start).map_err(|_| {
                    VeilError::invalid_carrier(FORMAT, "open ended box exceeds 4 GiB")
                })?;
                BigEndian::write_u32(&mut bytes[last.start..last.start + 4], size);
            }
            _ => {}
        }

        let size = BOX_HEADER + VEILFORGE_UUID.len() + framed.len();
        bytes.reserve(size);
        bytes.extend_from_slice(&(size as u32).to_be_bytes());
        bytes.extend_from_slice(b"uuid");
        bytes.extend_from_slice(&VEILFORGE_UUID);
        bytes.extend_from_slice(&framed);

        Ok(bytes)
    }

    fn extract(&self) -> Result<Vec<u8>> {
        let ours = self
            .boxes
            .iter()
            .rev()
            .find(|b| b.is_ours(&self.bytes))
            .ok_or(VeilError::NoHiddenDataFound)?;
        let body = &self.bytes[ours.body()][VEILFORGE_UUID.len()..];

        frame::unwrap(body).map(|region| region.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mp4_bytes;

    #[test]
    fn should_walk_top_level_boxes() {
        let carrier = Mp4Carrier::parse(&mp4_bytes()).unwrap();

        assert_eq!(carrier.box_kinds(), vec![*b"ftyp", *b"moov", *b"mdat"]);
        assert_eq!(carrier.raw_capacity(), MAX_BOX_PAYLOAD);
    }

    #[test]
    fn should_append_a_box_and_keep_the_others() {
        let bytes = mp4_bytes();
        let carrier = Mp4Carrier::parse(&bytes).unwrap();

        let out = carrier.embed(b"first region").unwrap();
        assert_eq!(&out[..bytes.len()], &bytes[..]);

        let reparsed = Mp4Carrier::parse(&out).unwrap();
        assert_eq!(
            reparsed.box_kinds(),
            vec![*b"ftyp", *b"moov", *b"mdat", *b"uuid"]
        );
        assert_eq!(reparsed.extract().unwrap(), b"first region");
    }

    #[test]
    fn should_replace_a_trailing_box_of_ours() {
        let carrier = Mp4Carrier::parse(&mp4_bytes()).unwrap();
        let once = carrier.embed(b"first").unwrap();
        let twice = Mp4Carrier::parse(&once)
            .unwrap()
            .embed(b"first and second")
            .unwrap();

        let reparsed = Mp4Carrier::parse(&twice).unwrap();
        assert_eq!(reparsed.box_kinds().len(), 4);
        assert_eq!(reparsed.extract().unwrap(), b"first and second");
    }

    #[test]
    fn should_close_an_open_ended_last_box() {
        let mut bytes = mp4_bytes();
        let mdat = Mp4Carrier::parse(&bytes).unwrap().boxes[2].start;
        bytes[mdat..mdat + 4].copy_from_slice(&[0, 0, 0, 0]);

        let carrier = Mp4Carrier::parse(&bytes).unwrap();
        assert!(carrier.boxes[2].open_ended);

        let out = carrier.embed(b"after mdat").unwrap();
        let reparsed = Mp4Carrier::parse(&out).unwrap();
        assert_eq!(reparsed.box_kinds().len(), 4);
        assert_eq!(reparsed.extract().unwrap(), b"after mdat");
    }

    #[test]
    fn should_report_no_hidden_data_without_our_box() {
        let carrier = Mp4Carrier::parse(&mp4_bytes()).unwrap();

        assert!(matches!(
            carrier.extract(),
            Err(VeilError::NoHiddenDataFound)
        ));
    }

    #[test]
    fn should_refuse_bad_box_sizes() {
        let mut bytes = mp4_bytes();
        bytes[3] = 0xff;

        assert!(matches!(
            Mp4Carrier::parse(&bytes),
            Err(VeilError::InvalidCarrier { .. })
        ));
    }
}
