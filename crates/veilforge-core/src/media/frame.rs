//! Framing of the hiding region, so that a carrier without hidden data is
//! rejected after reading a few bytes.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

use crate::{Result, VeilError};

pub const FRAME_MAGIC: &[u8; 4] = b"VFLS";
/// magic plus the u32 region length
pub const FRAME_OVERHEAD: usize = 8;

pub fn wrap(region: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(region.len())
        .map_err(|_| VeilError::InvalidOptions("hiding region exceeds 4 GiB".to_string()))?;

    let mut framed = Vec::with_capacity(FRAME_OVERHEAD + region.len());
    framed.extend_from_slice(FRAME_MAGIC);
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(region);

    Ok(framed)
}

/// Validates a frame header and returns the declared region length.
pub fn region_len(header: &[u8]) -> Result<usize> {
    if header.len() < FRAME_OVERHEAD || &header[..4] != FRAME_MAGIC {
        return Err(VeilError::NoHiddenDataFound);
    }

    Ok(BigEndian::read_u32(&header[4..FRAME_OVERHEAD]) as usize)
}

/// Returns the region of a complete frame, bytes after the region are ignored.
/// A frame cut short is corrupt rather than absent.
pub fn unwrap(framed: &[u8]) -> Result<&[u8]> {
    let len = region_len(framed)?;
    framed
        .get(FRAME_OVERHEAD..FRAME_OVERHEAD + len)
        .ok_or_else(|| {
            VeilError::EnvelopeCorrupt(format!(
                "hiding region declares {len} bytes, only {} stored",
                framed.len() - FRAME_OVERHEAD
            ))
        })
}

/// Reads a frame from a bit level decoder, `capacity` bounds the declared
/// length so noise in a plain carrier is not mistaken for a huge region.
pub fn read_framed<R: Read>(reader: &mut R, capacity: usize) -> Result<Vec<u8>> {
    let mut header = [0u8; FRAME_OVERHEAD];
    reader
        .read_exact(&mut header)
        .map_err(|_| VeilError::NoHiddenDataFound)?;
    let len = region_len(&header)?;
    if len > capacity.saturating_sub(FRAME_OVERHEAD) {
        return Err(VeilError::NoHiddenDataFound);
    }

    let mut region = vec![0u8; len];
    reader
        .read_exact(&mut region)
        .map_err(|_| VeilError::NoHiddenDataFound)?;

    Ok(region)
}
