//! Optional zlib compression of plaintext, applied before sealing.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::{Result, VeilError};

/// largest plaintext an opened envelope may inflate to
pub const MAX_INFLATED_LEN: usize = 256 * 1024 * 1024;

/// Deflates `data`, `None` when the result would not be smaller.
pub fn deflate(data: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;

    Ok((compressed.len() < data.len()).then_some(compressed))
}

/// Inflates `data`, refusing to produce more than `limit` bytes.
pub fn inflate(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut plain = Vec::new();
    ZlibDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut plain)
        .map_err(|e| VeilError::EnvelopeCorrupt(format!("compressed payload is broken: {e}")))?;
    if plain.len() > limit {
        return Err(VeilError::EnvelopeCorrupt(format!(
            "compressed payload inflates past {limit} bytes"
        )));
    }

    Ok(plain)
}
