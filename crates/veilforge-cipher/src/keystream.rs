//! Lightweight fallback sealing: a BLAKE3 keyed XOF is XORed over the data,
//! followed by a keyed BLAKE3 tag. The keystream alone gives no integrity,
//! the tag is what lets a wrong password be told apart.

use crate::{Key, TAG_LEN};

const STREAM_CONTEXT: &str = "veilforge 2024-01 keystream";
const TAG_CONTEXT: &str = "veilforge 2024-01 keystream tag";

pub(crate) fn apply(key: &Key, nonce: &[u8], data: &mut [u8]) {
    let stream_key = blake3::derive_key(STREAM_CONTEXT, &key[..]);
    let mut xof = blake3::Hasher::new_keyed(&stream_key)
        .update(nonce)
        .finalize_xof();

    let mut block = [0u8; 64];
    for chunk in data.chunks_mut(block.len()) {
        let block = &mut block[..chunk.len()];
        xof.fill(block);
        chunk
            .iter_mut()
            .zip(block.iter())
            .for_each(|(b, k)| *b ^= k);
    }
}

pub(crate) fn tag(key: &Key, nonce: &[u8], ciphertext: &[u8]) -> [u8; TAG_LEN] {
    let tag_key = blake3::derive_key(TAG_CONTEXT, &key[..]);
    let mut hasher = blake3::Hasher::new_keyed(&tag_key);
    hasher.update(nonce);
    hasher.update(ciphertext);

    let mut tag = [0u8; TAG_LEN];
    hasher.finalize_xof().fill(&mut tag);
    tag
}

/// compares without an early exit
pub(crate) fn tags_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
