//! Self describing wrapper around one sealed payload.
//!
//! Layout, all integers big endian:
//!
//! ```text
//! magic "VFEN" | version u8 | kind u8 | mode u8 | m_cost u32 | t_cost u32 | p_cost u8
//! flags u8 | salt [32] | nonce_len u8 | nonce | name_len u16 | name utf-8
//! checksum u32 | length u32 | ciphertext
//! ```
//!
//! Bit 0 of `flags` marks a zlib compressed plaintext, other bits must be zero.

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use veilforge_cipher::{
    checksum, decrypt, encrypt, CipherMode, CipherOptions, KdfParams, SealParams, Sealed, SALT_LEN,
};

use crate::compression::{deflate, inflate, MAX_INFLATED_LEN};
use crate::content::{ContentKind, Payload};
use crate::{Result, VeilError};

pub const MAGIC: &[u8; 4] = b"VFEN";
pub const VERSION: u8 = 1;

/// bytes of the layout that do not depend on nonce, name or ciphertext
pub const FIXED_LEN: usize = 4 + 1 + 1 + 1 + 4 + 4 + 1 + 1 + SALT_LEN + 1 + 2 + 4 + 4;

const FLAG_DEFLATE: u8 = 0b0000_0001;

/// Plaintext of a payload as it goes into the cipher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plaintext {
    pub kind: ContentKind,
    pub display_name: String,
    pub bytes: Vec<u8>,
    pub compressed: bool,
}

impl Plaintext {
    /// content bytes of `payload`, deflated if asked for and only when that makes them smaller
    pub fn prepare(payload: &Payload, compress: bool) -> Result<Self> {
        let plain = payload.to_bytes()?;
        let deflated = if compress { deflate(&plain)? } else { None };
        let (bytes, compressed) = match deflated {
            Some(deflated) => (deflated, true),
            None => (plain, false),
        };

        Ok(Self {
            kind: payload.kind(),
            display_name: payload.display_name().to_string(),
            bytes,
            compressed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub kind: ContentKind,
    pub display_name: String,
    pub compressed: bool,
    pub sealed: Sealed,
}

impl Envelope {
    /// exact envelope size minus the plaintext length
    pub fn overhead(name_len: usize, mode: CipherMode) -> usize {
        FIXED_LEN + mode.nonce_len() + name_len + mode.expansion()
    }

    /// encrypts the payload uncompressed, the key derivation happens here
    pub fn seal(payload: &Payload, password: &str, options: &CipherOptions) -> Result<Self> {
        Self::seal_plaintext(Plaintext::prepare(payload, false)?, password, options)
    }

    pub fn seal_plaintext(
        plaintext: Plaintext,
        password: &str,
        options: &CipherOptions,
    ) -> Result<Self> {
        let sealed = encrypt(&plaintext.bytes, password, options)?;

        Ok(Self {
            kind: plaintext.kind,
            display_name: plaintext.display_name,
            compressed: plaintext.compressed,
            sealed,
        })
    }

    /// checksum first, then authentication, then the content itself
    pub fn open(&self, password: &str) -> Result<Payload> {
        if checksum(&self.sealed.ciphertext) != self.sealed.checksum {
            return Err(VeilError::EnvelopeCorrupt(
                "checksum does not match the ciphertext".to_string(),
            ));
        }
        let mut plain = decrypt(&self.sealed.ciphertext, password, &self.sealed.params)?;
        if self.compressed {
            plain = inflate(&plain, MAX_INFLATED_LEN)?;
        }

        Payload::from_parts(self.kind, &self.display_name, plain)
    }

    pub fn packed_len(&self) -> usize {
        FIXED_LEN
            + self.sealed.params.nonce.len()
            + self.display_name.len()
            + self.sealed.ciphertext.len()
    }

    pub fn pack(&self) -> Result<Vec<u8>> {
        let name = self.display_name.as_bytes();
        let name_len = u16::try_from(name.len())
            .map_err(|_| VeilError::InvalidOptions("display name is too long".to_string()))?;
        let length = u32::try_from(self.sealed.ciphertext.len())
            .map_err(|_| VeilError::InvalidOptions("payload is too large".to_string()))?;
        let params = &self.sealed.params;
        let p_cost = u8::try_from(params.kdf.p_cost)
            .map_err(|_| VeilError::InvalidOptions("parallelism is too high".to_string()))?;

        let mut buf = Vec::with_capacity(self.packed_len());
        buf.write_all(MAGIC)?;
        buf.write_u8(VERSION)?;
        buf.write_u8(self.kind.id())?;
        buf.write_u8(params.mode.id())?;
        buf.write_u32::<BigEndian>(params.kdf.m_cost)?;
        buf.write_u32::<BigEndian>(params.kdf.t_cost)?;
        buf.write_u8(p_cost)?;
        buf.write_u8(if self.compressed { FLAG_DEFLATE } else { 0 })?;
        buf.write_all(&params.salt)?;
        buf.write_u8(params.nonce.len() as u8)?;
        buf.write_all(&params.nonce)?;
        buf.write_u16::<BigEndian>(name_len)?;
        buf.write_all(name)?;
        buf.write_u32::<BigEndian>(self.sealed.checksum)?;
        buf.write_u32::<BigEndian>(length)?;
        buf.write_all(&self.sealed.ciphertext)?;

        Ok(buf)
    }

    pub fn unpack(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let envelope = Self::read_from(&mut cursor).map_err(|e| match e {
            VeilError::IoError(_) => VeilError::EnvelopeCorrupt("envelope is truncated".into()),
            e => e,
        })?;
        if cursor.position() as usize != bytes.len() {
            return Err(VeilError::EnvelopeCorrupt(
                "trailing bytes after the ciphertext".to_string(),
            ));
        }

        Ok(envelope)
    }

    fn read_from(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(corrupt("wrong magic"));
        }
        let version = r.read_u8()?;
        if version != VERSION {
            return Err(corrupt(format!("unknown version {version}")));
        }
        let kind_id = r.read_u8()?;
        let kind = ContentKind::from_id(kind_id)
            .ok_or_else(|| corrupt(format!("unknown content kind {kind_id}")))?;
        let mode_id = r.read_u8()?;
        let mode = CipherMode::from_id(mode_id)
            .ok_or_else(|| corrupt(format!("unknown cipher mode {mode_id}")))?;

        let m_cost = r.read_u32::<BigEndian>()?;
        let t_cost = r.read_u32::<BigEndian>()?;
        let p_cost = r.read_u8()? as u32;
        let kdf = KdfParams::new(m_cost, t_cost, p_cost);
        if !kdf.is_plausible() {
            return Err(corrupt("key derivation parameters out of bounds"));
        }
        let flags = r.read_u8()?;
        if flags & !FLAG_DEFLATE != 0 {
            return Err(corrupt(format!("unknown flags {flags:#010b}")));
        }

        let mut salt = [0u8; SALT_LEN];
        r.read_exact(&mut salt)?;
        let nonce_len = r.read_u8()? as usize;
        if nonce_len != mode.nonce_len() {
            return Err(corrupt(format!("nonce length {nonce_len} does not fit the mode")));
        }
        let mut nonce = vec![0u8; nonce_len];
        r.read_exact(&mut nonce)?;

        let name_len = r.read_u16::<BigEndian>()? as usize;
        let mut name = vec![0u8; name_len];
        r.read_exact(&mut name)?;
        let display_name =
            String::from_utf8(name).map_err(|_| corrupt("display name is not valid UTF-8"))?;

        let checksum = r.read_u32::<BigEndian>()?;
        let length = r.read_u32::<BigEndian>()? as usize;
        let remaining = r.get_ref().len() - r.position() as usize;
        if length != remaining {
            return Err(corrupt(format!(
                "declared length {length} but {remaining} bytes follow"
            )));
        }
        if length < mode.expansion() {
            return Err(corrupt("ciphertext is shorter than its tag"));
        }
        let mut ciphertext = vec![0u8; length];
        r.read_exact(&mut ciphertext)?;

        Ok(Self {
            kind,
            display_name,
            compressed: flags & FLAG_DEFLATE != 0,
            sealed: Sealed {
                ciphertext,
                checksum,
                params: SealParams {
                    mode,
                    kdf,
                    salt,
                    nonce,
                },
            },
        })
    }
}

fn corrupt(reason: impl Into<String>) -> VeilError {
    VeilError::EnvelopeCorrupt(reason.into())
}
