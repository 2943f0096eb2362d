//! # Password sealing
//! Payloads are sealed with a key derived by argon2id from a password and a
//! random salt. Two modes exist: XChaCha20-Poly1305 (the default) and a
//! lighter BLAKE3 keystream with a keyed tag. Every parameter that opening
//! needs is returned in [`SealParams`], so the caller can store it.

use chacha20poly1305::aead::Aead;
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

pub mod error;
mod kdf;
mod keystream;
mod password;

pub use crate::error::CipherError;
pub use crate::kdf::KdfParams;
pub use crate::password::{generate_password, PasswordStrength, DEFAULT_PASSWORD_LEN};

pub const SALT_LEN: usize = 32;
pub const KEY_LEN: usize = 32;
/// authentication tag length of both modes
pub const TAG_LEN: usize = 16;

pub type Result<T> = std::result::Result<T, CipherError>;
pub type Key = Zeroizing<[u8; KEY_LEN]>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// XChaCha20-Poly1305
    #[default]
    Aead,
    /// BLAKE3 keystream with a keyed BLAKE3 tag
    Keystream,
}

impl CipherMode {
    pub fn id(&self) -> u8 {
        match self {
            CipherMode::Aead => 1,
            CipherMode::Keystream => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(CipherMode::Aead),
            2 => Some(CipherMode::Keystream),
            _ => None,
        }
    }

    pub fn nonce_len(&self) -> usize {
        match self {
            CipherMode::Aead => 24,
            CipherMode::Keystream => 16,
        }
    }

    /// bytes the ciphertext grows by compared to the plaintext
    pub fn expansion(&self) -> usize {
        TAG_LEN
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CipherOptions {
    pub mode: CipherMode,
    pub kdf: KdfParams,
}

impl CipherOptions {
    pub fn new(mode: CipherMode, kdf: KdfParams) -> Self {
        Self { mode, kdf }
    }
}

/// Everything besides the password that is needed to open a ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealParams {
    pub mode: CipherMode,
    pub kdf: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    /// crc32 over the ciphertext
    pub checksum: u32,
    pub params: SealParams,
}

/// encrypt `payload` with `password`, a fresh salt and nonce are drawn for every call
pub fn encrypt(payload: &[u8], password: &str, options: &CipherOptions) -> Result<Sealed> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = vec![0u8; options.mode.nonce_len()];
    OsRng.fill_bytes(&mut nonce);

    let key = kdf::derive_key(password.as_bytes(), &salt, &options.kdf)?;
    let ciphertext = match options.mode {
        CipherMode::Aead => XChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(&key[..]))
            .encrypt(XNonce::from_slice(&nonce), payload)
            .map_err(CipherError::EncryptionError)?,
        CipherMode::Keystream => {
            let mut data = payload.to_vec();
            keystream::apply(&key, &nonce, &mut data);
            let tag = keystream::tag(&key, &nonce, &data);
            data.extend_from_slice(&tag);
            data
        }
    };

    Ok(Sealed {
        checksum: checksum(&ciphertext),
        ciphertext,
        params: SealParams {
            mode: options.mode,
            kdf: options.kdf,
            salt,
            nonce,
        },
    })
}

/// decrypt `ciphertext`, a wrong password or any altered byte yields [`CipherError::AuthenticationFailed`]
pub fn decrypt(ciphertext: &[u8], password: &str, params: &SealParams) -> Result<Vec<u8>> {
    let expected_nonce = params.mode.nonce_len();
    if params.nonce.len() != expected_nonce {
        return Err(CipherError::InvalidNonceLength(
            params.nonce.len(),
            expected_nonce,
        ));
    }
    if ciphertext.len() < TAG_LEN {
        return Err(CipherError::AuthenticationFailed);
    }

    let key = kdf::derive_key(password.as_bytes(), &params.salt, &params.kdf)?;
    match params.mode {
        CipherMode::Aead => XChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(&key[..]))
            .decrypt(XNonce::from_slice(&params.nonce), ciphertext)
            .map_err(|_| CipherError::AuthenticationFailed),
        CipherMode::Keystream => {
            let (data, tag) = ciphertext.split_at(ciphertext.len() - TAG_LEN);
            let expected = keystream::tag(&key, &params.nonce, data);
            if !keystream::tags_match(&expected, tag) {
                return Err(CipherError::AuthenticationFailed);
            }
            let mut plain = data.to_vec();
            keystream::apply(&key, &params.nonce, &mut plain);
            Ok(plain)
        }
    }
}

pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
