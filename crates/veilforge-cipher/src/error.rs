pub use argon2::Error as Argon2Error;
pub use chacha20poly1305::Error as Chacha20Poly1305Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Key derivation error")]
    KeyDerivationError(Argon2Error),

    #[error("Key derivation parameter error")]
    KeyDerivationParamError(Argon2Error),

    /// The tag did not verify, either the password is wrong or the ciphertext was altered
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Encryption error")]
    EncryptionError(Chacha20Poly1305Error),

    #[error("Invalid nonce length {0}, expected {1}")]
    InvalidNonceLength(usize, usize),
}
