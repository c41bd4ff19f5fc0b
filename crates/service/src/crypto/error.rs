//! Errors produced by the cipher layer.

use common::ServiceError;
use thiserror::Error;

/// Errors produced by the cipher layer.
///
/// No variant carries key material or plaintext.
#[derive(Debug, Error)]
pub enum CipherError {
    /// A field is not valid base64, has the wrong length, or is not a parsable key.
    #[error("{0}")]
    MalformedInput(String),

    /// The symmetric authentication tag did not verify.
    #[error("authentication tag mismatch")]
    AuthenticationFailure,

    /// Public-key decryption failed. Deliberately carries no detail.
    #[error("decryption failed")]
    DecryptionFailure,

    /// The plaintext does not fit in a single OAEP block.
    #[error("payload is {len} bytes, the maximum for this key size is {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// The requested modulus size is outside the supported range.
    #[error("unsupported RSA modulus size: {0} bits")]
    InvalidModulusSize(usize),

    /// Key generation, encryption or key export failed unexpectedly.
    #[error("{0}")]
    Internal(String),
}

impl From<CipherError> for ServiceError {
    fn from(err: CipherError) -> Self {
        let message = err.to_string();
        match err {
            CipherError::MalformedInput(_) => ServiceError::MalformedInput(message),
            CipherError::AuthenticationFailure => ServiceError::Authentication(message),
            CipherError::DecryptionFailure => ServiceError::Decryption(message),
            CipherError::PayloadTooLarge { .. } => ServiceError::PayloadTooLarge(message),
            CipherError::InvalidModulusSize(_) | CipherError::Internal(_) => {
                ServiceError::Internal(message)
            }
        }
    }
}
