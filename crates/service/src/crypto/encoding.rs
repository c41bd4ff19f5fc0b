//! Base64 helpers for binary values crossing the text boundary.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::error::CipherError;

/// Encode bytes as standard, padded base64.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 field, ignoring surrounding whitespace.
///
/// The error names `field` but never echoes the offending value.
pub fn decode(field: &str, text: &str) -> Result<Vec<u8>, CipherError> {
    STANDARD
        .decode(text.trim())
        .map_err(|_| CipherError::MalformedInput(format!("{field} is not valid base64")))
}
