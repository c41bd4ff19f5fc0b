//! RSA-OAEP encryption and decryption of text payloads.
//!
//! Padding is OAEP with SHA-1 for both the label hash and MGF1, matching the
//! ciphertext produced by earlier releases of the service. Textbook RSA is
//! never used.
//!
//! A payload must fit in a single OAEP block: `modulus_bytes - 2 * 20 - 2`
//! bytes, i.e. 214 bytes for a 2048-bit key.

use rand::rngs::OsRng;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey},
    pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding},
    Oaep, RsaPrivateKey, RsaPublicKey,
};
use sha1::Sha1;
use zeroize::Zeroizing;

use super::{encoding, error::CipherError};

/// Smallest modulus the service will generate.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Largest modulus the service will generate.
pub const MAX_MODULUS_BITS: usize = 4096;

/// Modulus size used when nothing else is configured.
pub const DEFAULT_MODULUS_BITS: usize = 2048;

/// SHA-1 digest length.
const HASH_LEN: usize = 20;

/// Bytes of each OAEP block consumed by padding.
pub const OAEP_OVERHEAD: usize = 2 * HASH_LEN + 2;

/// PEM-encoded key pair handed back to the caller.
pub struct KeyPair {
    /// SPKI PEM.
    pub public_pem: String,
    /// PKCS#1 PEM. Zeroed on drop.
    pub private_pem: Zeroizing<String>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_pem", &self.public_pem)
            .field("private_pem", &"[REDACTED]")
            .finish()
    }
}

/// Largest plaintext, in bytes, that fits under a key of `modulus_bits`.
pub fn max_payload_len(modulus_bits: usize) -> usize {
    (modulus_bits / 8).saturating_sub(OAEP_OVERHEAD)
}

fn oaep() -> Oaep {
    Oaep::new::<Sha1>()
}

/// Generate a fresh key pair and encrypt `plaintext` under its public half.
///
/// The size bound is checked before any key material is generated.
///
/// # Errors
///
/// - [`CipherError::InvalidModulusSize`] if `modulus_bits` is outside
///   [`MIN_MODULUS_BITS`]..=[`MAX_MODULUS_BITS`].
/// - [`CipherError::PayloadTooLarge`] if `plaintext` exceeds [`max_payload_len`].
/// - [`CipherError::Internal`] if key generation, encryption or PEM export fails.
pub fn encrypt(plaintext: &[u8], modulus_bits: usize) -> Result<(KeyPair, Vec<u8>), CipherError> {
    if !(MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&modulus_bits) {
        return Err(CipherError::InvalidModulusSize(modulus_bits));
    }
    let max = max_payload_len(modulus_bits);
    if plaintext.len() > max {
        return Err(CipherError::PayloadTooLarge {
            len: plaintext.len(),
            max,
        });
    }

    let private_key = RsaPrivateKey::new(&mut OsRng, modulus_bits)
        .map_err(|e| CipherError::Internal(format!("RSA key generation failed: {e}")))?;
    let public_key = RsaPublicKey::from(&private_key);

    let ciphertext = public_key
        .encrypt(&mut OsRng, oaep(), plaintext)
        .map_err(|e| CipherError::Internal(format!("RSA encryption failed: {e}")))?;

    let key_pair = KeyPair {
        public_pem: public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CipherError::Internal(format!("public key export failed: {e}")))?,
        private_pem: private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| CipherError::Internal(format!("private key export failed: {e}")))?,
    };

    Ok((key_pair, ciphertext))
}

/// Decrypt an OAEP ciphertext with `private_key`.
///
/// # Errors
///
/// Returns [`CipherError::DecryptionFailure`] for every failure (wrong key,
/// corrupted ciphertext, bad padding) without distinguishing between them.
pub fn decrypt(ciphertext: &[u8], private_key: &RsaPrivateKey) -> Result<Vec<u8>, CipherError> {
    private_key
        .decrypt(oaep(), ciphertext)
        .map_err(|_| CipherError::DecryptionFailure)
}

/// Parse a private key as received on the wire.
///
/// Accepted forms:
/// - PEM text (`RSA PRIVATE KEY` or `PRIVATE KEY`)
/// - base64 of a PKCS#1 or PKCS#8 DER document
/// - base64 of either PEM form
///
/// # Errors
///
/// Returns [`CipherError::MalformedInput`] if none of the forms parse.
pub fn parse_private_key(text: &str) -> Result<RsaPrivateKey, CipherError> {
    let text = text.trim();
    if text.starts_with("-----BEGIN") {
        return parse_pem(text);
    }

    let raw = Zeroizing::new(encoding::decode("privateKey", text)?);
    if raw.starts_with(b"-----BEGIN") {
        let pem = std::str::from_utf8(&raw).map_err(|_| malformed_key())?;
        return parse_pem(pem.trim());
    }

    RsaPrivateKey::from_pkcs1_der(&raw)
        .or_else(|_| RsaPrivateKey::from_pkcs8_der(&raw))
        .map_err(|_| malformed_key())
}

fn parse_pem(pem: &str) -> Result<RsaPrivateKey, CipherError> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|_| malformed_key())
}

fn malformed_key() -> CipherError {
    CipherError::MalformedInput("privateKey is not a valid RSA private key".into())
}
