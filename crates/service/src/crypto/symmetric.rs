//! AES-128-EAX encryption and decryption of text payloads.
//!
//! **Construction:** AES-128 in EAX mode with no associated data. The nonce is
//! 16 random bytes and the 16-byte tag is kept detached from the ciphertext,
//! so a sealed payload crosses the wire as three separate base64 fields.
//!
//! A fresh key is generated for every call to [`encrypt`], which means a
//! (key, nonce) pair can never repeat.

use aes::Aes128;
use eax::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit},
    Eax,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use super::{encoding, error::CipherError};

/// Byte length of an AES-128 key (16 bytes = 128 bits).
pub const KEY_LEN: usize = 16;

/// Byte length of an EAX nonce (16 bytes = 128 bits).
pub const NONCE_LEN: usize = 16;

/// Byte length of an EAX authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

type Aes128Eax = Eax<Aes128>;

/// An AES-128 key. Zeroed on drop.
#[derive(Clone)]
pub struct SymmetricKey(Zeroizing<[u8; KEY_LEN]>);

impl SymmetricKey {
    /// Generate a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut key[..]);
        Self(key)
    }

    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedInput`] unless `bytes` is exactly [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() != KEY_LEN {
            return Err(CipherError::MalformedInput(format!(
                "encryptionKey must be {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Decode a base64 key as received on the wire.
    pub fn from_encoded(text: &str) -> Result<Self, CipherError> {
        let raw = Zeroizing::new(encoding::decode("encryptionKey", text)?);
        Self::from_bytes(&raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn to_encoded(&self) -> String {
        encoding::encode(self.as_bytes())
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Ciphertext with its nonce and detached authentication tag.
///
/// Only decrypts with the exact key, nonce and tag produced at encryption time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBox {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

impl SealedBox {
    /// Decode the three base64 wire fields into a [`SealedBox`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedInput`] if any field is not valid base64
    /// or the nonce or tag has the wrong length.
    pub fn from_encoded(ciphertext: &str, nonce: &str, tag: &str) -> Result<Self, CipherError> {
        Ok(Self {
            ciphertext: encoding::decode("encryptedContent", ciphertext)?,
            nonce: fixed_len("nonce", encoding::decode("nonce", nonce)?)?,
            tag: fixed_len("tag", encoding::decode("tag", tag)?)?,
        })
    }
}

fn fixed_len<const N: usize>(field: &str, bytes: Vec<u8>) -> Result<[u8; N], CipherError> {
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        CipherError::MalformedInput(format!("{field} must be {N} bytes, got {}", bytes.len()))
    })
}

/// Encrypt `plaintext` under a freshly generated key.
///
/// The caller receives the only copy of the key.
///
/// # Errors
///
/// Returns [`CipherError::Internal`] on an AEAD failure (unreachable with a
/// valid key and nonce).
pub fn encrypt(plaintext: &[u8]) -> Result<(SymmetricKey, SealedBox), CipherError> {
    let key = SymmetricKey::generate();
    let cipher = build_cipher(&key)?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| CipherError::Internal("aead encryption failed".into()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok((
        key,
        SealedBox {
            ciphertext: buffer,
            nonce,
            tag: tag_bytes,
        },
    ))
}

/// Verify the tag and, only if it matches, decrypt the payload.
///
/// # Errors
///
/// Returns [`CipherError::AuthenticationFailure`] for a wrong key or any
/// tampering with ciphertext, nonce or tag. No plaintext is released in that case.
pub fn decrypt(sealed: &SealedBox, key: &SymmetricKey) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    let mut buffer = sealed.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&sealed.nonce),
            b"",
            &mut buffer,
            GenericArray::from_slice(&sealed.tag),
        )
        .map_err(|_| CipherError::AuthenticationFailure)?;
    Ok(buffer)
}

fn build_cipher(key: &SymmetricKey) -> Result<Aes128Eax, CipherError> {
    Aes128Eax::new_from_slice(key.as_bytes())
        .map_err(|_| CipherError::MalformedInput(format!("encryptionKey must be {KEY_LEN} bytes")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flip_each_bit(bytes: &[u8]) -> impl Iterator<Item = Vec<u8>> + '_ {
        (0..bytes.len() * 8).map(move |bit| {
            let mut copy = bytes.to_vec();
            copy[bit / 8] ^= 1 << (bit % 8);
            copy
        })
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let (key, sealed) = encrypt(b"hello world").unwrap();
        assert_ne!(sealed.ciphertext, b"hello world");
        assert_eq!(decrypt(&sealed, &key).unwrap(), b"hello world");
    }

    #[test]
    fn empty_and_multibyte_payloads_round_trip() {
        for payload in ["", "ünïcødé ✓ 鍵", "line one\nline two\n"] {
            let (key, sealed) = encrypt(payload.as_bytes()).unwrap();
            assert_eq!(decrypt(&sealed, &key).unwrap(), payload.as_bytes());
        }
    }

    #[test]
    fn successive_calls_use_fresh_key_and_nonce() {
        let (k1, s1) = encrypt(b"same").unwrap();
        let (k2, s2) = encrypt(b"same").unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
        assert_ne!(s1.nonce, s2.nonce);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let (_, sealed) = encrypt(b"secret").unwrap();
        let other = SymmetricKey::generate();
        assert!(matches!(
            decrypt(&sealed, &other),
            Err(CipherError::AuthenticationFailure)
        ));
    }

    #[test]
    fn any_flipped_ciphertext_bit_fails_authentication() {
        let (key, sealed) = encrypt(b"hello world").unwrap();
        for ciphertext in flip_each_bit(&sealed.ciphertext) {
            let tampered = SealedBox {
                ciphertext,
                ..sealed.clone()
            };
            assert!(matches!(
                decrypt(&tampered, &key),
                Err(CipherError::AuthenticationFailure)
            ));
        }
    }

    #[test]
    fn any_flipped_nonce_bit_fails_authentication() {
        let (key, sealed) = encrypt(b"hello world").unwrap();
        for nonce in flip_each_bit(&sealed.nonce) {
            let tampered = SealedBox {
                nonce: nonce.try_into().unwrap(),
                ..sealed.clone()
            };
            assert!(matches!(
                decrypt(&tampered, &key),
                Err(CipherError::AuthenticationFailure)
            ));
        }
    }

    #[test]
    fn any_flipped_tag_bit_fails_authentication() {
        let (key, sealed) = encrypt(b"hello world").unwrap();
        for tag in flip_each_bit(&sealed.tag) {
            let tampered = SealedBox {
                tag: tag.try_into().unwrap(),
                ..sealed.clone()
            };
            assert!(matches!(
                decrypt(&tampered, &key),
                Err(CipherError::AuthenticationFailure)
            ));
        }
    }

    #[test]
    fn encoded_fields_round_trip() {
        let (key, sealed) = encrypt(b"over the wire").unwrap();
        let parsed = SealedBox::from_encoded(
            &encoding::encode(&sealed.ciphertext),
            &encoding::encode(sealed.nonce),
            &encoding::encode(sealed.tag),
        )
        .unwrap();
        let key = SymmetricKey::from_encoded(&key.to_encoded()).unwrap();
        assert_eq!(decrypt(&parsed, &key).unwrap(), b"over the wire");
    }

    #[test]
    fn short_key_is_malformed() {
        let err = SymmetricKey::from_encoded(&encoding::encode([0u8; 15])).unwrap_err();
        assert!(matches!(err, CipherError::MalformedInput(_)));
    }

    #[test]
    fn aes_256_sized_key_is_malformed() {
        assert!(matches!(
            SymmetricKey::from_bytes(&[0u8; 32]),
            Err(CipherError::MalformedInput(_))
        ));
    }

    #[test]
    fn short_nonce_or_tag_is_malformed() {
        let ct = encoding::encode(b"x");
        let good = encoding::encode([0u8; 16]);
        let short = encoding::encode([0u8; 12]);
        assert!(matches!(
            SealedBox::from_encoded(&ct, &short, &good),
            Err(CipherError::MalformedInput(_))
        ));
        assert!(matches!(
            SealedBox::from_encoded(&ct, &good, &short),
            Err(CipherError::MalformedInput(_))
        ));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let good = encoding::encode([0u8; 16]);
        assert!(matches!(
            SealedBox::from_encoded("%%%", &good, &good),
            Err(CipherError::MalformedInput(_))
        ));
        assert!(matches!(
            SymmetricKey::from_encoded("not-base64!"),
            Err(CipherError::MalformedInput(_))
        ));
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = SymmetricKey::generate();
        assert_eq!(format!("{key:?}"), "SymmetricKey([REDACTED])");
    }
}
