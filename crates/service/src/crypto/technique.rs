//! Technique selection: the closed set of cipher strategies the service offers.

use std::{fmt, str::FromStr};

use rsa::RsaPrivateKey;
use thiserror::Error;

use super::{
    asymmetric::{self, KeyPair},
    encoding,
    error::CipherError,
    symmetric::{self, SealedBox, SymmetricKey},
};
use common::ServiceError;

/// A cipher strategy, selected by its wire identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    /// AES-128-EAX with a per-request key. Wire identifier `"AES"`.
    Aes,
    /// RSA-OAEP with a per-request key pair. Wire identifier `"RSA"`.
    Rsa,
}

/// The identifier did not name a known technique.
#[derive(Debug, Error)]
#[error("{0:?} is not a supported technique (expected \"AES\" or \"RSA\")")]
pub struct UnsupportedTechnique(pub String);

impl From<UnsupportedTechnique> for ServiceError {
    fn from(err: UnsupportedTechnique) -> Self {
        ServiceError::UnsupportedTechnique(err.to_string())
    }
}

impl FromStr for Technique {
    type Err = UnsupportedTechnique;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AES" => Ok(Technique::Aes),
            "RSA" => Ok(Technique::Rsa),
            other => Err(UnsupportedTechnique(other.to_owned())),
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Technique::Aes => "AES",
            Technique::Rsa => "RSA",
        })
    }
}

/// Output of [`Technique::seal`]: ciphertext plus the key material the caller keeps.
#[derive(Debug)]
pub enum Sealed {
    Symmetric {
        key: SymmetricKey,
        sealed: SealedBox,
    },
    Asymmetric {
        key_pair: KeyPair,
        ciphertext: Vec<u8>,
    },
}

impl Technique {
    /// Encrypt `plaintext` with fresh key material for this technique.
    ///
    /// `rsa_bits` is only consulted by [`Technique::Rsa`].
    pub fn seal(self, plaintext: &str, rsa_bits: usize) -> Result<Sealed, CipherError> {
        match self {
            Technique::Aes => {
                let (key, sealed) = symmetric::encrypt(plaintext.as_bytes())?;
                Ok(Sealed::Symmetric { key, sealed })
            }
            Technique::Rsa => {
                let (key_pair, ciphertext) = asymmetric::encrypt(plaintext.as_bytes(), rsa_bits)?;
                Ok(Sealed::Asymmetric {
                    key_pair,
                    ciphertext,
                })
            }
        }
    }
}

/// Everything needed to decrypt one payload, already decoded from the wire.
pub enum Opening {
    Symmetric {
        sealed: SealedBox,
        key: SymmetricKey,
    },
    Asymmetric {
        ciphertext: Vec<u8>,
        private_key: RsaPrivateKey,
    },
}

impl Opening {
    /// Decode the AES wire fields.
    pub fn symmetric(
        ciphertext: &str,
        nonce: &str,
        tag: &str,
        key: &str,
    ) -> Result<Self, CipherError> {
        Ok(Opening::Symmetric {
            sealed: SealedBox::from_encoded(ciphertext, nonce, tag)?,
            key: SymmetricKey::from_encoded(key)?,
        })
    }

    /// Decode the RSA wire fields.
    pub fn asymmetric(ciphertext: &str, private_key: &str) -> Result<Self, CipherError> {
        Ok(Opening::Asymmetric {
            ciphertext: encoding::decode("encryptedContent", ciphertext)?,
            private_key: asymmetric::parse_private_key(private_key)?,
        })
    }

    /// Decrypt and return the payload as text.
    ///
    /// # Errors
    ///
    /// Propagates the technique's decryption error, or
    /// [`CipherError::MalformedInput`] if the plaintext is not UTF-8.
    pub fn open(&self) -> Result<String, CipherError> {
        let plaintext = match self {
            Opening::Symmetric { sealed, key } => symmetric::decrypt(sealed, key)?,
            Opening::Asymmetric {
                ciphertext,
                private_key,
            } => asymmetric::decrypt(ciphertext, private_key)?,
        };
        String::from_utf8(plaintext).map_err(|_| {
            CipherError::MalformedInput("decrypted content is not valid UTF-8 text".into())
        })
    }
}
