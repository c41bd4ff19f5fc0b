//! Shared application state injected into every Axum handler.

use crate::crypto::asymmetric::DEFAULT_MODULUS_BITS;

/// Application state shared across all request handlers.
///
/// Holds configuration only. No key material, session or cache lives here:
/// every request generates and hands back its own keys.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Modulus size for RSA key pairs generated by `POST /encrypt`.
    pub rsa_key_bits: usize,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(rsa_key_bits: usize) -> Self {
        Self { rsa_key_bits }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with the default RSA modulus, suitable for tests.
    fn default() -> Self {
        Self::new(DEFAULT_MODULUS_BITS)
    }
}
