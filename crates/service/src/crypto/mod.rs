//! Encryption core: per-request AES-128-EAX and RSA-OAEP.
//!
//! This module is free of HTTP and configuration dependencies. Every operation
//! is a pure function of its inputs plus the OS CSPRNG; nothing is cached or
//! shared between calls.
//!
//! # Wire encoding
//!
//! Binary values cross the boundary as standard base64 (see [`encoding`]).
//! RSA keys cross it as PEM.

pub mod asymmetric;
pub mod encoding;
pub mod error;
pub mod symmetric;
pub mod technique;

pub use error::CipherError;
pub use technique::{Opening, Sealed, Technique};
