//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Every variant is a terminal outcome for a single request. Variants map to
/// HTTP status codes returned to callers:
/// - [`ServiceError::Internal`] → 500
/// - everything else → 400
///
/// Messages must never carry key material or plaintext.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required request field is missing or the body is not valid JSON.
    #[error("validation failure: {0}")]
    Validation(String),

    /// Key or cipher material is not valid base64 or has the wrong length.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The symmetric authentication tag did not verify.
    #[error("authentication failure: {0}")]
    Authentication(String),

    /// Public-key decryption failed. The message never says which check failed.
    #[error("decryption failure: {0}")]
    Decryption(String),

    /// The plaintext exceeds the public-key encryption capacity.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The technique identifier is not one the service knows.
    #[error("unsupported technique: {0}")]
    UnsupportedTechnique(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Short machine-readable error kind, used as `code` in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_failure",
            ServiceError::MalformedInput(_) => "malformed_input",
            ServiceError::Authentication(_) => "authentication_failure",
            ServiceError::Decryption(_) => "decryption_failure",
            ServiceError::PayloadTooLarge(_) => "payload_too_large",
            ServiceError::UnsupportedTechnique(_) => "unsupported_technique",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Internal(_) => 500,
            _ => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::Validation("x".into()).http_status(), 400);
        assert_eq!(ServiceError::MalformedInput("x".into()).http_status(), 400);
        assert_eq!(ServiceError::Authentication("x".into()).http_status(), 400);
        assert_eq!(ServiceError::Decryption("x".into()).http_status(), 400);
        assert_eq!(ServiceError::PayloadTooLarge("x".into()).http_status(), 400);
        assert_eq!(
            ServiceError::UnsupportedTechnique("x".into()).http_status(),
            400
        );
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            ServiceError::Validation("x".into()),
            ServiceError::MalformedInput("x".into()),
            ServiceError::Authentication("x".into()),
            ServiceError::Decryption("x".into()),
            ServiceError::PayloadTooLarge("x".into()),
            ServiceError::UnsupportedTechnique("x".into()),
            ServiceError::Internal("x".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(ServiceError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::Validation("missing tag".into());
        assert!(e.to_string().contains("missing tag"));
    }
}
