//! Axum request handlers for all service endpoints.
//!
//! Each handler validates field presence first, then runs the cipher work on
//! the blocking pool, then maps the outcome to JSON. Nothing reaches the
//! caller as an unstructured fault.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        AsymmetricEncryptResponse, DecryptRequest, DecryptResponse, EncryptRequest,
        EncryptResponse, ErrorResponse, HealthResponse, SymmetricEncryptResponse,
    },
    ServiceError,
};
use tracing::{error, info, warn};

use super::state::AppState;
use crate::crypto::{encoding, CipherError, Opening, Sealed, Technique};

/// `POST /encrypt` — encrypt `content` with fresh key material.
///
/// The response carries the ciphertext and every key needed to decrypt it;
/// the service keeps no copy.
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<EncryptRequest>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(req)) => encrypt_content(req, state.rsa_key_bits).await,
        Err(rejection) => Err(ServiceError::Validation(rejection.body_text())),
    };
    match result {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => reject("encrypt", e),
    }
}

/// `POST /decrypt` — decrypt a payload produced by `POST /encrypt`.
pub async fn decrypt(body: Result<Json<DecryptRequest>, JsonRejection>) -> Response {
    let result = match body {
        Ok(Json(req)) => decrypt_content(req).await,
        Err(rejection) => Err(ServiceError::Validation(rejection.body_text())),
    };
    match result {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => reject("decrypt", e),
    }
}

/// `GET /health` — liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Request adaptation
// ---------------------------------------------------------------------------

async fn encrypt_content(
    req: EncryptRequest,
    rsa_key_bits: usize,
) -> Result<EncryptResponse, ServiceError> {
    let [technique] = require([("technique", &req.technique)])?;
    let technique: Technique = technique.parse()?;
    // Empty content is valid; only an absent field is rejected.
    let content = req
        .content
        .ok_or_else(|| ServiceError::Validation("missing required field(s): content".into()))?;

    let sealed = run_blocking(move || technique.seal(&content, rsa_key_bits)).await?;
    info!(%technique, "content encrypted");
    Ok(sealed_to_response(sealed))
}

async fn decrypt_content(req: DecryptRequest) -> Result<DecryptResponse, ServiceError> {
    let technique = validate_decrypt(&req)?;
    let decrypted_content = run_blocking(move || opening_for(technique, &req)?.open()).await?;
    info!(%technique, "content decrypted");
    Ok(DecryptResponse { decrypted_content })
}

/// Check that every field the technique needs is present, before any crypto runs.
///
/// An empty AES ciphertext is the encryption of empty content, so for AES
/// only an absent `encryptedContent` counts as missing.
fn validate_decrypt(req: &DecryptRequest) -> Result<Technique, ServiceError> {
    let content_absent = req.encrypted_content.is_none();
    if is_blank(&req.technique) {
        let mut missing = Vec::new();
        if content_absent {
            missing.push("encryptedContent");
        }
        missing.push("technique");
        return Err(missing_fields(&missing));
    }
    let technique: Technique = field(&req.technique).parse()?;

    let mut missing = Vec::new();
    match technique {
        Technique::Aes => {
            if content_absent {
                missing.push("encryptedContent");
            }
            missing.extend(blank_fields(&[
                ("nonce", &req.nonce),
                ("tag", &req.tag),
                ("encryptionKey", &req.encryption_key),
            ]));
        }
        Technique::Rsa => missing.extend(blank_fields(&[
            ("encryptedContent", &req.encrypted_content),
            ("privateKey", &req.private_key),
        ])),
    }
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }
    Ok(technique)
}

fn opening_for(technique: Technique, req: &DecryptRequest) -> Result<Opening, CipherError> {
    let ciphertext = field(&req.encrypted_content);
    match technique {
        Technique::Aes => Opening::symmetric(
            ciphertext,
            field(&req.nonce),
            field(&req.tag),
            field(&req.encryption_key),
        ),
        Technique::Rsa => Opening::asymmetric(ciphertext, field(&req.private_key)),
    }
}

/// Return the named fields, or a validation error listing every one that is
/// absent or blank.
fn require<'a, const N: usize>(
    fields: [(&'static str, &'a Option<String>); N],
) -> Result<[&'a str; N], ServiceError> {
    let missing = blank_fields(&fields);
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }
    Ok(fields.map(|(_, value)| field(value)))
}

fn blank_fields(fields: &[(&'static str, &Option<String>)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| *name)
        .collect()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn missing_fields(names: &[&str]) -> ServiceError {
    ServiceError::Validation(format!("missing required field(s): {}", names.join(", ")))
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn sealed_to_response(sealed: Sealed) -> EncryptResponse {
    match sealed {
        Sealed::Symmetric { key, sealed } => EncryptResponse::Symmetric(SymmetricEncryptResponse {
            encrypted_content: encoding::encode(&sealed.ciphertext),
            nonce: encoding::encode(sealed.nonce),
            tag: encoding::encode(sealed.tag),
            key: key.to_encoded(),
        }),
        Sealed::Asymmetric {
            key_pair,
            ciphertext,
        } => EncryptResponse::Asymmetric(AsymmetricEncryptResponse {
            encrypted_content: encoding::encode(&ciphertext),
            private_key: key_pair.private_pem.to_string(),
            public_key: key_pair.public_pem,
        }),
    }
}

/// Run CPU-bound cipher work (RSA key generation in particular) off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, CipherError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::Internal(format!("cipher task failed: {e}")))?
        .map_err(ServiceError::from)
}

fn reject(operation: &'static str, err: ServiceError) -> Response {
    match err {
        ServiceError::Internal(_) => {
            error!(operation, code = err.code(), error = %err, "request failed")
        }
        _ => warn!(operation, code = err.code(), error = %err, "request rejected"),
    }
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err))).into_response()
}
