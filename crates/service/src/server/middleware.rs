//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, body size limits, CORS,
//! structured bodies for framework-generated errors and response compression.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::ErrorResponse;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest accepted request body. Payloads are short text; RSA cannot take
/// more than a few hundred bytes anyway.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the CORS layer. `None` allows any origin.
///
/// # Errors
///
/// Returns an error if an origin is not a valid header value.
pub fn cors_layer(origins: Option<&[String]>) -> Result<CorsLayer> {
    let allow_origin = match origins {
        None => AllowOrigin::from(Any),
        Some(list) => {
            let values = list
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {o}"))
                })
                .collect::<Result<Vec<_>>>()?;
            AllowOrigin::list(values)
        }
    };

    Ok(CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(allow_origin))
}

/// Give the empty 405 and 408 responses produced by routing and
/// [`tower_http::timeout::TimeoutLayer`] the same `{code, message}` body as
/// every other error. The `Allow` header of a 405 is kept.
pub async fn structured_error_body(response: Response) -> Response {
    let (code, message) = match response.status() {
        StatusCode::METHOD_NOT_ALLOWED => (
            "method_not_allowed",
            "the requested method is not supported for this resource",
        ),
        StatusCode::REQUEST_TIMEOUT => ("request_timeout", "the request did not complete in time"),
        _ => return response,
    };
    let mut structured =
        (response.status(), Json(ErrorResponse::new(code, message))).into_response();
    if let Some(allow) = response.headers().get(header::ALLOW) {
        structured.headers_mut().insert(header::ALLOW, allow.clone());
    }
    structured
}
