//! Configuration loading and validation for the service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::asymmetric::{DEFAULT_MODULUS_BITS, MAX_MODULUS_BITS, MIN_MODULUS_BITS};

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Interface the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Modulus size for generated RSA key pairs.
    #[serde(default = "default_rsa_key_bits")]
    pub rsa_key_bits: usize,

    /// Comma-separated list of allowed CORS origins, or `*` for any.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: String,

    /// OTLP endpoint for span export. Logs only when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}
fn default_listen_port() -> u16 {
    5000
}
fn default_rsa_key_bits() -> usize {
    DEFAULT_MODULUS_BITS
}
fn default_cors_allowed_origins() -> String {
    "*".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            listen_port: default_listen_port(),
            rsa_key_bits: default_rsa_key_bits(),
            cors_allowed_origins: default_cors_allowed_origins(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Socket address the server should bind to.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_address
            .trim()
            .parse()
            .with_context(|| format!("BIND_ADDRESS {:?} is not an IP address", self.bind_address))?;
        Ok(SocketAddr::new(ip, self.listen_port))
    }

    /// Allowed CORS origins, or `None` when any origin is allowed.
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        let raw = self.cors_allowed_origins.trim();
        if raw == "*" {
            return None;
        }
        Some(
            raw.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if !(MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&self.rsa_key_bits) {
            anyhow::bail!(
                "RSA_KEY_BITS must be between {MIN_MODULUS_BITS} and {MAX_MODULUS_BITS}, got {}",
                self.rsa_key_bits
            );
        }
        if self.rsa_key_bits % 8 != 0 {
            anyhow::bail!("RSA_KEY_BITS must be a multiple of 8");
        }
        if self.cors_origins().is_some_and(|o| o.is_empty()) {
            anyhow::bail!("CORS_ALLOWED_ORIGINS must be `*` or a non-empty list of origins");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty when set");
    }
    Ok(())
}
