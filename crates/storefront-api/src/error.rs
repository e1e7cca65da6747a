use std::collections::BTreeMap;

use thiserror::Error;

/// Field-scoped validation messages as sent by the API: `{field: [messages]}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Top-level error type for the `storefront-api` crate.
///
/// Covers every failure mode of the products REST surface: transport,
/// URL handling, non-success HTTP statuses, and response decoding.
/// `storefront-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Unsupported base URL: {0}")]
    UnsupportedBaseUrl(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success response. `message` and `errors` come from the
    /// `{message, errors}` body when the server sent one.
    #[error(
        "API error (HTTP {status}): {}",
        .message.as_deref().unwrap_or("no message")
    )]
    Api {
        status: u16,
        message: Option<String>,
        errors: Option<FieldErrors>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if no response was received at all.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Field-scoped messages from a validation failure, if any were sent.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Api {
                errors: Some(errors),
                ..
            } if !errors.is_empty() => Some(errors),
            _ => None,
        }
    }
}
