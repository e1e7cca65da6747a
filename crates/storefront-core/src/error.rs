// ── Core error types ──
//
// User-facing errors from storefront-core. Consumers never see reqwest
// errors or JSON parse failures directly; `From<storefront_api::Error>`
// sorts transport failures into network / validation / not-found / server.
//
// `CoreError` is `Clone`: one failed fetch is published to every
// subscriber of the cache entry.

use storefront_api::FieldErrors;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    /// No response was received (connection refused, DNS, TLS, timeout).
    #[error("Cannot reach the store API: {reason}")]
    Network { reason: String },

    // ── Server responses ─────────────────────────────────────────────
    /// 4xx response carrying a `{field: [messages]}` map.
    #[error("Validation failed: {}", .message.as_deref().unwrap_or("see field errors"))]
    Validation {
        status: u16,
        message: Option<String>,
        field_errors: FieldErrors,
    },

    #[error("{}", .message.as_deref().unwrap_or("Not found"))]
    NotFound { message: Option<String> },

    /// 5xx, or a 4xx without field errors.
    #[error("Server error (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    /// A 2xx body that could not be decoded.
    #[error("Unexpected response from the store API: {message}")]
    InvalidResponse { message: String },

    /// A decoded record that violates the product invariants.
    #[error("Invalid product record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` when the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// The server's own message, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Validation { message, .. } | Self::Server { message, .. } => message.as_deref(),
            Self::NotFound { message } => message.as_deref(),
            _ => None,
        }
    }

    /// Field-scoped messages from a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { field_errors, .. } if !field_errors.is_empty() => Some(field_errors),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<storefront_api::Error> for CoreError {
    fn from(err: storefront_api::Error) -> Self {
        match err {
            storefront_api::Error::Transport(ref e) => match e.status() {
                Some(status) => CoreError::Server {
                    status: status.as_u16(),
                    message: Some(e.to_string()),
                },
                None if e.is_timeout() => CoreError::Network {
                    reason: "request timed out".into(),
                },
                None => CoreError::Network {
                    reason: e.to_string(),
                },
            },
            storefront_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            storefront_api::Error::UnsupportedBaseUrl(url) => CoreError::Config {
                message: format!("Unsupported API URL: {url}"),
            },
            storefront_api::Error::Tls(msg) => CoreError::Network {
                reason: format!("TLS error: {msg}"),
            },
            storefront_api::Error::Api {
                status: 404,
                message,
                ..
            } => CoreError::NotFound { message },
            storefront_api::Error::Api {
                status,
                message,
                errors: Some(field_errors),
            } if (400..500).contains(&status) && !field_errors.is_empty() => {
                CoreError::Validation {
                    status,
                    message,
                    field_errors,
                }
            }
            storefront_api::Error::Api {
                status, message, ..
            } => CoreError::Server { status, message },
            storefront_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, message: Option<&str>, errors: Option<FieldErrors>) -> CoreError {
        storefront_api::Error::Api {
            status,
            message: message.map(String::from),
            errors,
        }
        .into()
    }

    #[test]
    fn field_map_on_4xx_is_a_validation_error() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), vec!["already taken".into()]);

        let err = api_error(400, None, Some(fields));

        assert!(matches!(err, CoreError::Validation { status: 400, .. }));
        assert_eq!(err.field_errors().map(|f| f["name"].clone()), Some(vec!["already taken".to_string()]));
    }

    #[test]
    fn unstructured_4xx_is_a_server_error() {
        let err = api_error(422, Some("Bad payload"), None);
        assert!(matches!(err, CoreError::Server { status: 422, .. }));
        assert_eq!(err.server_message(), Some("Bad payload"));
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn field_map_on_5xx_stays_a_server_error() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), vec!["boom".into()]);
        let err = api_error(500, None, Some(fields));
        assert!(matches!(err, CoreError::Server { status: 500, .. }));
    }

    #[test]
    fn not_found_without_body_carries_no_server_message() {
        let err = api_error(404, None, None);
        assert!(err.is_not_found());
        assert_eq!(err.server_message(), None);
        assert_eq!(err.status(), Some(404));

        let err = api_error(404, Some("No such product"), None);
        assert_eq!(err.server_message(), Some("No such product"));
        assert_eq!(err.to_string(), "No such product");
    }

    #[test]
    fn tls_failure_is_a_network_error() {
        let err: CoreError = storefront_api::Error::Tls("bad cert".into()).into();
        assert!(err.is_network());
    }
}
