//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use storefront_config::ConfigError;
use storefront_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the products API")]
    #[diagnostic(
        code(storefront::connection_failed),
        help(
            "{reason}\n\
             Check that the server is running, or point at another one with --api-url."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(storefront::not_found),
        help("Run: storefront products list to see available products")
    )]
    NotFound { message: String },

    // ── Form / validation ────────────────────────────────────────────

    #[error("The product form has errors")]
    #[diagnostic(code(storefront::invalid_form), help("{details}"))]
    InvalidForm { details: String },

    #[error("The server rejected the request: {message}")]
    #[diagnostic(code(storefront::rejected), help("{details}"))]
    Rejected { message: String, details: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(storefront::validation))]
    Validation { field: String, reason: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(storefront::api_error))]
    Api { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(storefront::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: storefront config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(storefront::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(storefront::prompt),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    Prompt(String),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidForm { .. } | Self::Validation { .. } | Self::Prompt(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { reason } => CliError::ConnectionFailed { reason },

            CoreError::NotFound { message } => CliError::NotFound {
                message: message.unwrap_or_else(|| "Not found".into()),
            },

            CoreError::Validation {
                message,
                field_errors,
                ..
            } => CliError::Rejected {
                message: message.unwrap_or_else(|| "validation failed".into()),
                details: field_errors
                    .iter()
                    .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            err @ (CoreError::Server { .. }
            | CoreError::InvalidResponse { .. }
            | CoreError::InvalidRecord { .. }
            | CoreError::Internal(_)) => CliError::Api {
                message: err.to_string(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "api_url".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let network = CliError::from(CoreError::Network {
            reason: "connection refused".into(),
        });
        assert_eq!(network.exit_code(), exit_code::CONNECTION);

        let missing = CliError::from(CoreError::NotFound {
            message: Some("Product not found".into()),
        });
        assert_eq!(missing.to_string(), "Product not found");
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let server = CliError::from(CoreError::Server {
            status: 500,
            message: None,
        });
        assert_eq!(server.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn field_errors_become_help_lines() {
        let mut field_errors = std::collections::BTreeMap::new();
        field_errors.insert("name".into(), vec!["already taken".into()]);
        let err = CliError::from(CoreError::Validation {
            status: 400,
            message: None,
            field_errors,
        });

        match err {
            CliError::Rejected { details, .. } => assert_eq!(details, "name: already taken"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
