// ── Runtime store configuration ──
//
// Describes *where* the products API lives and how to talk to it.
// Never touches disk: the CLI resolves profiles and hands a `StoreConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Base URL used when no profile or flag names one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/products";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// Configuration for one products API endpoint.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Products collection URL (e.g. `http://localhost:5000/api/products`).
    pub api_url: Url,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How long an unsubscribed cache entry survives before collection.
    pub cache_grace: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            cache_grace: Duration::from_secs(60),
        }
    }
}
