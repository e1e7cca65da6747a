// storefront-api: Async Rust client for the storefront products REST API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ProductsClient;
pub use error::{Error, FieldErrors};
pub use transport::{TlsMode, TransportConfig};
