//! Product data-access layer and create-product form logic for storefront.
//!
//! - **[`ProductApi`]**: facade over `storefront-api`. Queries
//!   ([`list_products`](ProductApi::list_products),
//!   [`get_product`](ProductApi::get_product)) return [`QueryHandle`]s backed
//!   by the [`QueryCache`]; mutations go through [`Command`] and invalidate
//!   the cache tags they touch once the server accepts them.
//!
//! - **[`QueryCache`]**: explicit, injectable cache keyed by
//!   operation + argument. Concurrent subscribers share one in-flight
//!   request; invalidated entries are refetched if subscribed and evicted
//!   otherwise; idle entries are collected after a grace period.
//!
//! - **[`form`]**: the create-product form as a pure reducer
//!   (`(state, event) -> (state, effect)`), pure validation, and image
//!   previews whose lifetime is tied to the draft.
//!
//! - **Domain model** ([`model`]): [`Product`], [`ProductId`], [`Category`],
//!   [`Price`].

pub mod api;
pub mod cache;
pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod form;
pub mod model;
pub mod route;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::ProductApi;
pub use cache::{QueryCache, QueryHandle, QueryKey, QueryState, QueryStatus, Tag};
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{DEFAULT_API_URL, StoreConfig, TlsVerification};
pub use error::CoreError;
pub use form::{FormController, SubmitOutcome};
pub use model::{Category, Price, PriceError, Product, ProductId};
pub use route::Route;
