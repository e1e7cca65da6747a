// ── Domain model ──

pub mod id;
pub mod product;

pub use id::ProductId;
pub use product::{Category, Price, PriceError, Product};
