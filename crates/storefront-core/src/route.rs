// ── Navigation targets ──

use std::fmt;

use crate::model::ProductId;

/// Views the storefront can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The product listing.
    Products,
    ProductDetail(ProductId),
    CreateProduct,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Products => "/products".into(),
            Self::ProductDetail(id) => format!("/products/{id}"),
            Self::CreateProduct => "/create".into(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
