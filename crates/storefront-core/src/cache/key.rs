// ── Cache keys, tags and values ──

use std::fmt;
use std::sync::Arc;

use crate::model::{Product, ProductId};

/// Identifies one cached query: operation plus argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    ListProducts,
    GetProduct(ProductId),
}

impl QueryKey {
    /// Tags the result of this query provides.
    pub fn provides(&self) -> Vec<Tag> {
        match self {
            Self::ListProducts => vec![Tag::AllProducts],
            Self::GetProduct(id) => vec![Tag::Product(id.clone())],
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListProducts => f.write_str("listProducts"),
            Self::GetProduct(id) => write!(f, "getProduct({id})"),
        }
    }
}

/// Invalidation tag.
///
/// `AllProducts` is the type-wide tag: invalidating it matches every
/// product-tagged entry. `Product(id)` matches only entries for that id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    AllProducts,
    Product(ProductId),
}

impl Tag {
    /// Whether invalidating `self` hits an entry that provides `provided`.
    pub fn matches(&self, provided: &Tag) -> bool {
        match self {
            Self::AllProducts => true,
            Self::Product(_) => self == provided,
        }
    }
}

/// A cached result, one variant per query shape.
#[derive(Debug, Clone)]
pub enum QueryValue {
    Products(Arc<Vec<Product>>),
    Product(Arc<Product>),
}

/// Typed view over a [`QueryValue`], used by `QueryHandle<T>`.
pub trait QueryData: Send + Sync + 'static {
    fn from_value(value: &QueryValue) -> Option<Arc<Self>>;
}

impl QueryData for Vec<Product> {
    fn from_value(value: &QueryValue) -> Option<Arc<Self>> {
        match value {
            QueryValue::Products(products) => Some(Arc::clone(products)),
            QueryValue::Product(_) => None,
        }
    }
}

impl QueryData for Product {
    fn from_value(value: &QueryValue) -> Option<Arc<Self>> {
        match value {
            QueryValue::Product(product) => Some(Arc::clone(product)),
            QueryValue::Products(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_wide_tag_matches_every_product_tag() {
        let id = ProductId::from("42");
        assert!(Tag::AllProducts.matches(&Tag::AllProducts));
        assert!(Tag::AllProducts.matches(&Tag::Product(id.clone())));
        assert!(Tag::Product(id.clone()).matches(&Tag::Product(id.clone())));
        assert!(!Tag::Product(id.clone()).matches(&Tag::Product(ProductId::from("7"))));
        assert!(!Tag::Product(id).matches(&Tag::AllProducts));
    }

    #[test]
    fn keys_display_as_operation_and_argument() {
        assert_eq!(QueryKey::ListProducts.to_string(), "listProducts");
        assert_eq!(
            QueryKey::GetProduct(ProductId::from("42")).to_string(),
            "getProduct(42)"
        );
    }
}
