// ── Form draft ──

use std::fmt;

use super::image::ImageRef;

/// In-memory state of the create-product form.
///
/// Every field holds raw user input; nothing is parsed until submit.
#[derive(Debug, Clone, Default)]
pub struct FormDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    /// Wire name of the chosen category, empty when none is chosen.
    pub category: String,
    /// Accepted images in selection order.
    pub images: Vec<ImageRef>,
}

/// A form field that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Description,
    Price,
    Category,
    Images,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Description,
        Field::Price,
        Field::Category,
        Field::Images,
    ];

    /// Map a field key from a server error body onto a form field.
    pub fn from_server_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "price" => Some(Self::Price),
            "category" => Some(Self::Category),
            "image" | "images" => Some(Self::Images),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Product Name",
            Self::Description => "Description",
            Self::Price => "Price",
            Self::Category => "Category",
            Self::Images => "Product Images",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Category => "category",
            Self::Images => "images",
        })
    }
}
