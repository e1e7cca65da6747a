// ── Typed request structs for Command payloads ──

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::model::{Category, Price};

// ── Create ─────────────────────────────────────────────────────────

/// An image file to upload with a new product.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub media_type: String,
    pub data: Bytes,
}

/// Payload of `createProduct`: sent as one multipart body.
#[derive(Debug, Clone)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: Category,
    /// One or more images, in selection order.
    pub images: Vec<ImageUpload>,
}

// ── Update ─────────────────────────────────────────────────────────

/// Partial update. `None` fields are left as they are on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
