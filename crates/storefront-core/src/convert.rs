// ── API-to-domain type conversions ──
//
// Bridges raw `storefront_api` wire types and the domain model. Incoming
// records are checked against the product invariants (known category,
// non-negative finite price); outgoing requests are flattened to the
// multipart / JSON shapes the server expects.

use std::str::FromStr;

use storefront_api::types::{ImagePart, ProductForm, ProductPatch, ProductResponse};

use crate::command::{CreateProductRequest, ImageUpload, UpdateProductRequest};
use crate::error::CoreError;
use crate::model::{Category, Price, Product, ProductId};

// ── Responses ──────────────────────────────────────────────────────

impl TryFrom<ProductResponse> for Product {
    type Error = CoreError;

    fn try_from(raw: ProductResponse) -> Result<Self, Self::Error> {
        let category =
            Category::from_str(&raw.category).map_err(|_| CoreError::InvalidRecord {
                id: raw.id.clone(),
                reason: format!("unknown category {:?}", raw.category),
            })?;
        let price = Price::new(raw.price).map_err(|e| CoreError::InvalidRecord {
            id: raw.id.clone(),
            reason: e.to_string(),
        })?;

        Ok(Product {
            id: ProductId::from(raw.id),
            name: raw.name,
            description: raw.description.filter(|d| !d.is_empty()),
            price,
            category,
            images: raw.images,
            created_at: raw.created_at,
        })
    }
}

// ── Requests ───────────────────────────────────────────────────────

impl From<ImageUpload> for ImagePart {
    fn from(image: ImageUpload) -> Self {
        ImagePart {
            file_name: image.file_name,
            media_type: image.media_type,
            data: image.data,
        }
    }
}

impl From<CreateProductRequest> for ProductForm {
    fn from(req: CreateProductRequest) -> Self {
        ProductForm {
            name: req.name,
            description: req.description,
            price: req.price.to_string(),
            category: req.category.to_string(),
            images: req.images.into_iter().map(ImagePart::from).collect(),
        }
    }
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(req: UpdateProductRequest) -> Self {
        ProductPatch {
            name: req.name,
            description: req.description,
            price: req.price.map(Price::value),
            category: req.category.map(|c| c.to_string()),
            images: req.images,
        }
    }
}
