// Wire types for the products REST API.
//
// These mirror the JSON and multipart shapes exactly; domain invariants
// (known category, non-negative price) are enforced in storefront-core.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, FieldErrors};

// ── Responses ────────────────────────────────────────────────────────

/// A product as returned by `GET /`, `GET /{id}`, `POST /` and `PUT /{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Multipart forms are stringly typed, so some servers echo the price back
/// as `"19.99"`. Accept both.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Error body shape: `{message?, errors?: {field: [messages]}}`.
///
/// The field map has no published schema, so it is read best-effort: a
/// field may carry a single string or a list, anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub(crate) fn field_errors(&self) -> Option<FieldErrors> {
        let map = self.errors.as_ref()?.as_object()?;
        let fields: FieldErrors = map
            .iter()
            .filter_map(|(field, value)| {
                let messages: Vec<String> = match value {
                    serde_json::Value::String(m) => vec![m.clone()],
                    serde_json::Value::Array(items) => items
                        .iter()
                        .filter_map(|m| m.as_str().map(String::from))
                        .collect(),
                    _ => return None,
                };
                (!messages.is_empty()).then(|| (field.clone(), messages))
            })
            .collect();
        (!fields.is_empty()).then_some(fields)
    }
}

// ── Requests ─────────────────────────────────────────────────────────

/// One image file attached to a create request.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub file_name: String,
    pub media_type: String,
    pub data: Bytes,
}

/// Body of `POST /`, sent as `multipart/form-data`.
///
/// Text parts: `name`, `description`, `price`, `category`. One `images`
/// file part per attached image, in order.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub images: Vec<ImagePart>,
}

impl ProductForm {
    /// Field name used for every image file part.
    pub const IMAGE_FIELD: &'static str = "images";

    /// Build the multipart body.
    pub fn to_multipart(&self) -> Result<reqwest::multipart::Form, Error> {
        let mut form = reqwest::multipart::Form::new()
            .text("name", self.name.clone())
            .text("description", self.description.clone())
            .text("price", self.price.clone())
            .text("category", self.category.clone());

        for image in &self.images {
            let part = reqwest::multipart::Part::bytes(image.data.to_vec())
                .file_name(image.file_name.clone())
                .mime_str(&image.media_type)?;
            form = form.part(Self::IMAGE_FIELD, part);
        }

        Ok(form)
    }
}

/// Body of `PUT /{id}`. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
