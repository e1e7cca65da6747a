// ── Form validation ──
//
// Pure functions: `validate` runs on submit, `validate_image` on every
// file selection.

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;

use super::draft::{Field, FormDraft};
use super::image::{ImageFile, MAX_IMAGE_BYTES};
use crate::command::CreateProductRequest;
use crate::model::{Category, Price};

pub const NAME_REQUIRED: &str = "Product name is required";
pub const PRICE_REQUIRED: &str = "Price is required";
pub const PRICE_INVALID: &str = "Please enter a valid price";
pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const IMAGE_REQUIRED: &str = "Product image is required";
pub const IMAGE_NOT_AN_IMAGE: &str = "Please upload an image file";
pub const IMAGE_TOO_LARGE: &str = "Image must be less than 5MB";

/// A message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0}")]
    Required(String),
    #[error("{0}")]
    InvalidFormat(String),
    #[error("{0}")]
    UnsupportedType(String),
    #[error("{0}")]
    FileTooLarge(String),
    /// Reported by the server after submission.
    #[error("{0}")]
    Server(String),
}

impl FieldError {
    pub fn message(&self) -> &str {
        match self {
            Self::Required(m)
            | Self::InvalidFormat(m)
            | Self::UnsupportedType(m)
            | Self::FileTooLarge(m)
            | Self::Server(m) => m,
        }
    }
}

/// Errors by field; at most one per field.
pub type FieldErrors = BTreeMap<Field, FieldError>;

/// A file that failed [`validate_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedImage {
    pub file_name: String,
    pub error: FieldError,
}

/// Check one candidate file.
pub fn validate_image(file: &ImageFile) -> Result<(), FieldError> {
    if !file.is_image() {
        return Err(FieldError::UnsupportedType(IMAGE_NOT_AN_IMAGE.into()));
    }
    if file.size() > MAX_IMAGE_BYTES {
        return Err(FieldError::FileTooLarge(IMAGE_TOO_LARGE.into()));
    }
    Ok(())
}

/// Check the whole draft. Empty means submittable.
pub fn validate(draft: &FormDraft) -> FieldErrors {
    build_request(draft).err().unwrap_or_default()
}

/// Validate and, if clean, produce the create payload.
pub(crate) fn build_request(draft: &FormDraft) -> Result<CreateProductRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = draft.name.trim();
    if name.is_empty() {
        errors.insert(Field::Name, FieldError::Required(NAME_REQUIRED.into()));
    }

    let price = if draft.price.trim().is_empty() {
        errors.insert(Field::Price, FieldError::Required(PRICE_REQUIRED.into()));
        None
    } else {
        match Price::parse(&draft.price) {
            Ok(price) if price.is_positive() => Some(price),
            _ => {
                errors.insert(
                    Field::Price,
                    FieldError::InvalidFormat(PRICE_INVALID.into()),
                );
                None
            }
        }
    };

    let category = Category::from_str(draft.category.trim()).ok();
    if category.is_none() {
        errors.insert(
            Field::Category,
            FieldError::Required(CATEGORY_REQUIRED.into()),
        );
    }

    if draft.images.is_empty() {
        errors.insert(Field::Images, FieldError::Required(IMAGE_REQUIRED.into()));
    }

    match (price, category) {
        (Some(price), Some(category)) if errors.is_empty() => Ok(CreateProductRequest {
            name: name.to_owned(),
            description: draft.description.clone(),
            price,
            category,
            images: draft.images.iter().map(super::image::ImageRef::to_upload).collect(),
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::form::image::{ImageRef, PreviewRegistry};
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn png(size: usize) -> ImageFile {
        ImageFile::new("a.png", "image/png", Bytes::from(vec![0u8; size]))
    }

    fn valid_draft(registry: &PreviewRegistry) -> FormDraft {
        FormDraft {
            name: "Widget".into(),
            description: String::new(),
            price: "19.99".into(),
            category: "electronics".into(),
            images: vec![ImageRef::new(png(10), registry.acquire())],
        }
    }

    #[test]
    fn empty_draft_reports_every_required_field() {
        let errors = validate(&FormDraft::default());
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec![Field::Name, Field::Price, Field::Category, Field::Images]
        );
        assert_eq!(errors[&Field::Name].message(), NAME_REQUIRED);
        assert_eq!(errors[&Field::Images].message(), IMAGE_REQUIRED);
    }

    #[test]
    fn valid_draft_builds_a_request() {
        let registry = PreviewRegistry::new();
        let draft = valid_draft(&registry);
        let req = build_request(&draft).unwrap();
        assert_eq!(req.name, "Widget");
        assert_eq!(req.category, Category::Electronics);
        assert_eq!(req.images.len(), 1);
    }

    #[test]
    fn price_rules() {
        let registry = PreviewRegistry::new();
        let cases = [
            ("", Some(FieldError::Required(PRICE_REQUIRED.into()))),
            ("   ", Some(FieldError::Required(PRICE_REQUIRED.into()))),
            ("abc", Some(FieldError::InvalidFormat(PRICE_INVALID.into()))),
            ("-5", Some(FieldError::InvalidFormat(PRICE_INVALID.into()))),
            ("0", Some(FieldError::InvalidFormat(PRICE_INVALID.into()))),
            ("0.00", Some(FieldError::InvalidFormat(PRICE_INVALID.into()))),
            ("1e400", Some(FieldError::InvalidFormat(PRICE_INVALID.into()))),
            ("0.01", None),
            (" 19.99 ", None),
        ];
        for (raw, expected) in cases {
            let draft = FormDraft {
                price: raw.into(),
                ..valid_draft(&registry)
            };
            assert_eq!(validate(&draft).get(&Field::Price).cloned(), expected, "price {raw:?}");
        }
    }

    #[test]
    fn whitespace_name_is_required() {
        let registry = PreviewRegistry::new();
        let draft = FormDraft {
            name: "  \t".into(),
            ..valid_draft(&registry)
        };
        assert_eq!(
            validate(&draft).get(&Field::Name),
            Some(&FieldError::Required(NAME_REQUIRED.into()))
        );
    }

    #[test]
    fn unknown_category_is_required() {
        let registry = PreviewRegistry::new();
        let draft = FormDraft {
            category: "toys".into(),
            ..valid_draft(&registry)
        };
        assert!(validate(&draft).contains_key(&Field::Category));
    }

    #[test]
    fn image_checks() {
        assert_eq!(validate_image(&png(2 * 1024 * 1024)), Ok(()));
        assert_eq!(validate_image(&png(5 * 1024 * 1024)), Ok(()));
        assert_eq!(
            validate_image(&png(5 * 1024 * 1024 + 1)),
            Err(FieldError::FileTooLarge(IMAGE_TOO_LARGE.into()))
        );
        let pdf = ImageFile::new("a.pdf", "application/pdf", Bytes::from_static(b"%PDF"));
        assert_eq!(
            validate_image(&pdf),
            Err(FieldError::UnsupportedType(IMAGE_NOT_AN_IMAGE.into()))
        );
    }
}
