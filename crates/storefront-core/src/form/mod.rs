// ── Create-product form ──
//
// Draft state, pure validation, an explicit reducer, and a controller
// that runs the reducer's effects against `ProductApi`.

pub mod controller;
pub mod draft;
pub mod image;
pub mod reducer;
pub mod validate;

pub use controller::{FormController, SubmitOutcome};
pub use draft::{Field, FormDraft};
pub use image::{ImageFile, ImageRef, MAX_IMAGE_BYTES, Preview, PreviewRegistry};
pub use reducer::{
    Effect, FormEvent, FormPhase, FormState, GENERIC_FAILURE, NETWORK_FAILURE, reduce,
};
pub use validate::{FieldError, FieldErrors, RejectedImage, validate, validate_image};
