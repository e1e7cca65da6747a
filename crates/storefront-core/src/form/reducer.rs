// ── Form reducer ──
//
// `(state, event) -> (state', effect)`. No I/O: side effects come back
// as an `Effect` for the caller to run.

use super::draft::{Field, FormDraft};
use super::image::ImageRef;
use super::validate::{FieldError, FieldErrors, RejectedImage, build_request};
use crate::command::CreateProductRequest;
use crate::error::CoreError;
use crate::route::Route;

/// General message when the server gave none.
pub const GENERIC_FAILURE: &str = "Failed to create product. Please try again.";
/// General message when no response was received.
pub const NETWORK_FAILURE: &str =
    "Could not reach the store. Check your connection and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Editing,
    /// A create request is in flight; submit is disabled.
    Submitting,
    /// The form is done (created or cancelled).
    Settled,
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub draft: FormDraft,
    pub errors: FieldErrors,
    /// Shown above the form.
    pub general_error: Option<String>,
    pub phase: FormPhase,
}

impl FormState {
    pub fn error(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn can_submit(&self) -> bool {
        self.phase == FormPhase::Editing
    }

    pub fn submit_label(&self) -> &'static str {
        if self.phase == FormPhase::Submitting {
            "Creating..."
        } else {
            "Create Product"
        }
    }
}

#[derive(Debug, Clone)]
pub enum FormEvent {
    NameChanged(String),
    DescriptionChanged(String),
    PriceChanged(String),
    CategoryChanged(String),
    /// One file-picker batch, already split by `validate_image`.
    ImagesSelected {
        accepted: Vec<ImageRef>,
        rejected: Vec<RejectedImage>,
    },
    ImageRemoved(usize),
    SubmitRequested,
    SubmitSucceeded,
    SubmitFailed(CoreError),
    Cancelled,
}

#[derive(Debug, Clone)]
pub enum Effect {
    Submit(CreateProductRequest),
    Navigate(Route),
}

pub fn reduce(mut state: FormState, event: FormEvent) -> (FormState, Option<Effect>) {
    let effect = match event {
        FormEvent::NameChanged(value) => {
            state.draft.name = value;
            state.errors.remove(&Field::Name);
            None
        }
        FormEvent::DescriptionChanged(value) => {
            state.draft.description = value;
            state.errors.remove(&Field::Description);
            None
        }
        FormEvent::PriceChanged(value) => {
            state.draft.price = value;
            state.errors.remove(&Field::Price);
            None
        }
        FormEvent::CategoryChanged(value) => {
            state.draft.category = value;
            state.errors.remove(&Field::Category);
            None
        }

        FormEvent::ImagesSelected { accepted, rejected } => {
            if let Some(last) = rejected.last() {
                state.errors.insert(Field::Images, last.error.clone());
            } else if !accepted.is_empty() {
                state.errors.remove(&Field::Images);
            }
            state.draft.images.extend(accepted);
            None
        }
        FormEvent::ImageRemoved(index) => {
            if index < state.draft.images.len() {
                state.draft.images.remove(index);
            }
            None
        }

        FormEvent::SubmitRequested => {
            if !state.can_submit() {
                return (state, None);
            }
            state.general_error = None;
            match build_request(&state.draft) {
                Ok(request) => {
                    state.errors.clear();
                    state.phase = FormPhase::Submitting;
                    Some(Effect::Submit(request))
                }
                Err(errors) => {
                    state.errors = errors;
                    None
                }
            }
        }
        FormEvent::SubmitSucceeded => {
            if state.phase != FormPhase::Submitting {
                return (state, None);
            }
            state = FormState {
                phase: FormPhase::Settled,
                ..FormState::default()
            };
            Some(Effect::Navigate(Route::Products))
        }
        FormEvent::SubmitFailed(err) => {
            if state.phase != FormPhase::Submitting {
                return (state, None);
            }
            state.phase = FormPhase::Editing;
            apply_server_error(&mut state, &err);
            None
        }

        FormEvent::Cancelled => {
            state = FormState {
                phase: FormPhase::Settled,
                ..FormState::default()
            };
            Some(Effect::Navigate(Route::Products))
        }
    };
    (state, effect)
}

/// Replace all errors with what the server reported.
fn apply_server_error(state: &mut FormState, err: &CoreError) {
    state.errors.clear();
    state.general_error = None;

    if let Some(fields) = err.field_errors() {
        let mut unmapped = Vec::new();
        for (key, messages) in fields {
            let message = messages.join(" ");
            match Field::from_server_key(key) {
                Some(field) => {
                    state
                        .errors
                        .entry(field)
                        .and_modify(|existing| {
                            *existing =
                                FieldError::Server(format!("{} {message}", existing.message()));
                        })
                        .or_insert(FieldError::Server(message));
                }
                None => unmapped.push(format!("{key}: {message}")),
            }
        }
        if !unmapped.is_empty() {
            state.general_error = Some(unmapped.join("; "));
        }
    } else if err.is_network() {
        state.general_error = Some(NETWORK_FAILURE.into());
    } else {
        state.general_error = Some(
            err.server_message()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(GENERIC_FAILURE)
                .to_owned(),
        );
    }
}
