// ── Form controller ──
//
// Stateful shell around `reduce`: owns the current `FormState`, turns
// file selections into accepted/rejected batches, and runs the effects
// the reducer asks for.

use tracing::{debug, info};

use super::draft::FormDraft;
use super::image::{ImageFile, ImageRef, PreviewRegistry};
use super::reducer::{Effect, FormEvent, FormState, reduce};
use super::validate::{RejectedImage, validate_image};
use crate::api::ProductApi;
use crate::model::Product;
use crate::route::Route;

/// How a call to [`FormController::submit`] ended.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Nothing was sent: validation failed or a submit is already running.
    Blocked,
    /// The server rejected the request; see the state's errors.
    Failed,
    Created { product: Product, next: Route },
}

/// Drives the create-product form.
#[derive(Debug, Default)]
pub struct FormController {
    state: FormState,
    previews: PreviewRegistry,
}

impl FormController {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self {
            state: FormState::default(),
            previews,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn draft(&self) -> &FormDraft {
        &self.state.draft
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Apply one event, returning the effect the caller must run.
    pub fn dispatch(&mut self, event: FormEvent) -> Option<Effect> {
        let (state, effect) = reduce(std::mem::take(&mut self.state), event);
        self.state = state;
        effect
    }

    // ── Field edits ──────────────────────────────────────────────────

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.dispatch(FormEvent::NameChanged(value.into()));
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.dispatch(FormEvent::DescriptionChanged(value.into()));
    }

    pub fn set_price(&mut self, value: impl Into<String>) {
        self.dispatch(FormEvent::PriceChanged(value.into()));
    }

    pub fn set_category(&mut self, value: impl Into<String>) {
        self.dispatch(FormEvent::CategoryChanged(value.into()));
    }

    // ── Images ───────────────────────────────────────────────────────

    /// Validate one file-picker batch. Valid files are appended, each with
    /// a fresh preview; invalid ones are returned and reported on the
    /// images field.
    pub fn select_images(&mut self, files: Vec<ImageFile>) -> Vec<RejectedImage> {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for file in files {
            match validate_image(&file) {
                Ok(()) => accepted.push(ImageRef::new(file, self.previews.acquire())),
                Err(error) => {
                    debug!(file = %file.file_name, %error, "image rejected");
                    rejected.push(RejectedImage {
                        file_name: file.file_name,
                        error,
                    });
                }
            }
        }

        self.dispatch(FormEvent::ImagesSelected {
            accepted,
            rejected: rejected.clone(),
        });
        rejected
    }

    pub fn remove_image(&mut self, index: usize) {
        self.dispatch(FormEvent::ImageRemoved(index));
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Validate and, if clean, create the product through `api`.
    pub async fn submit(&mut self, api: &ProductApi) -> SubmitOutcome {
        let Some(Effect::Submit(request)) = self.dispatch(FormEvent::SubmitRequested) else {
            return SubmitOutcome::Blocked;
        };

        match api.create_product(request).await {
            Ok(product) => {
                info!(id = %product.id, "form submitted");
                let next = match self.dispatch(FormEvent::SubmitSucceeded) {
                    Some(Effect::Navigate(route)) => route,
                    _ => Route::Products,
                };
                SubmitOutcome::Created { product, next }
            }
            Err(err) => {
                debug!(error = %err, "form submission failed");
                self.dispatch(FormEvent::SubmitFailed(err));
                SubmitOutcome::Failed
            }
        }
    }

    /// Abandon the form and return to the listing.
    pub fn cancel(&mut self) -> Route {
        match self.dispatch(FormEvent::Cancelled) {
            Some(Effect::Navigate(route)) => route,
            _ => Route::Products,
        }
    }
}
