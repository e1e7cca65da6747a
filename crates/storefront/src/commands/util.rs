//! Shared helpers for command handlers.

use std::path::PathBuf;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use storefront_core::Category;
use storefront_core::form::ImageFile;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Prompt(e.to_string()))
}

/// Read each `--image` path into an upload candidate.
pub fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageFile>, CliError> {
    paths
        .iter()
        .map(|path| {
            let file = ImageFile::from_path(path).map_err(|e| CliError::Validation {
                field: "image".into(),
                reason: format!("{}: {e}", path.display()),
            })?;
            debug!(
                file = %file.file_name,
                media_type = %file.media_type,
                size = %ByteSize::b(file.size()),
                "image read"
            );
            Ok(file)
        })
        .collect()
}

/// Spinner on stderr while a request is running; hidden when quiet.
pub fn spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// `electronics, clothing, home, books`
pub fn category_names() -> String {
    Category::ALL
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
