// ── Image candidates and preview lifetimes ──
//
// An `ImageFile` is a file the user picked. Once it passes validation it
// becomes an `ImageRef`, which owns a preview URL from the
// `PreviewRegistry`. The preview is released when the last clone of the
// `ImageRef` is dropped.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tracing::trace;
use uuid::Uuid;

use crate::command::ImageUpload;

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// A file selected for upload, before validation.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub media_type: String,
    pub data: Bytes,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, media_type, Bytes::from(data)))
    }

    pub fn size(&self) -> u64 {
        u64::try_from(self.data.len()).unwrap_or(u64::MAX)
    }

    pub fn is_image(&self) -> bool {
        self.media_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

// ── Preview registry ────────────────────────────────────────────────

/// Issues and tracks `blob:` display URLs for selected images.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.live.lock().expect("preview registry lock poisoned")
    }

    pub fn acquire(&self) -> Preview {
        let url = format!("blob:storefront/{}", Uuid::new_v4());
        self.lock().insert(url.clone());
        trace!(%url, "preview acquired");
        Preview {
            url,
            registry: self.clone(),
        }
    }

    /// Number of previews not yet released.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.lock().contains(url)
    }
}

/// A preview URL, released on drop.
#[derive(Debug)]
pub struct Preview {
    url: String,
    registry: PreviewRegistry,
}

impl Preview {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.url);
        trace!(url = %self.url, "preview released");
    }
}

// ── Accepted image ──────────────────────────────────────────────────

/// An accepted image in the draft: the file plus its preview.
#[derive(Debug, Clone)]
pub struct ImageRef {
    file: ImageFile,
    preview: Arc<Preview>,
}

impl ImageRef {
    pub fn new(file: ImageFile, preview: Preview) -> Self {
        Self {
            file,
            preview: Arc::new(preview),
        }
    }

    pub fn display_url(&self) -> &str {
        self.preview.url()
    }

    pub fn file(&self) -> &ImageFile {
        &self.file
    }

    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    pub(crate) fn to_upload(&self) -> ImageUpload {
        ImageUpload {
            file_name: self.file.file_name.clone(),
            media_type: self.file.media_type.clone(),
            data: self.file.data.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn previews_are_released_with_the_last_clone() {
        let registry = PreviewRegistry::new();
        let image = ImageRef::new(
            ImageFile::new("a.png", "image/png", Bytes::from_static(b"a")),
            registry.acquire(),
        );
        let url = image.display_url().to_owned();
        assert!(url.starts_with("blob:"));

        let copy = image.clone();
        drop(image);
        assert!(registry.is_live(&url));

        drop(copy);
        assert!(!registry.is_live(&url));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn media_type_check_is_case_insensitive() {
        assert!(ImageFile::new("a", "IMAGE/PNG", Bytes::new()).is_image());
        assert!(!ImageFile::new("a", "application/pdf", Bytes::new()).is_image());
        assert!(!ImageFile::new("a", "img", Bytes::new()).is_image());
    }

    #[test]
    fn from_path_guesses_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"fake png")
            .unwrap();

        let file = ImageFile::from_path(&path).unwrap();

        assert_eq!(file.file_name, "widget.png");
        assert_eq!(file.media_type, "image/png");
        assert_eq!(file.size(), 8);
    }
}
