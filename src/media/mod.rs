//! Media hosting
//!
//! Avatar files travel through two steps: the multipart payload is staged
//! to a temporary file (`staging`), then a `MediaGateway` pushes it to the
//! media host and returns a durable URL. A `StagedFile` owns its temporary
//! path, so the bytes on disk disappear whichever way the upload ends.

pub mod cloudinary;
pub mod staging;

use async_trait::async_trait;
use std::path::Path;
use tempfile::TempPath;

pub use cloudinary::CloudinaryGateway;
pub use staging::stage_file;

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: Option<String>,
}

/// External media host
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Uploads the staged file and removes it locally, on success or failure.
    /// Upstream failures are logged and reported as `None`.
    async fn upload(&self, file: StagedFile) -> Option<UploadedMedia>;
}

/// A file waiting on local storage for its upload
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    file_name: String,
    content_type: Option<String>,
    size: usize,
}

impl StagedFile {
    pub fn new(
        path: TempPath,
        file_name: impl Into<String>,
        content_type: Option<String>,
        size: usize,
    ) -> Self {
        Self {
            path,
            file_name: file_name.into(),
            content_type,
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Deletes the local copy now. Dropping a `StagedFile` has the same
    /// effect, minus the error report.
    pub fn discard(self) {
        let display = self.path.display().to_string();
        if let Err(e) = self.path.close() {
            log::warn!("Failed to remove staged file {display}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn staged(bytes: &[u8]) -> StagedFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        StagedFile::new(file.into_temp_path(), "a.png", Some("image/png".into()), bytes.len())
    }

    #[test]
    fn test_discard_removes_file() {
        let file = staged(b"png");
        let path = file.path().to_path_buf();
        assert!(path.exists());

        file.discard();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let file = staged(b"png");
        let path = file.path().to_path_buf();

        drop(file);
        assert!(!path.exists());
    }
}
