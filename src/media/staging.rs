//! Multipart staging
//!
//! Streams one named file field of a `multipart/form-data` body into a
//! temporary file under the configured upload directory.

use crate::media::StagedFile;
use crate::types::UploadConfig;
use crate::user::error::{UserError, UserResult};
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::web;
use futures_util::TryStreamExt;
use tokio::io::AsyncWriteExt;

fn invalid_payload(error: MultipartError) -> UserError {
    UserError::validation(format!("Invalid multipart payload: {error}"))
}

fn write_failed(error: std::io::Error) -> UserError {
    UserError::internal(format!("Failed to write staging file: {error}"))
}

async fn drain(field: &mut Field) -> UserResult<()> {
    while field.try_next().await.map_err(invalid_payload)?.is_some() {}
    Ok(())
}

/// Stages the first non-empty file sent under `field_name`.
///
/// Other fields are read and ignored. Returns `Ok(None)` when no such file
/// was sent. A file larger than `config.max_bytes` is rejected and nothing
/// is left on disk.
pub async fn stage_file(
    mut payload: Multipart,
    field_name: &str,
    config: &UploadConfig,
) -> UserResult<Option<StagedFile>> {
    let mut staged: Option<StagedFile> = None;

    while let Some(mut field) = payload.try_next().await.map_err(invalid_payload)? {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let wanted = staged.is_none() && field.name() == Some(field_name) && file_name.is_some();
        if !wanted {
            drain(&mut field).await?;
            continue;
        }

        let content_type = field.content_type().map(|mime| mime.to_string());
        let dir = config.dir.clone();
        let temp = web::block(move || tempfile::Builder::new().prefix("avatar-").tempfile_in(dir))
            .await
            .map_err(|e| UserError::internal(format!("Staging task failed: {e}")))?
            .map_err(|e| UserError::internal(format!("Failed to create staging file: {e}")))?;

        // The path owns the file on disk; dropping it on any early return removes it.
        let (file, path) = temp.into_parts();
        let mut out = tokio::fs::File::from_std(file);

        let mut size = 0usize;
        while let Some(chunk) = field.try_next().await.map_err(invalid_payload)? {
            size += chunk.len();
            if size > config.max_bytes {
                return Err(UserError::validation(format!(
                    "Avatar file exceeds the {} byte limit",
                    config.max_bytes
                )));
            }
            out.write_all(&chunk).await.map_err(write_failed)?;
        }

        if size == 0 {
            continue;
        }

        out.flush().await.map_err(write_failed)?;
        drop(out);
        log::debug!("Staged upload {} ({size} bytes)", path.display());
        staged = Some(StagedFile::new(path, file_name.unwrap_or_default(), content_type, size));
    }

    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{self, HeaderMap, HeaderValue};
    use actix_web::web::Bytes;

    const BOUNDARY: &str = "XBOUNDARYX";

    fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Multipart {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap(),
        );
        let stream = futures_util::stream::iter(vec![Ok::<_, actix_web::error::PayloadError>(
            Bytes::from(body),
        )]);
        Multipart::new(&headers, stream)
    }

    fn config(dir: &tempfile::TempDir, max_bytes: usize) -> UploadConfig {
        UploadConfig {
            dir: dir.path().to_path_buf(),
            max_bytes,
        }
    }

    fn staged_entries(dir: &tempfile::TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[actix_web::test]
    async fn test_stages_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let payload = multipart(&[("note", None, b"hello"), ("avatar", Some("me.png"), b"PNGDATA")]);

        let staged = stage_file(payload, "avatar", &config(&dir, 1024)).await.unwrap().unwrap();

        assert_eq!(staged.file_name(), "me.png");
        assert_eq!(staged.content_type(), Some("image/png"));
        assert_eq!(staged.size(), 7);
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"PNGDATA");
        assert!(staged.path().starts_with(dir.path()));
    }

    #[actix_web::test]
    async fn test_missing_field_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let payload = multipart(&[("picture", Some("me.png"), b"PNGDATA")]);

        let staged = stage_file(payload, "avatar", &config(&dir, 1024)).await.unwrap();

        assert!(staged.is_none());
        assert_eq!(staged_entries(&dir), 0);
    }

    #[actix_web::test]
    async fn test_oversized_file_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let payload = multipart(&[("avatar", Some("big.png"), &[7u8; 64])]);

        let result = stage_file(payload, "avatar", &config(&dir, 16)).await;

        assert!(matches!(result, Err(UserError::Validation(_))));
        assert_eq!(staged_entries(&dir), 0);
    }
}
