//! Cloudinary upload client
//!
//! Signed uploads to `<api_base>/<cloud_name>/auto/upload`. The signature is
//! the SHA-256 hex digest of the sorted `key=value` parameters joined by `&`
//! with the API secret appended.

use crate::media::{MediaGateway, StagedFile, UploadedMedia};
use crate::types::MediaConfig;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
enum GatewayError {
    #[error("failed to read staged file: {0}")]
    Io(#[from] std::io::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upload rejected with status {status}: {body}")]
    Rejected {
        status: u16,
        body: String,
    },
    #[error("response carried no URL")]
    MissingUrl,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    public_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CloudinaryGateway {
    client: reqwest::Client,
    config: MediaConfig,
}

impl CloudinaryGateway {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/auto/upload", self.config.api_base, self.config.cloud_name)
    }

    /// Signature over the given parameters
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let joined = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");

        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn try_upload(&self, file: &StagedFile) -> Result<UploadedMedia, GatewayError> {
        let bytes = tokio::fs::read(file.path()).await?;
        let timestamp = Utc::now().timestamp().to_string();
        let signature =
            self.sign(&[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())]);

        let mut part = Part::bytes(bytes).file_name(file.file_name().to_string());
        if let Some(content_type) = file.content_type() {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self.client.post(self.upload_url()).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: UploadResponse = response.json().await?;
        let url = body
            .secure_url
            .or(body.url)
            .filter(|url| !url.is_empty())
            .ok_or(GatewayError::MissingUrl)?;

        Ok(UploadedMedia {
            url,
            public_id: body.public_id,
        })
    }
}

#[async_trait]
impl MediaGateway for CloudinaryGateway {
    async fn upload(&self, file: StagedFile) -> Option<UploadedMedia> {
        let outcome = self.try_upload(&file).await;
        file.discard();

        match outcome {
            Ok(media) => {
                log::info!("Uploaded media {}", media.url);
                Some(media)
            },
            Err(e) => {
                log::error!("Cloudinary upload error: {e}");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config(api_base: &str) -> MediaConfig {
        MediaConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder: "ECOM-images".to_string(),
            api_base: api_base.to_string(),
        }
    }

    #[test]
    fn test_upload_url() {
        let gateway = CloudinaryGateway::new(config("https://api.cloudinary.com/v1_1"));
        assert_eq!(gateway.upload_url(), "https://api.cloudinary.com/v1_1/demo/auto/upload");
    }

    #[test]
    fn test_signature_is_order_independent() {
        let gateway = CloudinaryGateway::new(config("http://localhost"));

        let a = gateway.sign(&[("timestamp", "1700000000"), ("folder", "ECOM-images")]);
        let b = gateway.sign(&[("folder", "ECOM-images"), ("timestamp", "1700000000")]);

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_matches_digest_of_sorted_params() {
        let gateway = CloudinaryGateway::new(config("http://localhost"));

        let mut hasher = Sha256::new();
        hasher.update(b"folder=ECOM-images&timestamp=1700000000secret");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(gateway.sign(&[("timestamp", "1700000000"), ("folder", "ECOM-images")]), expected);
    }

    #[tokio::test]
    async fn test_failed_upload_removes_staged_file() {
        // Nothing listens on the discard port, so the request fails fast.
        let gateway = CloudinaryGateway::new(config("http://127.0.0.1:9"));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"PNGDATA").unwrap();
        let path = file.path().to_path_buf();
        let staged = StagedFile::new(file.into_temp_path(), "me.png", Some("image/png".into()), 7);

        let result = gateway.upload(staged).await;

        assert!(result.is_none());
        assert!(!path.exists());
    }
}
