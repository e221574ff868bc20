use std::time::Duration;

use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// File extension for an accepted avatar content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Checks an upload before it leaves the process. Returns the file extension.
pub fn validate_upload(content_type: &str, len: usize) -> Result<&'static str, AppError> {
    if len == 0 {
        return Err(AppError::Validation("Avatar image is empty".into()));
    }
    if len > MAX_AVATAR_BYTES {
        return Err(AppError::Validation(
            "Avatar image must be 2 MiB or smaller".into(),
        ));
    }
    extension_for(content_type).ok_or_else(|| {
        AppError::Validation("Avatar must be a PNG, JPEG, GIF or WebP image".into())
    })
}

/// Uploads avatars to a bucket-addressed object store over HTTP.
#[derive(Clone)]
pub struct AvatarStorage {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl AvatarStorage {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.storage_url.trim_end_matches('/').to_string(),
            service_key: config.storage_service_key.clone(),
            bucket: config.avatar_bucket.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    pub fn object_path(user_id: Uuid, ext: &str) -> String {
        format!("{}/avatar.{}", user_id, ext)
    }

    fn upload_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, path)
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }

    /// Stores the image, replacing any previous avatar, and returns its public URL.
    pub async fn upload(
        &self,
        user_id: Uuid,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<String> {
        if !self.is_configured() {
            anyhow::bail!("Avatar storage is not configured");
        }

        let ext = extension_for(content_type)
            .ok_or_else(|| anyhow::anyhow!("Unsupported avatar type {}", content_type))?;
        let path = Self::object_path(user_id, ext);

        let response = self
            .client
            .put(self.upload_url(&path))
            .bearer_auth(&self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Avatar upload failed {}: {}", status, body);
        }

        tracing::info!(user_id = %user_id, path = %path, "Avatar uploaded");
        Ok(self.public_url(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_accepted_types() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("IMAGE/GIF"), Some("gif"));
        assert_eq!(extension_for("image/webp; charset=binary"), Some("webp"));
    }

    #[test]
    fn test_extension_for_rejects_other_types() {
        assert_eq!(extension_for("image/svg+xml"), None);
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for(""), None);
    }

    #[test]
    fn test_validate_upload_size_limits() {
        assert!(validate_upload("image/png", 0).is_err());
        assert!(validate_upload("image/png", MAX_AVATAR_BYTES + 1).is_err());
        assert_eq!(validate_upload("image/png", MAX_AVATAR_BYTES).unwrap(), "png");
    }

    #[test]
    fn test_validate_upload_rejects_unknown_type() {
        let err = validate_upload("text/plain", 10).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_urls_are_bucket_scoped() {
        let storage = AvatarStorage::from_config(&Config::for_tests()).unwrap();
        let id = Uuid::nil();
        let path = AvatarStorage::object_path(id, "png");

        assert_eq!(path, format!("{}/avatar.png", id));
        assert_eq!(
            storage.upload_url(&path),
            format!("http://storage.local/storage/v1/object/avatars/{}/avatar.png", id)
        );
        assert_eq!(
            storage.public_url(&path),
            format!(
                "http://storage.local/storage/v1/object/public/avatars/{}/avatar.png",
                id
            )
        );
    }

    #[test]
    fn test_unconfigured_storage() {
        let mut config = Config::for_tests();
        config.storage_url = String::new();
        let storage = AvatarStorage::from_config(&config).unwrap();
        assert!(!storage.is_configured());
    }
}
