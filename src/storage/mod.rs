//! Local staging area and object-storage client
//!
//! Uploaded originals are staged under a per-request unique directory so
//! concurrent uploads never write the same path. The converted archive
//! copy goes to S3-compatible object storage (Cloudflare R2) behind the
//! [`ObjectStore`] trait.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{AppError, CollaboratorError};
use crate::models::UploadedAsset;
use crate::utils;

/// Filesystem staging for uploaded originals.
#[derive(Clone)]
pub struct StagingArea {
    upload_dir: PathBuf,
}

impl StagingArea {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    pub async fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if !self.upload_dir.exists() {
            fs::create_dir_all(&self.upload_dir).await?;
        }
        Ok(())
    }

    /// Stage uploaded bytes under a unique per-request directory, keyed
    /// by the original filename so the archival key keeps its stem.
    pub async fn stage(
        &self,
        original_filename: &str,
        data: &[u8],
    ) -> Result<UploadedAsset, AppError> {
        self.ensure_dirs().await?;

        let request_dir = self.upload_dir.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&request_dir).await?;

        let path = request_dir.join(original_filename);
        fs::write(&path, data).await?;

        Ok(UploadedAsset {
            original_filename: original_filename.to_string(),
            file_stem: utils::file_stem(original_filename),
            path,
        })
    }

    pub async fn remove(&self, path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}

/// Object-storage collaborator the archival pipeline uploads to.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), CollaboratorError>;
}

/// Cloudflare R2 implementation over the S3 API.
pub struct R2ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl R2ObjectStore {
    pub async fn from_env() -> Result<Self, AppError> {
        let account_id = Config::env_secret("R2_ACCOUNT_ID")?;
        let bucket = Config::env_secret("R2_BUCKET_NAME")?;
        let access_key_id = Config::env_secret("R2_ACCESS_KEY_ID")?;
        let secret_access_key = Config::env_secret("R2_SECRET_ACCESS_KEY")?;

        let credentials = aws_credential_types::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "r2-env",
        );
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(format!("https://{account_id}.r2.cloudflarestorage.com"))
            .credentials_provider(credentials)
            .load()
            .await;

        Ok(Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            bucket,
        })
    }
}

#[async_trait]
impl ObjectStore for R2ObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), CollaboratorError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| CollaboratorError::request_failed("object-storage", e.to_string()))?;
        Ok(())
    }
}
