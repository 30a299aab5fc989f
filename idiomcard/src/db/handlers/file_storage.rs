use crate::{
    db::{
        errors::{DbError, Result},
        models::file_storage::{FileStorageRequest, FileStorageResponse},
    },
    types::StorageKey,
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// Trait for uploaded image storage backends
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store content under the request's key, replacing anything already stored there
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse>;

    /// Retrieve content using storage key
    async fn retrieve(&self, key: &StorageKey) -> Result<Vec<u8>>;
}

/// Local filesystem storage backend - one flat directory, one file per key
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    /// Open the storage directory, creating it if needed
    pub async fn new(base_path: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }

    fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.base_path.join(key.as_str())
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    #[instrument(skip_all, fields(key = %request.key, size = request.content.len(), content_type = request.content_type.as_deref()), err)]
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse> {
        let full_path = self.path_for(&request.key);

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(&request.content).await?;
        file.sync_all().await?;

        Ok(FileStorageResponse {
            storage_key: request.key,
            size_bytes: request.content.len(),
        })
    }

    #[instrument(skip(self), fields(key = %key), err)]
    async fn retrieve(&self, key: &StorageKey) -> Result<Vec<u8>> {
        match fs::read(self.path_for(key)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DbError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
