//! Uploaded material files
//!
//! Files live on the local filesystem below the configured upload directory,
//! one file per material. Handlers only see the [`FileStore`] trait, so another
//! backend can replace the local one without touching them.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("File exceeds maximum size of {max_bytes} bytes")]
    TooLarge { max_bytes: usize },

    #[error("File not found")]
    NotFound,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores `content` under `key`, replacing an earlier file
    async fn save(&self, key: &str, content: &[u8]) -> Result<(), FileStoreError>;

    async fn load(&self, key: &str) -> Result<Vec<u8>, FileStoreError>;

    /// Removes the file; a missing file is not an error
    async fn delete(&self, key: &str) -> Result<(), FileStoreError>;
}

/// Storage key of the file attached to a material
pub fn material_file_key(material_id: i64) -> String {
    format!("materials/{}", material_id)
}

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    base_dir: PathBuf,
    max_file_size: usize,
}

impl LocalFileStore {
    pub fn new(base_dir: PathBuf, max_file_size: usize) -> Self {
        Self {
            base_dir,
            max_file_size,
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, FileStoreError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(FileStoreError::InvalidKey(key.to_string()));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
        {
            return Err(FileStoreError::InvalidKey(key.to_string()));
        }

        Ok(self.base_dir.join(key))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, key: &str, content: &[u8]) -> Result<(), FileStoreError> {
        let path = self.path_for(key)?;
        if content.len() > self.max_file_size {
            return Err(FileStoreError::TooLarge {
                max_bytes: self.max_file_size,
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;

        tracing::debug!(key, bytes = content.len(), "file stored");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, FileStoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FileStoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), FileStoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
