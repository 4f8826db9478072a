use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{Book, StorageError, Store};

/// Catalog document stored as pretty-printed JSON on the local filesystem.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// document, so a reader sees either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "books.json".into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn read_all(&self) -> Result<Vec<Book>, StorageError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        serde_json::from_slice(&raw).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, books: &[Book]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(books).map_err(StorageError::Serialize)?;
        let temp_path = self.temp_path();

        if let Err(e) = tokio::fs::write(&temp_path, &data).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::io(&temp_path, e));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::io(&self.path, e));
        }

        tracing::debug!(path = %self.path.display(), count = books.len(), "book document written");
        Ok(())
    }

    async fn ensure_exists(&self) -> Result<bool, StorageError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        if exists {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        self.write_all(&[]).await?;
        tracing::info!(path = %self.path.display(), "created empty book document");
        Ok(true)
    }
}
