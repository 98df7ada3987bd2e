use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use super::{DatasetLoader, FetchError};
use crate::types::Dataset;

/// Reads the dataset from a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetLoader for FileLoader {
    async fn fetch(&self) -> Result<Dataset, FetchError> {
        debug!("Reading dataset from {}", self.path.display());

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FetchError::NotFound(self.path.display().to_string()),
            _ => FetchError::Transport(format!("{}: {}", self.path.display(), e)),
        })?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
