//! Dataset sources
//!
//! The store only knows about the [`DatasetLoader`] trait. Where the data
//! comes from (a JSON file, an HTTP endpoint, a fixed value) is decided at
//! construction time.

mod file;
mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Dataset;

pub use file::FileLoader;
pub use http::HttpLoader;

/// Why a fetch did not produce a dataset
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("dataset not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid dataset: {0}")]
    Decode(String),
}

impl FetchError {
    /// Human-readable reason, as surfaced in `LoadState::Failed`
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Fetches the full dataset. Called once per store load.
#[async_trait]
pub trait DatasetLoader: Send + Sync {
    async fn fetch(&self) -> Result<Dataset, FetchError>;

    /// Where the data comes from, for logs
    fn describe(&self) -> String;
}

/// Loader returning a fixed result
#[derive(Debug, Clone)]
pub struct StaticLoader {
    result: Result<Dataset, FetchError>,
}

impl StaticLoader {
    pub fn new(dataset: Dataset) -> Self {
        Self { result: Ok(dataset) }
    }

    pub fn failing(error: FetchError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl DatasetLoader for StaticLoader {
    async fn fetch(&self) -> Result<Dataset, FetchError> {
        self.result.clone()
    }

    fn describe(&self) -> String {
        "static dataset".to_string()
    }
}
