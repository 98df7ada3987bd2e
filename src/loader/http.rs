use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{DatasetLoader, FetchError};
use crate::types::Dataset;

/// Fetches the dataset as JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: Client,
    url: String,
}

impl HttpLoader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl DatasetLoader for HttpLoader {
    async fn fetch(&self) -> Result<Dataset, FetchError> {
        debug!("GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(self.url.clone()));
        }
        if !status.is_success() {
            return Err(FetchError::Transport(format!("{} returned {}", self.url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(serde_json::from_slice(&body)?)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}
