//! Configuration for the server and CLI

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::loader::{DatasetLoader, FileLoader, HttpLoader};

/// Default location of the dataset, relative to the working directory
pub const DEFAULT_DATA_PATH: &str = "assets/mock/olympic.json";

/// Where the dataset is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Local JSON file
    File(PathBuf),
    /// JSON served over HTTP(S)
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` select a URL, anything else is a file path
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    pub fn loader(&self) -> Arc<dyn DatasetLoader> {
        match self {
            Self::File(path) => Arc::new(FileLoader::new(path.clone())),
            Self::Url(url) => Arc::new(HttpLoader::new(url.clone())),
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_DATA_PATH))
    }
}

impl std::str::FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: SocketAddr,

    /// Dataset location
    pub data_source: DataSource,

    /// Directory of static frontend files served at `/`
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_source: DataSource::default(),
            static_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_source() {
        assert_eq!(
            DataSource::parse("https://example.org/olympic.json"),
            DataSource::Url("https://example.org/olympic.json".to_string())
        );
        assert_eq!(
            DataSource::parse(" data/olympic.json "),
            DataSource::File(PathBuf::from("data/olympic.json"))
        );
        assert_eq!(
            "http://localhost:8080/a.json".parse::<DataSource>().unwrap(),
            DataSource::Url("http://localhost:8080/a.json".to_string())
        );
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.data_source.to_string(), DEFAULT_DATA_PATH);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_loader_description() {
        let source = DataSource::File(PathBuf::from("olympic.json"));
        assert_eq!(source.loader().describe(), "file olympic.json");

        let source = DataSource::Url("http://host/olympic.json".to_string());
        assert_eq!(source.loader().describe(), "url http://host/olympic.json");
    }
}
