use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::Dataset;

/// Lifecycle of the dataset load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadState {
    /// Nothing requested yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch produced a dataset (possibly empty)
    Ready,
    /// The last fetch failed; the published dataset is empty
    Failed { reason: String },
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadState::Idle => write!(f, "IDLE"),
            LoadState::Loading => write!(f, "LOADING"),
            LoadState::Ready => write!(f, "READY"),
            LoadState::Failed { reason } => write!(f, "FAILED ({})", reason),
        }
    }
}

/// Everything the store publishes, as one value.
///
/// State and dataset travel together so no subscriber can see `Ready`
/// paired with the previous dataset.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub(crate) state: LoadState,
    pub(crate) dataset: Arc<Dataset>,
    pub(crate) generation: u64,
    pub(crate) revision: u64,
    pub(crate) loaded_at: Option<DateTime<Utc>>,
}

impl StoreSnapshot {
    pub(crate) fn initial() -> Self {
        Self {
            state: LoadState::Idle,
            dataset: Arc::new(Vec::new()),
            generation: 0,
            revision: 0,
            loaded_at: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Number of `load()` calls so far; the in-flight load owns this value
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of datasets published so far; changes only when the dataset is replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// When the current dataset was committed
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}

/// Transition log entry, for observers that need every step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    LoadStarted { generation: u64 },
    Loaded { generation: u64, countries: usize },
    LoadFailed { generation: u64, reason: String },
    /// A fetch finished after a newer load was requested; its result was dropped
    Superseded { generation: u64 },
}

impl StoreEvent {
    pub fn generation(&self) -> u64 {
        match self {
            StoreEvent::LoadStarted { generation }
            | StoreEvent::Loaded { generation, .. }
            | StoreEvent::LoadFailed { generation, .. }
            | StoreEvent::Superseded { generation } => *generation,
        }
    }

    /// Whether this event settles a load (Ready or Failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, StoreEvent::Loaded { .. } | StoreEvent::LoadFailed { .. })
    }
}
