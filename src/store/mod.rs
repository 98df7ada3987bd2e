//! Reactive dataset store
//!
//! Holds the one dataset and its load state, and hands out replaying
//! subscriptions to views derived from it.

mod dataset_store;
mod state;
mod subscription;

pub use dataset_store::DatasetStore;
pub use state::{LoadState, StoreEvent, StoreSnapshot};
pub use subscription::Subscription;
