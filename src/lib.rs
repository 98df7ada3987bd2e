// Library crate - exports the dataset store, derived views and axis scaling

pub mod types;
pub mod aggregation;
pub mod scale;
pub mod loader;
pub mod store;
pub mod config;
pub mod api;

// Re-export commonly used types
pub use types::*;
pub use scale::AxisScale;
pub use store::{DatasetStore, LoadState, Subscription};
