//! The dataset store: owns the dataset and its load lifecycle
//!
//! State machine:
//! 1. IDLE - nothing requested
//! 2. LOADING - a fetch stamped with the current generation is in flight
//! 3. READY - the fetch returned a dataset, published atomically with the state
//! 4. FAILED - the fetch failed, an empty dataset is published with the reason
//!
//! Any settled state goes back to LOADING on `load()`. A `load()` issued while
//! another is in flight supersedes it: the older task is aborted and, should
//! its result still arrive, the generation check drops it.

use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::state::{LoadState, StoreEvent, StoreSnapshot};
use super::subscription::Subscription;
use crate::aggregation;
use crate::loader::{DatasetLoader, FetchError};
use crate::scale::AxisScale;
use crate::types::{CountrySummary, Dataset, LineSeries, PieSlice};

struct StoreInner {
    loader: Arc<dyn DatasetLoader>,
    snapshot_tx: watch::Sender<StoreSnapshot>,
    event_tx: broadcast::Sender<StoreEvent>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to the dataset store. Cloning shares the same store.
#[derive(Clone)]
pub struct DatasetStore {
    inner: Arc<StoreInner>,
}

impl DatasetStore {
    /// Create an idle store around a loader
    pub fn new(loader: Arc<dyn DatasetLoader>) -> Self {
        let (snapshot_tx, _) = watch::channel(StoreSnapshot::initial());
        let (event_tx, _) = broadcast::channel(64);

        Self {
            inner: Arc::new(StoreInner {
                loader,
                snapshot_tx,
                event_tx,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Start a fetch. Completion is observed through [`Self::load_state`].
    ///
    /// The fetch runs on the current tokio runtime; without one the load
    /// settles as `Failed` right away.
    pub fn load(&self) {
        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut generation = 0;
        self.inner.snapshot_tx.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = LoadState::Loading;
            generation = snapshot.generation;
        });

        if let Some(previous) = in_flight.take() {
            if !previous.is_finished() {
                debug!("Load {} supersedes an in-flight load", generation);
                previous.abort();
            }
        }

        info!("Loading dataset from {} (load {})", self.inner.loader.describe(), generation);
        let _ = self.inner.event_tx.send(StoreEvent::LoadStarted { generation });

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Load {} has no async runtime to run on: {}", generation, e);
                let reason = format!("no async runtime: {}", e);
                self.inner.commit(generation, Err(FetchError::Transport(reason)));
                return;
            }
        };

        let inner = self.inner.clone();
        *in_flight = Some(handle.spawn(async move {
            let result = inner.loader.fetch().await;
            inner.commit(generation, result);
        }));
    }

    /// Whole snapshots: state, dataset and load metadata together
    pub fn snapshot(&self) -> Subscription<StoreSnapshot> {
        self.subscribe(|snapshot| snapshot.clone())
    }

    pub fn load_state(&self) -> Subscription<LoadState> {
        self.subscribe(|snapshot| snapshot.state.clone())
    }

    pub fn is_loading(&self) -> Subscription<bool> {
        self.subscribe(|snapshot| snapshot.state.is_loading())
    }

    /// Reason of the last failed load, `None` otherwise
    pub fn load_error(&self) -> Subscription<Option<String>> {
        self.subscribe(|snapshot| snapshot.state.error().map(str::to_string))
    }

    /// The dataset; empty before the first successful load and after a failure
    pub fn dataset(&self) -> Subscription<Arc<Dataset>> {
        self.subscribe_dataset(|snapshot| snapshot.dataset.clone())
    }

    pub fn country_medals(&self, country: &str) -> Subscription<i64> {
        let country = country.to_string();
        self.subscribe_dataset(move |snapshot| aggregation::country_medals(&snapshot.dataset, &country))
    }

    pub fn country_athletes(&self, country: &str) -> Subscription<i64> {
        let country = country.to_string();
        self.subscribe_dataset(move |snapshot| aggregation::country_athletes(&snapshot.dataset, &country))
    }

    /// `None` when the country does not exist
    pub fn country_line_series(&self, country: &str) -> Subscription<Option<LineSeries>> {
        let country = country.to_string();
        self.subscribe_dataset(move |snapshot| aggregation::line_series_for(&snapshot.dataset, &country))
    }

    pub fn country_summary(&self, country: &str) -> Subscription<Option<CountrySummary>> {
        let country = country.to_string();
        self.subscribe_dataset(move |snapshot| aggregation::country_summary(&snapshot.dataset, &country))
    }

    /// Y axis for the country's medal trend; `None` when the country is
    /// absent or has no participations
    pub fn country_axis(&self, country: &str) -> Subscription<Option<AxisScale>> {
        let country = country.to_string();
        self.subscribe_dataset(move |snapshot| {
            aggregation::line_series_for(&snapshot.dataset, &country)
                .and_then(|series| AxisScale::from_values(&series.values()))
        })
    }

    pub fn pie_series(&self) -> Subscription<Vec<PieSlice>> {
        self.subscribe_dataset(|snapshot| aggregation::pie_series_for(&snapshot.dataset))
    }

    pub fn distinct_event_count(&self) -> Subscription<usize> {
        self.subscribe_dataset(|snapshot| aggregation::distinct_years(&snapshot.dataset))
    }

    pub fn country_count(&self) -> Subscription<usize> {
        self.subscribe_dataset(|snapshot| aggregation::country_count(&snapshot.dataset))
    }

    /// Every transition from now on, in order
    pub fn events(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.snapshot_tx.receiver_count()
    }

    fn subscribe<T>(&self, project: impl Fn(&StoreSnapshot) -> T + Send + Sync + 'static) -> Subscription<T> {
        Subscription::new(self.inner.snapshot_tx.subscribe(), project)
    }

    /// Like [`Self::subscribe`], but only wakes when a new dataset is committed
    fn subscribe_dataset<T>(
        &self,
        project: impl Fn(&StoreSnapshot) -> T + Send + Sync + 'static,
    ) -> Subscription<T> {
        self.subscribe(project).distinct_by(|snapshot| snapshot.revision)
    }
}

impl StoreInner {
    /// Publish the outcome of load `generation` if it is still the latest
    fn commit(&self, generation: u64, result: Result<Dataset, FetchError>) {
        let mut event = None;

        self.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }

            match result {
                Ok(dataset) => {
                    let countries = dataset.len();
                    if countries == 0 {
                        warn!("Load {} returned an empty dataset", generation);
                    }
                    info!("Dataset ready: {} countries (load {})", countries, generation);
                    snapshot.state = LoadState::Ready;
                    snapshot.dataset = Arc::new(dataset);
                    event = Some(StoreEvent::Loaded { generation, countries });
                }
                Err(e) => {
                    warn!("Dataset load {} failed: {}", generation, e);
                    snapshot.state = LoadState::Failed { reason: e.reason() };
                    snapshot.dataset = Arc::new(Vec::new());
                    event = Some(StoreEvent::LoadFailed {
                        generation,
                        reason: e.reason(),
                    });
                }
            }
            snapshot.revision += 1;
            snapshot.loaded_at = Some(Utc::now());
            true
        });

        let event = event.unwrap_or_else(|| {
            debug!("Discarding result of superseded load {}", generation);
            StoreEvent::Superseded { generation }
        });
        let _ = self.event_tx.send(event);
    }
}
