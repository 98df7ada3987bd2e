//! Replaying handles onto the store's published snapshots

use futures::Stream;
use std::sync::Arc;
use tokio::sync::watch;

use super::state::StoreSnapshot;

type Projection<T> = Arc<dyn Fn(&StoreSnapshot) -> T + Send + Sync>;
type Key = Arc<dyn Fn(&StoreSnapshot) -> u64 + Send + Sync>;

/// A derived view of the store.
///
/// Holds its own receiver on the snapshot channel: a new subscription sees
/// the latest snapshot immediately, and dropping it releases the receiver.
/// Values are recomputed from the snapshot on every read.
pub struct Subscription<T> {
    rx: watch::Receiver<StoreSnapshot>,
    project: Projection<T>,
    key: Option<Key>,
    seen_key: Option<u64>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        rx: watch::Receiver<StoreSnapshot>,
        project: impl Fn(&StoreSnapshot) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            rx,
            project: Arc::new(project),
            key: None,
            seen_key: None,
        }
    }

    /// Only wake [`Self::changed`] when `key` differs from the last value read
    pub(crate) fn distinct_by(
        mut self,
        key: impl Fn(&StoreSnapshot) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.seen_key = Some(key(&self.rx.borrow()));
        self.key = Some(Arc::new(key));
        self
    }

    /// Latest value, marking the current snapshot as seen
    pub fn current(&mut self) -> T {
        let snapshot = self.rx.borrow_and_update();
        if let Some(key) = &self.key {
            self.seen_key = Some(key(&snapshot));
        }
        (self.project)(&snapshot)
    }

    /// Latest value without touching the seen marker
    pub fn peek(&self) -> T {
        let snapshot = self.rx.borrow();
        (self.project)(&snapshot)
    }

    /// Wait for the next store update and return the recomputed value.
    ///
    /// Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            self.rx.changed().await.ok()?;
            let snapshot = self.rx.borrow_and_update();
            if let Some(key) = &self.key {
                let key = key(&snapshot);
                if self.seen_key == Some(key) {
                    continue;
                }
                self.seen_key = Some(key);
            }
            return Some((self.project)(&snapshot));
        }
    }

    /// Wait until the projected value satisfies `pred`, checking the current one first
    pub async fn wait_for(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let value = self.current();
        if pred(&value) {
            return Some(value);
        }
        loop {
            let value = self.changed().await?;
            if pred(&value) {
                return Some(value);
            }
        }
    }

    /// Current value first, then one value per store update
    pub fn into_stream(self) -> impl Stream<Item = T>
    where
        T: 'static,
    {
        futures::stream::unfold((self, true), |(mut sub, first)| async move {
            let value = if first { sub.current() } else { sub.changed().await? };
            Some((value, (sub, false)))
        })
    }
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            project: self.project.clone(),
            key: self.key.clone(),
            seen_key: self.seen_key,
        }
    }
}
