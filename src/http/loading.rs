//! Global in-flight request bookkeeping

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task;

/// Shared counter behind the global loading indicator.
///
/// A counter rather than a flag: with N concurrent requests the indicator
/// must stay on from the first start to the last completion.
#[derive(Clone)]
pub struct LoadingTracker {
    inner: Arc<LoadingInner>,
}

struct LoadingInner {
    in_flight: Mutex<usize>,
    visible: watch::Sender<bool>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            inner: Arc::new(LoadingInner {
                in_flight: Mutex::new(0),
                visible,
            }),
        }
    }

    /// Register the start of a request. The increment is deferred to the next
    /// scheduler tick so starting a request never mutates observable state
    /// within the same synchronous phase that initiated it.
    pub(crate) async fn begin(&self) {
        task::yield_now().await;
        let mut count = self.inner.in_flight.lock().unwrap();
        *count += 1;
        if *count == 1 {
            self.inner.visible.send_replace(true);
        }
    }

    /// Register the completion of a request, success or failure. Symmetric
    /// with [`LoadingTracker::begin`]; the counter never goes negative.
    pub(crate) async fn end(&self) {
        task::yield_now().await;
        let mut count = self.inner.in_flight.lock().unwrap();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.inner.visible.send_replace(false);
        }
    }

    /// Number of requests currently in flight.
    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.lock().unwrap()
    }

    /// Whether the indicator should be visible right now.
    pub fn is_loading(&self) -> bool {
        self.in_flight() > 0
    }

    /// Observe visibility changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.visible.subscribe()
    }
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}
