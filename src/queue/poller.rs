//! Poller
//!
//! Fetches once immediately, then on a fixed interval until stopped.
//! No backoff and no retry: a failed tick is simply followed by the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::timer::{Tick, Ticker};

/// Who triggered a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Mount, refresh button or after an action: show loading, surface errors
    Explicit,
    /// Timer-driven: silent, errors are only logged
    Background,
}

impl FetchOrigin {
    pub fn is_background(self) -> bool {
        self == FetchOrigin::Background
    }
}

pub struct Poller {
    tick: Option<Tick>,
}

impl Poller {
    /// Call `fetch(Explicit)` now, then `fetch(Background)` every `interval_ms`
    pub fn start<T, F>(ticker: &T, interval_ms: u32, mut fetch: F) -> Self
    where
        T: Ticker,
        F: FnMut(FetchOrigin) + 'static,
    {
        fetch(FetchOrigin::Explicit);
        let tick = ticker.every(interval_ms, Box::new(move || fetch(FetchOrigin::Background)));
        Self { tick: Some(tick) }
    }

    /// Cancel the repetition. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut tick) = self.tick.take() {
            tick.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Alive flag shared between a view and its in-flight requests.
///
/// Requests are never aborted; a response is applied only while the flag is up.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the owning view as torn down
    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}
