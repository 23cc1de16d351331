//! Timers
//!
//! `Ticker` abstracts repeating browser timers so the poller and the
//! elapsed-time tracker can run against a virtual clock in tests.

use gloo_timers::callback::Interval;

/// Source of repeating callbacks
pub trait Ticker {
    /// Run `callback` every `period_ms` until the returned handle is cancelled or dropped
    fn every(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Tick;
}

/// Cancellation handle of a repeating callback
pub struct Tick {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Tick {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the callback; calling again is a no-op
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for Tick {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Browser `setInterval` via gloo
#[derive(Clone, Copy, Debug, Default)]
pub struct IntervalTicker;

impl Ticker for IntervalTicker {
    fn every(&self, period_ms: u32, mut callback: Box<dyn FnMut()>) -> Tick {
        let interval = Interval::new(period_ms, move || callback());
        Tick::new(move || drop(interval.cancel()))
    }
}

#[cfg(test)]
pub mod manual {
    //! Virtual clock for tests

    use super::{Tick, Ticker};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct Entry {
        period: u64,
        next_due: u64,
        callback: Option<Box<dyn FnMut()>>,
        cancelled: Rc<Cell<bool>>,
    }

    /// Ticker whose time only moves through `advance`
    #[derive(Clone, Default)]
    pub struct ManualTicker {
        now: Rc<Cell<u64>>,
        entries: Rc<RefCell<Vec<Entry>>>,
    }

    impl ManualTicker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn now(&self) -> u64 {
            self.now.get()
        }

        /// Number of callbacks still scheduled
        pub fn active(&self) -> usize {
            self.entries.borrow().iter().filter(|e| !e.cancelled.get()).count()
        }

        /// Move the clock forward, firing every due callback in time order
        pub fn advance(&self, ms: u64) {
            let target = self.now.get() + ms;
            loop {
                let due = {
                    let entries = self.entries.borrow();
                    entries
                        .iter()
                        .enumerate()
                        .filter(|(_, e)| !e.cancelled.get() && e.next_due <= target)
                        .min_by_key(|(_, e)| e.next_due)
                        .map(|(index, e)| (index, e.next_due))
                };
                let Some((index, at)) = due else { break };
                self.now.set(at);

                // Taken out while running so the callback may use the ticker
                let mut callback = {
                    let mut entries = self.entries.borrow_mut();
                    let entry = &mut entries[index];
                    entry.next_due += entry.period;
                    entry.callback.take()
                };
                if let Some(f) = callback.as_mut() {
                    f();
                }
                let mut entries = self.entries.borrow_mut();
                if entries[index].callback.is_none() {
                    entries[index].callback = callback;
                }
            }
            self.now.set(target);
        }
    }

    impl Ticker for ManualTicker {
        fn every(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Tick {
            let period = u64::from(period_ms.max(1));
            let cancelled = Rc::new(Cell::new(false));
            self.entries.borrow_mut().push(Entry {
                period,
                next_due: self.now.get() + period,
                callback: Some(callback),
                cancelled: cancelled.clone(),
            });
            Tick::new(move || cancelled.set(true))
        }
    }
}
