//! Reactive Hooks
//!
//! Bind the poller, the elapsed-time tracker and view liveness to the
//! lifetime of the calling component. Everything is torn down in `on_cleanup`.

use chrono::Utc;
use leptos::prelude::*;

use crate::models::Ticket;
use crate::queue::{ElapsedTracker, FetchOrigin, Liveness, Poller};
use crate::timer::IntervalTicker;

/// Poll with `fetch` until the component unmounts
pub fn use_poller(interval_ms: u32, fetch: impl FnMut(FetchOrigin) + 'static) {
    let poller = StoredValue::new_local(Poller::start(&IntervalTicker, interval_ms, fetch));
    on_cleanup(move || {
        poller.try_update_value(|p| p.stop());
    });
}

/// Seconds the active ticket has been served, ticking locally
pub fn use_elapsed(active: Signal<Option<Ticket>>, tick_ms: u32) -> ReadSignal<u64> {
    let (seconds, set_seconds) = signal(0u64);
    let tracker = StoredValue::new_local(ElapsedTracker::new(IntervalTicker, tick_ms, move |s| {
        set_seconds.try_set(s);
    }));

    Effect::new(move |_| {
        let ticket = active.get();
        tracker.try_update_value(|t| t.observe(ticket.as_ref(), Utc::now()));
    });

    on_cleanup(move || {
        tracker.try_update_value(|t| t.stop());
    });
    seconds
}

/// Alive flag killed on unmount; check it before applying a late response
pub fn use_liveness() -> StoredValue<Liveness> {
    let alive = Liveness::new();
    let on_teardown = alive.clone();
    on_cleanup(move || on_teardown.kill());
    StoredValue::new(alive)
}

/// False once the owning component is gone
pub fn is_live(alive: StoredValue<Liveness>) -> bool {
    alive.try_with_value(|a| a.is_alive()).unwrap_or(false)
}
