//! Elapsed Serving Time
//!
//! Counts whole seconds since the active ticket's service started. The count
//! is seeded from the server's `served_at` and then advanced by a local
//! one-second timer, independent of the poll cycle.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::models::{EntityId, Ticket};
use crate::timer::{Tick, Ticker};

/// `HH:MM:SS`; hours are not wrapped at 24
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Whole seconds between `served_at` and `now`, never negative
fn seed_seconds(served_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u64 {
    served_at
        .map(|start| (now - start).num_milliseconds().max(0) as u64 / 1000)
        .unwrap_or(0)
}

pub struct ElapsedTracker<T: Ticker> {
    ticker: T,
    tick_ms: u32,
    seconds: Rc<Cell<u64>>,
    on_change: Rc<dyn Fn(u64)>,
    /// Id of the ticket the count belongs to
    anchor: Option<EntityId>,
    tick: Option<Tick>,
}

impl<T: Ticker> ElapsedTracker<T> {
    /// `on_change` receives every new value, including reseeds and resets
    pub fn new(ticker: T, tick_ms: u32, on_change: impl Fn(u64) + 'static) -> Self {
        Self {
            ticker,
            tick_ms,
            seconds: Rc::new(Cell::new(0)),
            on_change: Rc::new(on_change),
            anchor: None,
            tick: None,
        }
    }

    /// Feed the current active ticket.
    ///
    /// Only a change of ticket id re-anchors the count; the same id with a
    /// different `served_at` keeps counting.
    pub fn observe(&mut self, active: Option<&Ticket>, now: DateTime<Utc>) {
        if active.map(|t| &t.id) == self.anchor.as_ref() {
            return;
        }
        self.stop();

        let Some(ticket) = active else {
            self.anchor = None;
            self.publish(0);
            return;
        };

        self.anchor = Some(ticket.id.clone());
        self.publish(seed_seconds(ticket.served_at, now));

        let seconds = self.seconds.clone();
        let on_change = self.on_change.clone();
        let tick = self.ticker.every(
            self.tick_ms,
            Box::new(move || {
                let next = seconds.get() + 1;
                seconds.set(next);
                on_change(next);
            }),
        );
        self.tick = Some(tick);
    }

    pub fn seconds(&self) -> u64 {
        self.seconds.get()
    }

    pub fn display(&self) -> String {
        format_duration(self.seconds())
    }

    pub fn is_ticking(&self) -> bool {
        self.tick.is_some()
    }

    /// Clear the local timer; the current count is kept
    pub fn stop(&mut self) {
        if let Some(mut tick) = self.tick.take() {
            tick.cancel();
        }
    }

    fn publish(&self, value: u64) {
        self.seconds.set(value);
        (self.on_change)(value);
    }
}

impl<T: Ticker> Drop for ElapsedTracker<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::manual::ManualTicker;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn make_ticket(id: i64, served_at: Option<DateTime<Utc>>) -> Ticket {
        Ticket {
            id: EntityId::Num(id),
            display_number: format!("ID:{}", id),
            holder_name: None,
            holder_phone: None,
            status: "serving".to_string(),
            served_at,
            joined_at: now(),
            line_name: None,
        }
    }

    fn tracker(ticker: &ManualTicker) -> ElapsedTracker<ManualTicker> {
        ElapsedTracker::new(ticker.clone(), 1000, |_| {})
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(125), "00:02:05");
        assert_eq!(format_duration(3661), "01:01:01");
        assert_eq!(format_duration(30 * 3600), "30:00:00");
    }

    #[test]
    fn test_seeded_from_served_at_then_ticks() {
        let ticker = ManualTicker::new();
        let mut elapsed = tracker(&ticker);
        let ticket = make_ticket(1, Some(now() - Duration::seconds(125)));

        elapsed.observe(Some(&ticket), now());
        assert_eq!(elapsed.display(), "00:02:05");

        ticker.advance(3000);
        elapsed.observe(Some(&ticket), now() + Duration::seconds(3));
        assert_eq!(elapsed.display(), "00:02:08");
    }

    #[test]
    fn test_partial_seconds_floored() {
        let ticker = ManualTicker::new();
        let mut elapsed = tracker(&ticker);
        let ticket = make_ticket(1, Some(now() - Duration::milliseconds(4999)));

        elapsed.observe(Some(&ticket), now());
        assert_eq!(elapsed.seconds(), 4);
    }

    #[test]
    fn test_future_served_at_clamped() {
        let ticker = ManualTicker::new();
        let mut elapsed = tracker(&ticker);
        let ticket = make_ticket(1, Some(now() + Duration::seconds(30)));

        elapsed.observe(Some(&ticket), now());
        assert_eq!(elapsed.seconds(), 0);
    }

    #[test]
    fn test_identity_change_reseeds() {
        let ticker = ManualTicker::new();
        let mut elapsed = tracker(&ticker);
        let a = make_ticket(1, Some(now() - Duration::seconds(600)));
        let b = make_ticket(2, Some(now() - Duration::seconds(10)));

        elapsed.observe(Some(&a), now());
        ticker.advance(5000);
        assert_eq!(elapsed.seconds(), 605);

        elapsed.observe(Some(&b), now() + Duration::seconds(5));
        assert_eq!(elapsed.seconds(), 15);

        let c = make_ticket(3, None);
        elapsed.observe(Some(&c), now());
        assert_eq!(elapsed.seconds(), 0);
        ticker.advance(2000);
        assert_eq!(elapsed.seconds(), 2);

        // Only one timer is ever live
        assert_eq!(ticker.active(), 1);
    }

    #[test]
    fn test_same_id_with_new_served_at_keeps_counting() {
        let ticker = ManualTicker::new();
        let mut elapsed = tracker(&ticker);

        elapsed.observe(Some(&make_ticket(1, Some(now() - Duration::seconds(60)))), now());
        ticker.advance(1000);
        elapsed.observe(Some(&make_ticket(1, Some(now()))), now());
        assert_eq!(elapsed.seconds(), 61);
    }

    #[test]
    fn test_no_active_ticket_resets_and_stops() {
        let ticker = ManualTicker::new();
        let mut elapsed = tracker(&ticker);

        elapsed.observe(Some(&make_ticket(1, Some(now() - Duration::seconds(42)))), now());
        elapsed.observe(None, now());
        assert_eq!(elapsed.seconds(), 0);
        assert!(!elapsed.is_ticking());

        ticker.advance(5000);
        assert_eq!(elapsed.seconds(), 0);
        assert_eq!(ticker.active(), 0);
    }

    #[test]
    fn test_on_change_receives_updates() {
        let ticker = ManualTicker::new();
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut elapsed = ElapsedTracker::new(ticker.clone(), 1000, move |s| sink.borrow_mut().push(s));

        elapsed.observe(Some(&make_ticket(1, Some(now() - Duration::seconds(3)))), now());
        ticker.advance(2000);
        elapsed.observe(None, now());

        assert_eq!(*seen.borrow(), vec![3, 4, 5, 0]);
    }

    #[test]
    fn test_drop_clears_timer() {
        let ticker = ManualTicker::new();
        {
            let mut elapsed = tracker(&ticker);
            elapsed.observe(Some(&make_ticket(1, None)), now());
            assert_eq!(ticker.active(), 1);
        }
        assert_eq!(ticker.active(), 0);
    }
}
