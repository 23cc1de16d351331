//! Live Queue View-Model
//!
//! Polling, payload normalization, snapshot derivation and elapsed serving time.

pub mod elapsed;
pub mod normalize;
pub mod poller;
pub mod snapshot;

pub use elapsed::{format_duration, ElapsedTracker};
pub use normalize::normalize_tickets;
pub use poller::{FetchOrigin, Liveness, Poller};
pub use snapshot::QueueSnapshot;
