//! UI Components
//!
//! Leptos components for the monitor and counter screens.

mod counter_page;
mod line_card;
mod mirror_views;
mod monitor_page;
mod signed_out;
mod toast_stack;

pub use counter_page::CounterPage;
pub use line_card::LineCard;
pub use mirror_views::{CounterMirror, MonitorMirror};
pub use monitor_page::MonitorPage;
pub use signed_out::SignedOut;
pub use toast_stack::ToastStack;
