//! Toast Notifications
//!
//! Transient user notifications and the rule for which failures reach the user.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use crate::error::ApiError;
use crate::queue::FetchOrigin;

/// Oldest toasts are dropped beyond this many
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

impl ToastLevel {
    pub fn class(self) -> &'static str {
        match self {
            ToastLevel::Info => "toast toast-info",
            ToastLevel::Success => "toast toast-success",
            ToastLevel::Error => "toast toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
}

/// Whether a failed fetch should be shown to the user.
///
/// Timer-driven failures are only logged, and a 404 (e.g. a line without
/// tickets yet) is never an error for display purposes.
pub fn should_notify(origin: FetchOrigin, err: &ApiError) -> bool {
    !origin.is_background() && !err.is_not_found()
}

fn push_bounded(list: &mut Vec<Toast>, toast: Toast) {
    list.push(toast);
    if list.len() > MAX_VISIBLE {
        let excess = list.len() - MAX_VISIBLE;
        list.drain(..excess);
    }
}

/// Toast queue shared through `AppContext`
#[derive(Clone, Copy)]
pub struct Notifier {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
    ttl_ms: u32,
}

impl Notifier {
    pub fn new(ttl_ms: u32) -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
            ttl_ms,
        }
    }

    pub fn toasts(&self) -> Signal<Vec<Toast>> {
        self.toasts.into()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.try_update(|list| list.retain(|t| t.id != id));
    }

    fn push(&self, level: ToastLevel, message: String) {
        let id = self.next_id.try_update_value(|n| {
            *n += 1;
            *n
        });
        let Some(id) = id else { return };

        self.toasts.try_update(|list| push_bounded(list, Toast { id, message, level }));

        let notifier = *self;
        Timeout::new(self.ttl_ms, move || notifier.dismiss(id)).forget();
    }
}
