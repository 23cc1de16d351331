//! Monitor Board Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::{EntityId, LineInfo, Service};
use crate::queue::QueueSnapshot;

/// One line card: reference data plus its latest snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct LineBoard {
    pub info: LineInfo,
    pub snapshot: QueueSnapshot,
}

impl LineBoard {
    pub fn new(mut info: LineInfo, snapshot: QueueSnapshot) -> Self {
        info.stats = snapshot.stats();
        Self { info, snapshot }
    }

    /// A line whose tickets could not be fetched
    pub fn empty(info: LineInfo) -> Self {
        Self::new(info, QueueSnapshot::default())
    }
}

/// Monitor screen state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct MonitorState {
    /// Services shown in the sidebar
    pub services: Vec<Service>,
    /// Service whose lines are on the board
    pub active_service: Option<EntityId>,
    /// Line cards of the active service
    pub boards: Vec<LineBoard>,
    /// Explicit fetch in flight
    pub loading: bool,
}

impl MonitorState {
    pub fn service_name(&self) -> &str {
        self.active_service
            .as_ref()
            .and_then(|id| self.services.iter().find(|s| &s.id == id))
            .map(|s| s.name.as_str())
            .unwrap_or("Service")
    }
}

/// Service to select after the list loads: the first one, if none is selected
fn auto_select(active: Option<&EntityId>, services: &[Service]) -> Option<EntityId> {
    match active {
        Some(_) => None,
        None => services.first().map(|s| s.id.clone()),
    }
}

/// Type alias for the store
pub type MonitorStore = Store<MonitorState>;

/// Get the monitor store from context
pub fn use_monitor_store() -> MonitorStore {
    expect_context::<MonitorStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Replace the cards, unless the user has since switched services.
/// Returns whether the cards were applied.
pub fn store_set_boards(store: &MonitorStore, service_id: &EntityId, boards: Vec<LineBoard>) -> bool {
    let current = store.active_service().with_untracked(|active| active.as_ref() == Some(service_id));
    if current {
        *store.boards().write() = boards;
    }
    current
}

/// Select a service, dropping the previous service's cards
pub fn store_select_service(store: &MonitorStore, id: EntityId) {
    *store.active_service().write() = Some(id);
    store.boards().write().clear();
}

/// Store the sidebar list; returns the service auto-selected, if any
pub fn store_set_services(store: &MonitorStore, services: Vec<Service>) -> Option<EntityId> {
    let selected = store
        .active_service()
        .with_untracked(|active| auto_select(active.as_ref(), &services));
    *store.services().write() = services;
    if let Some(id) = &selected {
        store_select_service(store, id.clone());
    }
    selected
}
