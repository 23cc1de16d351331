//! Monitor Page
//!
//! Supervisor board: a services sidebar and one card per line of the
//! selected service. Every line is re-polled together on each tick.

use chrono::Utc;
use futures::future::join_all;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use crate::components::{LineCard, MonitorMirror};
use crate::context::{use_app_context, AppContext};
use crate::hooks::{is_live, use_liveness, use_poller};
use crate::mirror::MirrorController;
use crate::models::{EntityId, LineInfo};
use crate::notify::should_notify;
use crate::queue::{normalize_tickets, FetchOrigin, Liveness, QueueSnapshot};
use crate::store::{
    store_select_service, store_set_boards, store_set_services, use_monitor_store, LineBoard,
    MonitorState, MonitorStateStoreFields, MonitorStore,
};

#[derive(Clone, Copy)]
struct MonitorController {
    ctx: AppContext,
    store: MonitorStore,
    mirror: MirrorController,
    alive: StoredValue<Liveness>,
}

impl MonitorController {
    fn load_services(&self) {
        let this = *self;
        let api = self.ctx.api();
        let limit = self.ctx.config().services_page_size;
        spawn_local(async move {
            let result = api.list_services(limit).await;
            if !is_live(this.alive) {
                return;
            }
            match result {
                Ok(services) => {
                    log::debug!("[MONITOR] {} services", services.len());
                    if store_set_services(&this.store, services).is_some() {
                        this.fetch(FetchOrigin::Explicit);
                    }
                }
                Err(err) => {
                    log::error!("[MONITOR] loading services failed: {}", err);
                    this.ctx.notifier.error(err.user_message("Error loading services"));
                }
            }
        });
    }

    fn select_service(&self, id: EntityId) {
        if self.store.active_service().with_untracked(|active| active.as_ref() == Some(&id)) {
            return;
        }
        self.mirror.close();
        store_select_service(&self.store, id);
        self.fetch(FetchOrigin::Explicit);
    }

    /// Poll every line of the active service; a line that fails shows as empty
    fn fetch(&self, origin: FetchOrigin) {
        let Some(service_id) = self.store.active_service().get_untracked() else {
            return;
        };
        let this = *self;
        let api = self.ctx.api();
        if !origin.is_background() {
            *self.store.loading().write() = true;
        }

        spawn_local(async move {
            let boards = match api.list_lines(&service_id).await {
                Ok(lines) => {
                    let polls = lines.into_iter().map(|line| {
                        let api = api.clone();
                        async move {
                            match api.list_tickets(&line.id).await {
                                Ok(payload) => {
                                    let tickets = normalize_tickets(&payload, Utc::now());
                                    LineBoard::new(line, QueueSnapshot::from_tickets(&tickets))
                                }
                                Err(err) => {
                                    if !err.is_not_found() {
                                        log::warn!("[MONITOR] line {} failed: {}", line.id, err);
                                    }
                                    LineBoard::empty(line)
                                }
                            }
                        }
                    });
                    Some(join_all(polls).await)
                }
                Err(err) => {
                    log::warn!("[MONITOR] lines of service {} failed: {}", service_id, err);
                    if should_notify(origin, &err) {
                        this.ctx.notifier.error(err.user_message("Error loading lines"));
                    }
                    None
                }
            };

            if !is_live(this.alive) {
                return;
            }
            if let Some(boards) = boards {
                if !store_set_boards(&this.store, &service_id, boards) {
                    log::debug!("[MONITOR] dropped stale boards of service {}", service_id);
                }
            }
            if !origin.is_background() {
                *this.store.loading().write() = false;
            }
        });
    }

    fn call_next(&self, line_id: EntityId) {
        let this = *self;
        let api = self.ctx.api();
        spawn_local(async move {
            let result = api.call_next(&line_id).await;
            if !is_live(this.alive) {
                return;
            }
            match result {
                Ok(reply) => {
                    this.ctx.notifier.success(reply.message_or("Next ticket called"));
                    this.fetch(FetchOrigin::Explicit);
                }
                Err(err) => {
                    log::warn!("[MONITOR] call next on line {} failed: {}", line_id, err);
                    this.ctx.notifier.error(err.user_message("Error or out of tickets"));
                }
            }
        });
    }

    fn open_mirror(&self, line_id: EntityId) {
        let this = *self;
        let store = self.store;
        let board = Signal::derive(move || {
            store.boards().with(|boards| boards.iter().find(|b| b.info.id == line_id).cloned())
        });
        let next_id = board.with_untracked(|b| b.as_ref().map(|b| b.info.id.clone()));
        let Some(next_id) = next_id else { return };
        let size = self.ctx.config().monitor_mirror_size;

        self.mirror.open(size, move || {
            view! {
                <MonitorMirror board=board on_next=move |_| this.call_next(next_id.clone()) />
            }
        });
    }

    fn open_counter(&self, line: LineInfo) {
        self.mirror.close();
        self.ctx.open_counter(line);
    }
}

#[component]
fn ServiceSidebar(monitor: MonitorController) -> impl IntoView {
    let ctx = monitor.ctx;
    let store = monitor.store;

    view! {
        <aside class="sidebar">
            <div class="sidebar-brand">"QR Smart Queue"</div>
            <nav class="sidebar-services">
                {move || {
                    let active = store.active_service().get();
                    store
                        .services()
                        .get()
                        .into_iter()
                        .map(|service| {
                            let selected = active.as_ref() == Some(&service.id);
                            let id = service.id.clone();
                            view! {
                                <button
                                    class="sidebar-item"
                                    class:selected=selected
                                    on:click=move |_| monitor.select_service(id.clone())
                                >
                                    {service.name}
                                </button>
                            }
                        })
                        .collect_view()
                }}
            </nav>
            <div class="sidebar-footer">
                <div class="sidebar-user">
                    <strong>{move || ctx.session.with(|s| s.display_name().to_string())}</strong>
                    <span>{move || ctx.session.with(|s| s.role().to_string())}</span>
                </div>
                <button class="logout-btn" on:click=move |_| ctx.logout()>"Log out"</button>
            </div>
        </aside>
    }
}

#[component]
pub fn MonitorPage() -> impl IntoView {
    let ctx = use_app_context();
    provide_context(Store::new(MonitorState::default()));
    let store = use_monitor_store();

    let monitor = MonitorController {
        ctx,
        store,
        mirror: MirrorController::new(ctx.notifier),
        alive: use_liveness(),
    };

    monitor.load_services();
    use_poller(ctx.config().poll_interval_ms, move |origin| monitor.fetch(origin));

    let loading = move || store.loading().get();

    view! {
        <div class="monitor-page">
            <ServiceSidebar monitor=monitor />
            <main class="monitor-main">
                <header class="monitor-header">
                    <div>
                        <h1>{move || store.with(|s| s.service_name().to_string())}</h1>
                        <span class="monitor-subtitle">"Live queue monitor"</span>
                    </div>
                    <button
                        class="primary-btn"
                        disabled=loading
                        on:click=move |_| monitor.fetch(FetchOrigin::Explicit)
                    >
                        {move || if loading() { "Loading..." } else { "Re-new" }}
                    </button>
                </header>

                <div class="line-grid">
                    {move || {
                        let boards = store.boards().get();
                        if store.active_service().with(|a| a.is_none()) {
                            view! { <p class="empty-state">"Select a service to see its lines"</p> }.into_any()
                        } else if boards.is_empty() {
                            let message = if loading() { "Loading lines..." } else { "This service has no lines" };
                            view! { <p class="empty-state">{message}</p> }.into_any()
                        } else {
                            boards
                                .into_iter()
                                .map(|board| {
                                    let info = board.info.clone();
                                    let line_id = info.id.clone();
                                    view! {
                                        <LineCard
                                            board=board
                                            on_open=move |_| monitor.open_counter(info.clone())
                                            on_mirror=move |_| monitor.open_mirror(line_id.clone())
                                        />
                                    }
                                })
                                .collect_view()
                                .into_any()
                        }
                    }}
                </div>
            </main>
        </div>
    }
}
