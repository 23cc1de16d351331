//! Counter Page
//!
//! Operator screen for one line: the ticket being served with its elapsed
//! time, the call-next / finish / cancel controls and the waiting list.
//! Polls the line's tickets until the page unmounts.

use chrono::{DateTime, Local, Utc};
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;

use crate::api::ActionReply;
use crate::components::CounterMirror;
use crate::context::{use_app_context, AppContext};
use crate::error::ApiError;
use crate::hooks::{is_live, use_elapsed, use_liveness, use_poller};
use crate::mirror::MirrorController;
use crate::models::{EntityId, LineInfo};
use crate::notify::should_notify;
use crate::queue::{format_duration, normalize_tickets, FetchOrigin, Liveness, QueueSnapshot};
use crate::session::{with_store, Session};

const REFRESH_FAILED: &str = "Failed to refresh tickets";

/// Issue time of a ticket in the operator's timezone
fn issue_date(joined_at: DateTime<Utc>) -> String {
    joined_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Apply one ticket fetch to the counter's line.
///
/// A 404 means no tickets were issued on the line yet and reads as an empty
/// queue. The line adopts the name carried by the tickets, if any, and its
/// stats follow the new snapshot.
fn refresh_line(
    line: &mut LineInfo,
    fetched: Result<Value, ApiError>,
    now: DateTime<Utc>,
) -> Result<QueueSnapshot, ApiError> {
    let payload = match fetched {
        Ok(payload) => payload,
        Err(err) if err.is_not_found() => Value::Null,
        Err(err) => return Err(err),
    };
    let tickets = normalize_tickets(&payload, now);
    if let Some(name) = tickets.iter().find_map(|t| t.line_name.clone()) {
        line.name = name;
    }
    let snapshot = QueueSnapshot::from_tickets(&tickets);
    line.stats = snapshot.stats();
    Ok(snapshot)
}

#[derive(Clone, Copy)]
struct CounterController {
    ctx: AppContext,
    line_id: StoredValue<EntityId>,
    line: RwSignal<LineInfo>,
    snapshot: RwSignal<QueueSnapshot>,
    /// Explicit fetch or action in flight
    loading: RwSignal<bool>,
    /// Any fetch in flight
    refreshing: RwSignal<bool>,
    alive: StoredValue<Liveness>,
}

impl CounterController {
    fn new(ctx: AppContext, line_id: EntityId) -> Self {
        let line = with_store(|store| Session::line_info(store, &line_id));
        Self {
            ctx,
            line_id: StoredValue::new(line_id),
            line: RwSignal::new(line),
            snapshot: RwSignal::new(QueueSnapshot::default()),
            loading: RwSignal::new(false),
            refreshing: RwSignal::new(false),
            alive: use_liveness(),
        }
    }

    fn fetch(&self, origin: FetchOrigin) {
        let this = *self;
        if !origin.is_background() {
            self.loading.try_set(true);
        }
        self.refreshing.try_set(true);
        let api = self.ctx.api();
        let line_id = self.line_id.get_value();

        spawn_local(async move {
            let result = api.list_tickets(&line_id).await;
            if !is_live(this.alive) {
                return;
            }
            let mut line = this.line.get_untracked();
            match refresh_line(&mut line, result, Utc::now()) {
                Ok(snapshot) => {
                    this.line.try_set(line);
                    this.snapshot.try_set(snapshot);
                }
                Err(err) => {
                    log::warn!("[COUNTER] line {} refresh failed: {}", line_id, err);
                    if should_notify(origin, &err) {
                        this.ctx.notifier.error(err.user_message(REFRESH_FAILED));
                    }
                }
            }
            if !origin.is_background() {
                this.loading.try_set(false);
            }
            this.refreshing.try_set(false);
        });
    }

    fn call_next(&self) {
        let api = self.ctx.api();
        let line_id = self.line_id.get_value();
        self.run_action("Called next ticket", "Error or out of tickets", async move {
            api.call_next(&line_id).await
        });
    }

    fn finish(&self) {
        let Some(ticket) = self.snapshot.with_untracked(|s| s.active.clone()) else {
            return;
        };
        let api = self.ctx.api();
        self.run_action("Ticket finished", "Failed to finish ticket", async move {
            api.finish(&ticket.id).await
        });
    }

    fn cancel(&self) {
        let Some(ticket) = self.snapshot.with_untracked(|s| s.active.clone()) else {
            return;
        };
        let confirmed = web_sys::window()
            .and_then(|w| {
                w.confirm_with_message(&format!("Cancel ticket {}?", ticket.display_number))
                    .ok()
            })
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        let api = self.ctx.api();
        self.run_action("Ticket cancelled", "Failed to cancel ticket", async move {
            api.cancel(&ticket.id).await
        });
    }

    /// Run a ticket action, report its outcome, then re-fetch
    fn run_action<Fut>(&self, success: &'static str, failure: &'static str, action: Fut)
    where
        Fut: std::future::Future<Output = Result<ActionReply, ApiError>> + 'static,
    {
        let this = *self;
        self.loading.set(true);
        spawn_local(async move {
            let result = action.await;
            if !is_live(this.alive) {
                return;
            }
            this.loading.try_set(false);
            match result {
                Ok(reply) => {
                    this.ctx.notifier.success(reply.message_or(success));
                    this.fetch(FetchOrigin::Explicit);
                }
                Err(err) => {
                    log::warn!("[COUNTER] action failed: {}", err);
                    this.ctx.notifier.error(err.user_message(failure));
                }
            }
        });
    }
}

#[component]
pub fn CounterPage(line_id: EntityId) -> impl IntoView {
    let ctx = use_app_context();
    let config = ctx.config();
    let counter = CounterController::new(ctx, line_id);
    let mirror = MirrorController::new(ctx.notifier);

    use_poller(config.poll_interval_ms, move |origin| counter.fetch(origin));

    let snapshot: Signal<QueueSnapshot> = counter.snapshot.into();
    let active = Signal::derive(move || snapshot.with(|s| s.active.clone()));
    let elapsed = use_elapsed(active, config.tick_interval_ms);

    let busy = move || counter.loading.get() || active.with(|a| a.is_none());
    let mirror_size = config.counter_mirror_size;
    let toggle_mirror = move |_| {
        mirror.toggle(mirror_size, move || {
            view! {
                <CounterMirror
                    snapshot=snapshot
                    on_next=move |_| counter.call_next()
                    on_finish=move |_| counter.finish()
                    on_cancel=move |_| counter.cancel()
                />
            }
        })
    };
    let mirror_on = mirror.is_active();

    view! {
        <div class="counter-page">
            <header class="counter-header">
                <button class="icon-btn" title="Back to monitor" on:click=move |_| ctx.open_monitor()>
                    "‹"
                </button>
                <h2 class="counter-title">{move || counter.line.with(|l| l.name.clone())}</h2>
                <button
                    class="icon-btn"
                    class:spinning=move || counter.refreshing.get()
                    disabled=move || counter.refreshing.get()
                    title="Refresh"
                    on:click=move |_| counter.fetch(FetchOrigin::Explicit)
                >
                    "⟳"
                </button>
                <button class="mirror-toggle" class:active=move || mirror_on.get() on:click=toggle_mirror>
                    {move || if mirror_on.get() { "ON" } else { "Mini" }}
                </button>
            </header>

            <section class="counter-current">
                <div class="counter-label">"Now serving"</div>
                <div class="counter-number">
                    {move || active.with(|a| a.as_ref().map(|t| t.display_number.clone()).unwrap_or_else(|| "---".to_string()))}
                </div>
                <div class="counter-elapsed">{move || format_duration(elapsed.get())}</div>
                <div class="counter-holder">
                    {move || {
                        active.with(|a| match a {
                            Some(t) => t.holder_name.clone().unwrap_or_default(),
                            None => "NO ACTIVE TICKET".to_string(),
                        })
                    }}
                </div>
                <div class="counter-meta">
                    <span>{move || format!("Counter: {}", counter.line.with(|l| l.name.clone()))}</span>
                    <span>
                        {move || {
                            let issued = active.with(|a| a.as_ref().map(|t| issue_date(t.joined_at)));
                            format!("Issue date: {}", issued.unwrap_or_else(|| "N/A".to_string()))
                        }}
                    </span>
                </div>
            </section>

            <section class="counter-actions">
                <button class="action-btn action-next" disabled=move || counter.loading.get() on:click=move |_| counter.call_next()>
                    "Call next"
                </button>
                <button class="action-btn action-finish" disabled=busy on:click=move |_| counter.finish()>
                    "Finish"
                </button>
                <button class="action-btn action-cancel" disabled=busy on:click=move |_| counter.cancel()>
                    "Cancel"
                </button>
            </section>

            <section class="counter-waiting">
                <h3>{move || format!("Waiting ({})", snapshot.with(|s| s.waiting.len()))}</h3>
                {move || {
                    let waiting = snapshot.with(|s| s.waiting.clone());
                    if waiting.is_empty() {
                        view! { <p class="empty-state">"No visitors waiting"</p> }.into_any()
                    } else {
                        waiting
                            .into_iter()
                            .enumerate()
                            .map(|(index, ticket)| {
                                view! {
                                    <div class="waiting-row">
                                        <span class="waiting-index">{index + 1}</span>
                                        <span class="waiting-number">{ticket.display_number}</span>
                                        <span class="waiting-holder">{ticket.holder_name.unwrap_or_default()}</span>
                                        <span class="waiting-phone">{ticket.holder_phone.unwrap_or_default()}</span>
                                        <span class="waiting-time">{ticket.joined_at.with_timezone(&Local).format("%H:%M").to_string()}</span>
                                    </div>
                                }
                            })
                            .collect_view()
                            .into_any()
                    }
                }}
            </section>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_refresh_adopts_line_name_and_stats() {
        let mut line = LineInfo::placeholder(EntityId::Num(7));
        let payload = json!({"data": [
            {"id": 1, "status": "serving", "line_name": "Counter 3"},
            {"id": 2, "status": "waiting"},
            {"id": 3, "status": "waiting"}
        ]});

        let snapshot = refresh_line(&mut line, Ok(payload), now()).unwrap();
        assert_eq!(line.name, "Counter 3");
        assert_eq!(line.stats.serving, 1);
        assert_eq!(line.stats.waiting, 2);
        assert_eq!(line.stats.total, 3);
        assert_eq!(snapshot.active.map(|t| t.id), Some(EntityId::Num(1)));
    }

    #[test]
    fn test_refresh_keeps_cached_name_without_line_name() {
        let mut line = LineInfo::placeholder(EntityId::Num(7));
        refresh_line(&mut line, Ok(json!([{"id": 1}])), now()).unwrap();
        assert_eq!(line.name, "Line #7");
        assert_eq!(line.stats.waiting, 1);
    }

    #[test]
    fn test_not_found_reads_as_empty_queue() {
        let mut line = LineInfo::placeholder(EntityId::Num(7));
        line.stats.waiting = 4;

        let snapshot = refresh_line(&mut line, Err(ApiError::from_status(404, "")), now()).unwrap();
        assert_eq!(snapshot, QueueSnapshot::default());
        assert_eq!(line.stats.total, 0);
    }

    #[test]
    fn test_other_failures_leave_line_untouched() {
        let mut line = LineInfo::placeholder(EntityId::Num(7));
        line.stats.waiting = 4;

        let err = refresh_line(&mut line, Err(ApiError::from_status(500, "")), now()).unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(line.stats.waiting, 4);
        assert_eq!(line.name, "Line #7");
    }

    #[test]
    fn test_issue_date_uses_joined_at() {
        let joined = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let expected = joined.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
        assert_eq!(issue_date(joined), expected);
    }
}
