//! Mini Window Views
//!
//! Compact layouts mounted inside picture-in-picture windows. They read the
//! same signals and call the same actions as the page that opened them.

use leptos::prelude::*;

use crate::queue::QueueSnapshot;
use crate::store::LineBoard;

/// Counter controls: serving ticket plus Next / Finish / Cancel
#[component]
pub fn CounterMirror(
    snapshot: Signal<QueueSnapshot>,
    #[prop(into)] on_next: Callback<()>,
    #[prop(into)] on_finish: Callback<()>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let no_active = move || snapshot.with(|s| s.active.is_none());

    view! {
        <div class="pip-window">
            <div class="pip-header">
                <span>"Waiting: "<strong>{move || snapshot.with(|s| s.waiting.len())}</strong></span>
                <span>{move || format!("Total: {}", snapshot.with(|s| s.received))}</span>
            </div>
            <div class="pip-body">
                {move || match snapshot.with(|s| s.active.clone()) {
                    Some(ticket) => view! {
                        <div class="pip-serving">
                            <div class="pip-label">"Serving"</div>
                            <h1 class="pip-number">{ticket.display_number}</h1>
                            <p class="pip-holder">{ticket.holder_name.unwrap_or_default()}</p>
                        </div>
                    }
                    .into_any(),
                    None => view! { <div class="pip-idle">"READY"</div> }.into_any(),
                }}
            </div>
            <div class="pip-actions">
                <button class="pip-btn pip-next" on:click=move |_| on_next.run(())>"NEXT"</button>
                <button class="pip-btn pip-finish" disabled=no_active on:click=move |_| on_finish.run(())>
                    "Finish"
                </button>
                <button class="pip-btn pip-cancel" disabled=no_active on:click=move |_| on_cancel.run(())>
                    "Cancel"
                </button>
            </div>
        </div>
    }
}

/// Monitor control for one line: serving ticket plus Next
#[component]
pub fn MonitorMirror(
    board: Signal<Option<LineBoard>>,
    #[prop(into)] on_next: Callback<()>,
) -> impl IntoView {
    let serving = move || board.with(|b| b.as_ref().and_then(|b| b.snapshot.active.clone()));

    view! {
        <div class="pip-window">
            <div class="pip-header">
                <span class="pip-line">
                    {move || board.with(|b| b.as_ref().map(|b| b.info.name.clone()).unwrap_or_else(|| "Line unavailable".to_string()))}
                </span>
                <span class="pip-wait">
                    {move || format!("Wait: {}", board.with(|b| b.as_ref().map(|b| b.info.stats.waiting).unwrap_or(0)))}
                </span>
            </div>
            <div class="pip-body">
                {move || match serving() {
                    Some(ticket) => view! {
                        <div class="pip-serving">
                            <div class="pip-label">"SERVING"</div>
                            <h1 class="pip-number">{ticket.display_number}</h1>
                            <p class="pip-holder">{ticket.holder_name.unwrap_or_default()}</p>
                        </div>
                    }
                    .into_any(),
                    None => view! { <div class="pip-idle">"Ready"</div> }.into_any(),
                }}
            </div>
            <button class="pip-btn pip-next" on:click=move |_| on_next.run(())>
                {move || if serving().is_some() { "CALL NEXT" } else { "START" }}
            </button>
        </div>
    }
}
