//! Line Card Component
//!
//! One line of the monitor board: serving ticket, waiting count and the
//! next three waiting tickets.

use leptos::prelude::*;

use crate::store::LineBoard;

/// Waiting tickets previewed on a card
const PREVIEW_LEN: usize = 3;

#[component]
pub fn LineCard(
    board: LineBoard,
    /// Open the line's counter
    #[prop(into)] on_open: Callback<()>,
    /// Open the line in a mini window
    #[prop(into)] on_mirror: Callback<()>,
) -> impl IntoView {
    let stats = board.info.stats;
    let preview: Vec<_> = board
        .snapshot
        .preview(PREVIEW_LEN)
        .iter()
        .enumerate()
        .map(|(index, ticket)| {
            view! {
                <div class="line-card-preview-row">
                    <span class="line-card-preview-index">{index + 1}</span>
                    <span class="line-card-preview-number">{ticket.display_number.clone()}</span>
                </div>
            }
        })
        .collect();

    let serving = match board.snapshot.active {
        Some(ticket) => view! {
            <div class="line-card-serving">
                <span class="badge badge-calling">"Calling"</span>
                <div class="line-card-number">{ticket.display_number}</div>
                <div class="line-card-holder">{ticket.holder_name.unwrap_or_default()}</div>
            </div>
        }
        .into_any(),
        None => view! { <div class="line-card-empty">"Empty"</div> }.into_any(),
    };

    view! {
        <div class="line-card" on:click=move |_| on_open.run(())>
            <div class="line-card-header">
                <div>
                    <h3 class="line-card-title">{board.info.name}</h3>
                    <span class="line-card-total">{format!("Total: {}", stats.total)}</span>
                </div>
                <button
                    class="icon-btn"
                    title="Mini window"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        on_mirror.run(());
                    }
                >
                    "⧉"
                </button>
            </div>

            <div class="line-card-body">{serving}</div>

            <div class="line-card-footer">
                <div class="line-card-waiting">
                    <span>"Waiting queue"</span>
                    <span class="badge">{stats.waiting}</span>
                </div>
                <div class="line-card-preview">{preview}</div>
                <button class="line-card-manage">"Manage ›"</button>
            </div>
        </div>
    }
}
