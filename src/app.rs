//! Smart Queue Console App
//!
//! Root component: builds the shared context and switches between screens.

use leptos::prelude::*;

use crate::components::{CounterPage, MonitorPage, SignedOut, ToastStack};
use crate::config::AppConfig;
use crate::context::{initial_page, AppContext, Page};
use crate::session::{with_store, Session};

#[component]
pub fn App() -> impl IntoView {
    let session = with_store(Session::load);
    let page = signal(if session.is_signed_in() { initial_page() } else { Page::SignedOut });

    let ctx = AppContext::new(AppConfig::from_env(), session, page);
    provide_context(ctx);
    ctx.refresh_user();

    view! {
        <div class="app-layout">
            {move || match ctx.page.get() {
                Page::Monitor => view! { <MonitorPage /> }.into_any(),
                Page::Counter(line_id) => view! { <CounterPage line_id=line_id /> }.into_any(),
                Page::SignedOut => view! { <SignedOut /> }.into_any(),
            }}
            <ToastStack />
        </div>
    }
}
