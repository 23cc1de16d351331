//! Signed-Out Screen

use leptos::prelude::*;

use crate::context::use_app_context;

#[component]
pub fn SignedOut() -> impl IntoView {
    let ctx = use_app_context();

    view! {
        <div class="signed-out">
            <h1>"QR Smart Queue"</h1>
            <p>"You have signed out. Sign in through the portal, then reload your session."</p>
            <button class="primary-btn" on:click=move |_| ctx.reload_session()>
                "Reload session"
            </button>
        </div>
    }
}
