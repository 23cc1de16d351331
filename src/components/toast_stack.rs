//! Toast Stack Component
//!
//! Renders the notifier's queue in the corner; click a toast to dismiss it.

use leptos::prelude::*;

use crate::context::use_app_context;

#[component]
pub fn ToastStack() -> impl IntoView {
    let notifier = use_app_context().notifier;
    let toasts = notifier.toasts();

    view! {
        <div class="toast-stack">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=toast.level.class() on:click=move |_| notifier.dismiss(id)>
                            {toast.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
