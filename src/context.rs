//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsValue;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::models::{EntityId, LineInfo};
use crate::notify::Notifier;
use crate::session::{with_store, Session};

const LINE_PARAM: &str = "lineId";

/// Which screen is showing
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Monitor,
    Counter(EntityId),
    SignedOut,
}

/// App-wide state provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    config: StoredValue<AppConfig>,
    api: StoredValue<ApiClient, LocalStorage>,
    /// Signed-in user and token
    pub session: RwSignal<Session>,
    pub notifier: Notifier,
    /// Current screen - read
    pub page: ReadSignal<Page>,
    /// Current screen - write
    set_page: WriteSignal<Page>,
}

impl AppContext {
    pub fn new(config: AppConfig, session: Session, page: (ReadSignal<Page>, WriteSignal<Page>)) -> Self {
        let api = ApiClient::new(config.api_base_url.clone(), session.token.clone());
        let notifier = Notifier::new(config.toast_ttl_ms);
        Self {
            config: StoredValue::new(config),
            api: StoredValue::new_local(api),
            session: RwSignal::new(session),
            notifier,
            page: page.0,
            set_page: page.1,
        }
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    /// Client carrying the current session's credentials
    pub fn api(&self) -> ApiClient {
        self.api.get_value()
    }

    /// Go to a line's counter, remembering its label for the counter header
    pub fn open_counter(&self, line: LineInfo) {
        with_store(|store| Session::cache_line(store, &line));
        self.navigate(Page::Counter(line.id));
    }

    pub fn open_monitor(&self) {
        self.navigate(Page::Monitor);
    }

    /// Refresh the cached user profile from the backend
    pub fn refresh_user(&self) {
        if !self.session.get_untracked().is_signed_in() {
            return;
        }
        let api = self.api();
        let session = self.session;
        spawn_local(async move {
            match api.me().await {
                Ok(user) => {
                    session.try_update(|s| with_store(|store| s.set_user(store, user)));
                }
                Err(err) => log::warn!("[SESSION] profile refresh failed: {}", err),
            }
        });
    }

    /// Re-read the session from storage, e.g. after signing in elsewhere
    pub fn reload_session(&self) {
        let session = with_store(Session::load);
        self.api.update_value(|api| *api = api.with_token(session.token.clone()));
        self.session.set(session);
        self.refresh_user();
        self.navigate(Page::Monitor);
    }

    pub fn logout(&self) {
        self.session.update(|s| with_store(|store| s.clear(store)));
        self.api.update_value(|api| *api = api.with_token(None));
        self.navigate(Page::SignedOut);
        self.notifier.info("Signed out");
        log::info!("[SESSION] signed out");
    }

    fn navigate(&self, page: Page) {
        sync_location(&page);
        self.set_page.set(page);
    }
}

/// Get the app context
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

/// Starting screen: a `?lineId=` link opens that line's counter
pub fn initial_page() -> Page {
    let line = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok())
        .and_then(|params| params.get(LINE_PARAM))
        .and_then(|raw| EntityId::parse(&raw));
    match line {
        Some(id) => Page::Counter(id),
        None => Page::Monitor,
    }
}

/// Keep the address bar shareable without reloading
fn sync_location(page: &Page) {
    let Some(win) = web_sys::window() else { return };
    let Ok(path) = win.location().pathname() else { return };
    let url = match page {
        Page::Counter(id) => format!("{}?{}={}", path, LINE_PARAM, id),
        Page::Monitor | Page::SignedOut => path,
    };
    if let Ok(history) = win.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&url));
    }
}
