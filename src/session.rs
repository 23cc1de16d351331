//! Session
//!
//! Explicit session object: signed-in user, bearer token and the per-line
//! display-name cache. Loaded once at startup and cleared on logout.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{EntityId, LineInfo, SessionUser};

const USER_KEY: &str = "user";
const TOKEN_KEY: &str = "token";
const LINE_KEY_PREFIX: &str = "line_";

/// String key-value storage the session lives in
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn clear(&self);
}

/// Browser `sessionStorage`
pub struct BrowserSession(web_sys::Storage);

impl BrowserSession {
    pub fn open() -> Option<Self> {
        web_sys::window()?.session_storage().ok().flatten().map(BrowserSession)
    }
}

impl KeyValueStore for BrowserSession {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = self.0.set_item(key, value) {
            log::warn!("[SESSION] failed to store {}: {:?}", key, err);
        }
    }

    fn clear(&self) {
        let _ = self.0.clear();
    }
}

/// In-memory store, used when browser storage is unavailable
#[derive(Default)]
pub struct MemoryStore(RefCell<HashMap<String, String>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Run `f` against browser session storage, falling back to a throwaway memory store
pub fn with_store<R>(f: impl FnOnce(&dyn KeyValueStore) -> R) -> R {
    match BrowserSession::open() {
        Some(store) => f(&store),
        None => f(&MemoryStore::new()),
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("[SESSION] ignoring unreadable {}: {}", key, err);
            None
        }
    }
}

fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(err) => log::warn!("[SESSION] failed to encode {}: {}", key, err),
    }
}

fn line_key(id: &EntityId) -> String {
    format!("{}{}", LINE_KEY_PREFIX, id)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub token: Option<String>,
}

impl Session {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            user: read_json(store, USER_KEY),
            token: store.get(TOKEN_KEY).filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn set_user(&mut self, store: &dyn KeyValueStore, user: SessionUser) {
        write_json(store, USER_KEY, &user);
        self.user = Some(user);
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// Display name for the sidebar footer
    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("User")
    }

    pub fn role(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.role.as_str())
            .filter(|r| !r.is_empty())
            .unwrap_or("Staff")
    }

    /// Remember a line's label for a later Counter visit
    pub fn cache_line(store: &dyn KeyValueStore, line: &LineInfo) {
        write_json(store, &line_key(&line.id), line);
    }

    /// Cached line label, else a placeholder. Never a source of ticket data.
    pub fn line_info(store: &dyn KeyValueStore, id: &EntityId) -> LineInfo {
        read_json(store, &line_key(id)).unwrap_or_else(|| LineInfo::placeholder(id.clone()))
    }

    /// Forget everything; called on logout
    pub fn clear(&mut self, store: &dyn KeyValueStore) {
        store.clear();
        *self = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineStats;

    fn staff() -> SessionUser {
        SessionUser {
            name: "Lan".to_string(),
            role: "staff".to_string(),
            email: Some("lan@example.com".to_string()),
        }
    }

    #[test]
    fn test_load_empty_store() {
        let store = MemoryStore::new();
        let session = Session::load(&store);
        assert_eq!(session, Session::default());
        assert!(!session.is_signed_in());
        assert_eq!(session.display_name(), "User");
        assert_eq!(session.role(), "Staff");
    }

    #[test]
    fn test_user_persists_across_loads() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc");
        let mut session = Session::load(&store);
        session.set_user(&store, staff());

        let reloaded = Session::load(&store);
        assert_eq!(reloaded.user, Some(staff()));
        assert_eq!(reloaded.token.as_deref(), Some("abc"));
        assert_eq!(reloaded.display_name(), "Lan");
    }

    #[test]
    fn test_unreadable_user_ignored() {
        let store = MemoryStore::new();
        store.set(USER_KEY, "{not json");
        assert_eq!(Session::load(&store).user, None);
    }

    #[test]
    fn test_clear_on_logout() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc");
        let mut session = Session::load(&store);
        session.set_user(&store, staff());
        Session::cache_line(&store, &LineInfo::placeholder(EntityId::Num(1)));

        session.clear(&store);
        assert_eq!(session, Session::default());
        assert_eq!(store.get(TOKEN_KEY), None);
        assert_eq!(store.get("line_1"), None);
    }

    #[test]
    fn test_line_cache() {
        let store = MemoryStore::new();
        let line = LineInfo {
            id: EntityId::Num(4),
            name: "Counter A".to_string(),
            stats: LineStats { waiting: 3, serving: 1, total: 4 },
        };
        Session::cache_line(&store, &line);

        assert_eq!(Session::line_info(&store, &EntityId::Num(4)), line);
        assert_eq!(Session::line_info(&store, &EntityId::Num(5)).name, "Line #5");
    }
}
