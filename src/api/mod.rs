//! Backend API Client
//!
//! REST bindings to the queue backend, organized by domain.

mod catalog;
mod tickets;
mod users;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub use tickets::ActionReply;

/// HTTP client bound to one backend and (optionally) one bearer token
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    /// Same backend, different credentials
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let request = self.http.get(self.url(path)).query(query);
        self.send("GET", path, request).await
    }

    async fn put(&self, path: &str) -> Result<Value, ApiError> {
        let request = self.http.put(self.url(path));
        self.send("PUT", path, request).await
    }

    async fn send(&self, method: &str, path: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        log::debug!("[API] {} {}", method, path);

        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(ApiError::from_status(status.as_u16(), &body));
            }
            parse_body(&body)
        }
        .await;

        if let Err(err) = &result {
            log::warn!("[API] {} {} failed: {}", method, path, err);
        }
        result
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Empty bodies are fine for actions
fn parse_body(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Locate a list inside the backend's envelope.
///
/// Probe order: `.data` array, `.data.<key>` array, bare array, `.<key>` array.
fn records<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    let probes = [
        payload.get("data"),
        payload.get("data").and_then(|d| d.get(key)),
        Some(payload),
        payload.get(key),
    ];
    probes
        .into_iter()
        .flatten()
        .find_map(|candidate| candidate.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Decode every record that fits `T`, skipping the rest
fn decode_list<T: DeserializeOwned>(payload: &Value, key: &str) -> Vec<T> {
    records(payload, key)
        .iter()
        .filter_map(|record| match T::deserialize(record) {
            Ok(item) => Some(item),
            Err(err) => {
                log::debug!("[API] skipping {} record: {}", key, err);
                None
            }
        })
        .collect()
}
