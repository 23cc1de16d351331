//! User Endpoints

use serde::Deserialize;
use serde_json::Value;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::SessionUser;

/// The user record sits at `.data.user`, `.data` or the top level
fn user_record(payload: &Value) -> &Value {
    payload
        .get("data")
        .and_then(|d| d.get("user").or(Some(d)))
        .unwrap_or(payload)
}

impl ApiClient {
    /// Profile of the token's owner
    pub async fn me(&self) -> Result<SessionUser, ApiError> {
        let payload = self.get("users/me", &[]).await?;
        SessionUser::deserialize(user_record(&payload)).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
