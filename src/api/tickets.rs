//! Ticket Endpoints
//!
//! Listing a line's tickets and the three queue actions.

use serde_json::Value;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::EntityId;

/// Outcome of a queue action; the server message is shown verbatim
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionReply {
    pub message: Option<String>,
}

impl ActionReply {
    pub fn from_body(body: &Value) -> Self {
        let message = body
            .get("message")
            .or_else(|| body.get("data").and_then(|d| d.get("message")))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        Self { message }
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

impl ApiClient {
    /// Raw ticket list of a line; shape probing is left to `queue::normalize`
    pub async fn list_tickets(&self, line_id: &EntityId) -> Result<Value, ApiError> {
        self.get(&format!("tickets/line/{}", line_id), &[]).await
    }

    /// Advance the line to its next waiting ticket
    pub async fn call_next(&self, line_id: &EntityId) -> Result<ActionReply, ApiError> {
        let body = self.put(&format!("tickets/call-next/{}", line_id)).await?;
        Ok(ActionReply::from_body(&body))
    }

    pub async fn finish(&self, ticket_id: &EntityId) -> Result<ActionReply, ApiError> {
        let body = self.put(&format!("tickets/finish/{}", ticket_id)).await?;
        Ok(ActionReply::from_body(&body))
    }

    pub async fn cancel(&self, ticket_id: &EntityId) -> Result<ActionReply, ApiError> {
        let body = self.put(&format!("tickets/cancel/{}", ticket_id)).await?;
        Ok(ActionReply::from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_reply_message() {
        let reply = ActionReply::from_body(&json!({"message": "Called ticket 12"}));
        assert_eq!(reply.message.as_deref(), Some("Called ticket 12"));

        let nested = ActionReply::from_body(&json!({"data": {"message": "Finished"}}));
        assert_eq!(nested.message_or("Done"), "Finished");

        let empty = ActionReply::from_body(&Value::Null);
        assert_eq!(empty.message_or("Done"), "Done");
    }
}
