//! Service and Line Endpoints

use super::{decode_list, ApiClient};
use crate::error::ApiError;
use crate::models::{EntityId, LineInfo, Service};

impl ApiClient {
    /// First page of services, for the monitor sidebar
    pub async fn list_services(&self, limit: u32) -> Result<Vec<Service>, ApiError> {
        let query = [("page", "1".to_string()), ("limit", limit.to_string()), ("search", String::new())];
        let payload = self.get("services", &query).await?;
        Ok(decode_list(&payload, "services"))
    }

    /// Lines of one service; stats start zeroed until the first poll
    pub async fn list_lines(&self, service_id: &EntityId) -> Result<Vec<LineInfo>, ApiError> {
        let payload = self.get(&format!("lines/service/{}", service_id), &[]).await?;
        Ok(decode_list(&payload, "lines"))
    }
}
