//! Ticket Normalization
//!
//! The single boundary between raw backend payloads and `Ticket`.
//! Never fails: unknown shapes yield an empty list, malformed records are skipped.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{EntityId, Ticket};

const DEFAULT_STATUS: &str = "waiting";

/// Locate the ticket array inside a list response.
///
/// Probe order: bare array, `.data` array, `.data.tickets` array, `.tickets` array.
pub fn extract_records(payload: &Value) -> &[Value] {
    let probes = [
        Some(payload),
        payload.get("data"),
        payload.get("data").and_then(|d| d.get("tickets")),
        payload.get("tickets"),
    ];
    probes
        .into_iter()
        .flatten()
        .find_map(|candidate| candidate.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Normalize every usable record of `payload`, preserving server order
pub fn normalize_tickets(payload: &Value, now: DateTime<Utc>) -> Vec<Ticket> {
    let records = extract_records(payload);
    let tickets: Vec<Ticket> = records.iter().filter_map(|r| normalize_ticket(r, now)).collect();
    if tickets.len() != records.len() {
        log::warn!("[QUEUE] skipped {} malformed ticket records", records.len() - tickets.len());
    }
    tickets
}

#[derive(Deserialize)]
struct RawTicket {
    id: EntityId,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    ticket_number: Option<Value>,
    #[serde(default)]
    user: Option<RawHolder>,
    #[serde(default)]
    served_at: Option<Value>,
    #[serde(default)]
    joined_at: Option<Value>,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default)]
    line_name: Option<Value>,
}

#[derive(Deserialize, Default)]
struct RawHolder {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    phone: Option<Value>,
    #[serde(default)]
    ticket_number: Option<Value>,
}

/// Normalize one record; `None` when it is not an object with an id
pub fn normalize_ticket(record: &Value, now: DateTime<Utc>) -> Option<Ticket> {
    let raw = RawTicket::deserialize(record).ok()?;
    let holder = raw.user.unwrap_or_default();

    let display_number = text(raw.ticket_number.as_ref())
        .or_else(|| text(holder.ticket_number.as_ref()))
        .unwrap_or_else(|| format!("ID:{}", raw.id));
    let status = text(raw.status.as_ref())
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());
    let joined_at = timestamp(raw.joined_at.as_ref())
        .or_else(|| timestamp(raw.created_at.as_ref()))
        .unwrap_or(now);

    Some(Ticket {
        id: raw.id,
        display_number,
        holder_name: text(holder.name.as_ref()),
        holder_phone: text(holder.phone.as_ref()),
        status,
        served_at: timestamp(raw.served_at.as_ref()),
        joined_at,
        line_name: text(raw.line_name.as_ref()),
    })
}

/// Non-empty string or number as text
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` (UTC) or epoch milliseconds
fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn records() -> Value {
        json!([
            {"id": 1, "status": "WAITING", "user": {"name": "An", "phone": "0901"}},
            {"id": 2, "status": "serving", "served_at": "2025-03-01T08:58:00Z"}
        ])
    }

    fn ids(payload: &Value) -> Vec<EntityId> {
        normalize_tickets(payload, now()).into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_all_payload_shapes_extract_same_list() {
        let expected = vec![EntityId::Num(1), EntityId::Num(2)];
        assert_eq!(ids(&records()), expected);
        assert_eq!(ids(&json!({"data": records()})), expected);
        assert_eq!(ids(&json!({"data": {"tickets": records()}})), expected);
        assert_eq!(ids(&json!({"tickets": records()})), expected);
    }

    #[test]
    fn test_unknown_shape_is_empty() {
        assert!(extract_records(&json!({"data": {"lines": []}})).is_empty());
        assert!(extract_records(&json!(null)).is_empty());
        assert!(extract_records(&json!("oops")).is_empty());
        assert!(normalize_tickets(&json!({"message": "ok"}), now()).is_empty());
    }

    #[test]
    fn test_data_probed_before_tickets() {
        let payload = json!({"data": [{"id": 1}], "tickets": [{"id": 9}]});
        assert_eq!(ids(&payload), vec![EntityId::Num(1)]);
    }

    #[test]
    fn test_record_defaults() {
        let ticket = normalize_ticket(&json!({"id": 5}), now()).unwrap();
        assert_eq!(ticket.status, "waiting");
        assert_eq!(ticket.display_number, "ID:5");
        assert_eq!(ticket.joined_at, now());
        assert_eq!(ticket.served_at, None);
        assert_eq!(ticket.holder_name, None);
    }

    #[test]
    fn test_record_fields() {
        let record = json!({
            "id": "t-9",
            "status": "Processing",
            "user": {"name": "Binh", "phone": 912345678, "ticket_number": "A012"},
            "served_at": "2025-03-01 08:55:00",
            "created_at": "2025-03-01T08:30:00+07:00",
            "line_name": "Counter 2"
        });
        let ticket = normalize_ticket(&record, now()).unwrap();

        assert_eq!(ticket.id, EntityId::Text("t-9".to_string()));
        assert_eq!(ticket.status, "processing");
        assert_eq!(ticket.display_number, "A012");
        assert_eq!(ticket.holder_name.as_deref(), Some("Binh"));
        assert_eq!(ticket.holder_phone.as_deref(), Some("912345678"));
        assert_eq!(ticket.served_at, Some(Utc.with_ymd_and_hms(2025, 3, 1, 8, 55, 0).unwrap()));
        assert_eq!(ticket.joined_at, Utc.with_ymd_and_hms(2025, 3, 1, 1, 30, 0).unwrap());
        assert_eq!(ticket.line_name.as_deref(), Some("Counter 2"));
    }

    #[test]
    fn test_joined_at_preferred_over_created_at() {
        let record = json!({
            "id": 1,
            "joined_at": "2025-03-01T08:00:00Z",
            "created_at": "2025-03-01T07:00:00Z"
        });
        let ticket = normalize_ticket(&record, now()).unwrap();
        assert_eq!(ticket.joined_at, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_malformed_records_skipped() {
        let payload = json!([{"id": 1}, "junk", {"status": "waiting"}, {"id": 4}]);
        assert_eq!(ids(&payload), vec![EntityId::Num(1), EntityId::Num(4)]);
    }

    #[test]
    fn test_float_id_kept_as_serving_ticket() {
        let payload = json!([{"id": 3.0, "status": " Serving "}, {"id": 4, "status": ""}]);
        let tickets = normalize_tickets(&payload, now());
        let seen: Vec<_> = tickets.iter().map(|t| (t.id.clone(), t.status.as_str())).collect();
        assert_eq!(seen, vec![(EntityId::Num(3), "serving"), (EntityId::Num(4), "waiting")]);

        let snapshot = crate::queue::QueueSnapshot::from_tickets(&tickets);
        assert_eq!(snapshot.active.map(|t| t.id), Some(EntityId::Num(3)));
    }

    #[test]
    fn test_input_not_mutated() {
        let payload = json!({"data": [{"id": 1, "status": "SERVING"}]});
        let before = payload.clone();
        let _ = normalize_tickets(&payload, now());
        assert_eq!(payload, before);
    }
}
