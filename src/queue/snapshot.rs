//! Queue Snapshot
//!
//! Derives the active ticket and waiting list from a normalized ticket list.
//! Recomputed wholesale on every poll; nothing is merged across polls.

use crate::models::{LineStats, Ticket};

const SERVING_TAGS: [&str; 4] = ["serving", "processing", "calling", "active"];
const WAITING_TAGS: [&str; 2] = ["waiting", "pending"];

/// How the console treats a server status tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Serving,
    Waiting,
    Other,
}

impl StatusClass {
    /// Classify a status tag (case-insensitive)
    pub fn of(status: &str) -> Self {
        let status = status.trim().to_lowercase();
        if SERVING_TAGS.contains(&status.as_str()) {
            StatusClass::Serving
        } else if WAITING_TAGS.contains(&status.as_str()) {
            StatusClass::Waiting
        } else {
            StatusClass::Other
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    /// First serving-class ticket, if any
    pub active: Option<Ticket>,
    /// Waiting-class tickets in server order
    pub waiting: Vec<Ticket>,
    /// Number of records the server returned
    pub received: usize,
}

impl QueueSnapshot {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let active = tickets
            .iter()
            .find(|t| StatusClass::of(&t.status) == StatusClass::Serving)
            .cloned();
        let waiting = tickets
            .iter()
            .filter(|t| StatusClass::of(&t.status) == StatusClass::Waiting)
            .cloned()
            .collect();
        Self {
            active,
            waiting,
            received: tickets.len(),
        }
    }

    pub fn stats(&self) -> LineStats {
        let serving = usize::from(self.active.is_some());
        LineStats {
            waiting: self.waiting.len(),
            serving,
            total: serving + self.waiting.len(),
        }
    }

    /// The next `n` waiting tickets
    pub fn preview(&self, n: usize) -> &[Ticket] {
        &self.waiting[..self.waiting.len().min(n)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;
    use chrono::Utc;

    fn make_ticket(id: i64, status: &str) -> Ticket {
        Ticket {
            id: EntityId::Num(id),
            display_number: format!("ID:{}", id),
            holder_name: None,
            holder_phone: None,
            status: status.to_string(),
            served_at: None,
            joined_at: Utc::now(),
            line_name: None,
        }
    }

    fn ids(tickets: &[Ticket]) -> Vec<EntityId> {
        tickets.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_classification() {
        assert_eq!(StatusClass::of("serving"), StatusClass::Serving);
        assert_eq!(StatusClass::of("CALLING"), StatusClass::Serving);
        assert_eq!(StatusClass::of("active"), StatusClass::Serving);
        assert_eq!(StatusClass::of("pending"), StatusClass::Waiting);
        assert_eq!(StatusClass::of("done"), StatusClass::Other);
        assert_eq!(StatusClass::of("cancelled"), StatusClass::Other);
    }

    #[test]
    fn test_snapshot_partitions_by_status() {
        let tickets = vec![
            make_ticket(1, "waiting"),
            make_ticket(2, "serving"),
            make_ticket(3, "pending"),
            make_ticket(4, "done"),
        ];
        let snapshot = QueueSnapshot::from_tickets(&tickets);

        assert_eq!(snapshot.active.as_ref().map(|t| t.id.clone()), Some(EntityId::Num(2)));
        assert_eq!(ids(&snapshot.waiting), vec![EntityId::Num(1), EntityId::Num(3)]);
        assert_eq!(snapshot.received, 4);
    }

    #[test]
    fn test_no_serving_ticket() {
        let tickets = vec![make_ticket(1, "waiting"), make_ticket(2, "done")];
        assert!(QueueSnapshot::from_tickets(&tickets).active.is_none());
        assert!(QueueSnapshot::from_tickets(&[]).active.is_none());
    }

    #[test]
    fn test_first_serving_ticket_wins() {
        let tickets = vec![
            make_ticket(7, "waiting"),
            make_ticket(8, "processing"),
            make_ticket(9, "serving"),
        ];
        let snapshot = QueueSnapshot::from_tickets(&tickets);
        assert_eq!(snapshot.active.map(|t| t.id), Some(EntityId::Num(8)));
    }

    #[test]
    fn test_waiting_order_preserved() {
        let tickets = vec![
            make_ticket(30, "waiting"),
            make_ticket(10, "pending"),
            make_ticket(20, "waiting"),
        ];
        let snapshot = QueueSnapshot::from_tickets(&tickets);
        assert_eq!(
            ids(&snapshot.waiting),
            vec![EntityId::Num(30), EntityId::Num(10), EntityId::Num(20)]
        );
        assert_eq!(ids(snapshot.preview(2)), vec![EntityId::Num(30), EntityId::Num(10)]);
        assert_eq!(snapshot.preview(10).len(), 3);
    }

    #[test]
    fn test_stats() {
        let tickets = vec![
            make_ticket(1, "serving"),
            make_ticket(2, "waiting"),
            make_ticket(3, "waiting"),
            make_ticket(4, "done"),
        ];
        let stats = QueueSnapshot::from_tickets(&tickets).stats();
        assert_eq!(stats, LineStats { waiting: 2, serving: 1, total: 3 });
    }
}
