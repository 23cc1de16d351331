//! Frontend Models
//!
//! Data structures for tickets, lines, services and the session user.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Largest integer a JSON double carries exactly
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_991.0;

/// Backend identifier; the API hands out both numeric and string ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum EntityId {
    Num(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for EntityId {
    /// Integers, integral floats (`3.0`) and strings
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Int(n) => Ok(EntityId::Num(n)),
            Repr::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT => Ok(EntityId::Num(f as i64)),
            Repr::Float(f) => Err(D::Error::custom(format!("non-integral id {}", f))),
            Repr::Text(s) => Ok(EntityId::Text(s)),
        }
    }
}

impl EntityId {
    /// Parse an id coming from a URL or storage key
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(n) => EntityId::Num(n),
            Err(_) => EntityId::Text(raw.to_string()),
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Num(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Num(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

/// One queue entry, normalized from the backend record
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: EntityId,
    /// Human-facing label, e.g. "ID:42"
    pub display_number: String,
    pub holder_name: Option<String>,
    pub holder_phone: Option<String>,
    /// Lower-cased server status tag
    pub status: String,
    pub served_at: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
    pub line_name: Option<String>,
}

/// Per-line counters shown on cards and in the mirror
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStats {
    pub waiting: usize,
    pub serving: usize,
    pub total: usize,
}

/// A queue channel (one counter) of a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub stats: LineStats,
}

impl LineInfo {
    /// Label used when nothing better is known about a line
    pub fn placeholder(id: EntityId) -> Self {
        let name = format!("Line #{}", id);
        Self {
            id,
            name,
            stats: LineStats::default(),
        }
    }
}

/// A business offering grouping several lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: EntityId,
    pub name: String,
}

/// Signed-in staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
}
