use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Ticket statuses the analytics engine distinguishes. Stored stringly in the
/// record source; a missing status is treated as `open`.
pub const STATUS_OPEN: &str = "open";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_RESOLVED: &str = "resolved";

/// Priority buckets in display order, `unknown` standing in for tickets that
/// were filed without one.
pub const PRIORITIES: [&str; 5] = ["urgent", "high", "medium", "low", "unknown"];
pub const PRIORITY_UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub client_id: i64,
    pub ticket_type_id: i64,
    pub title: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Status with the null-means-open rule applied.
    pub fn effective_status(&self) -> &str {
        self.status.as_deref().unwrap_or(STATUS_OPEN)
    }

    /// Priority with the null-means-unknown rule applied.
    pub fn effective_priority(&self) -> &str {
        self.priority.as_deref().unwrap_or(PRIORITY_UNKNOWN)
    }

    pub fn is_resolved(&self) -> bool {
        self.effective_status() == STATUS_RESOLVED
    }

    /// Wall-clock hours from creation to resolution, if resolved.
    pub fn resolution_hours(&self) -> Option<f64> {
        let resolved = self.resolved_at?;
        let seconds = (resolved - self.created_at).num_milliseconds() as f64 / 1000.0;
        Some(seconds / 3600.0)
    }

    pub fn created_month(&self) -> String {
        month_key(&self.created_at)
    }

    pub fn resolved_month(&self) -> Option<String> {
        self.resolved_at.as_ref().map(month_key)
    }
}

/// Canonical `"YYYY-MM"` UTC grouping key for time-series aggregates.
pub fn month_key(ts: &DateTime<Utc>) -> String {
    format!("{:04}-{:02}", ts.year(), ts.month())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    pub id: i64,
    pub name: String,
    /// Expected-resolution baseline in hours; absent means the type does not
    /// participate in overdue computation.
    pub avg_resolution_hours: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
}

/// One feedback submission against a resolved ticket. Only the rating feeds
/// analytics; capture and messaging live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub ticket_id: i64,
    pub rating: i32,
}
