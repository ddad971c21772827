//! Overdue ranking.
//!
//! Resolved tickets are compared against their type's expected-resolution
//! baseline; tickets that beat the baseline are dropped and the rest are
//! ranked by how far over they ran.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use triage_shared::{Client, Ticket, TicketType};

use super::predicate::TicketPredicate;

pub const MIN_PAGE_SIZE: usize = 1;
pub const MAX_PAGE_SIZE: usize = 200;

/// One ranked overdue ticket with its display joins resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueRow {
    pub id: i64,
    pub title: String,
    pub client_name: String,
    pub ticket_type: String,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: DateTime<Utc>,
    pub expected_hours: i64,
    pub actual_hours: f64,
    pub delta_hours: f64,
}

/// Rank overdue tickets: delta descending, ticket id descending on ties
/// (float deltas can tie; the id makes the order total). Returns the
/// requested page and the qualifying count before pagination.
pub fn rank(
    tickets: &[Ticket],
    pred: &TicketPredicate,
    types: &HashMap<i64, TicketType>,
    clients: &HashMap<i64, Client>,
    limit: usize,
    offset: usize,
) -> (Vec<OverdueRow>, i64) {
    let mut rows: Vec<OverdueRow> = tickets
        .iter()
        .filter(|t| pred.matches(t))
        .filter_map(|t| candidate(t, types, clients))
        .collect();

    rows.sort_by(|a, b| {
        b.delta_hours
            .total_cmp(&a.delta_hours)
            .then(b.id.cmp(&a.id))
    });

    let total = rows.len() as i64;
    let limit = limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
    let page = rows.into_iter().skip(offset).take(limit).collect();
    (page, total)
}

fn candidate(
    ticket: &Ticket,
    types: &HashMap<i64, TicketType>,
    clients: &HashMap<i64, Client>,
) -> Option<OverdueRow> {
    let resolved_at = ticket.resolved_at?;
    let actual_hours = ticket.resolution_hours().filter(|h| h.is_finite())?;
    // Tickets whose type has no baseline are excluded entirely, not counted
    // as zero delta; missing display joins invalidate the row as well.
    let ty = types.get(&ticket.ticket_type_id)?;
    let expected_hours = ty.avg_resolution_hours?;
    let client = clients.get(&ticket.client_id)?;

    let delta_hours = actual_hours - expected_hours as f64;
    if delta_hours <= 0.0 {
        return None;
    }

    Some(OverdueRow {
        id: ticket.id,
        title: ticket.title.clone(),
        client_name: client.name.clone(),
        ticket_type: ty.name.clone(),
        status: ticket.effective_status().to_string(),
        priority: ticket.effective_priority().to_string(),
        created_at: ticket.created_at,
        resolved_at,
        expected_hours,
        actual_hours,
        delta_hours,
    })
}
