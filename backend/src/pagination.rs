//! Keyset pagination over filtered ticket sets.
//!
//! Large listings page by the `(created_at, id)` total order, newest first by
//! default and reversible per request, with an opaque cursor instead of an
//! offset, so pages stay stable under concurrent writes and deep pages stay
//! cheap. Free-text search requests bypass this entirely and score the full
//! matching set in memory; the two strategies are mutually exclusive per
//! request.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triage_shared::Ticket;

use crate::engine::predicate::TicketPredicate;

/// Default page size if not specified
pub const DEFAULT_PAGE_SIZE: usize = 25;
/// Maximum allowed page size
pub const MAX_PAGE_SIZE: usize = 100;

/// Direction of the `(created_at, id)` total order for a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

impl SortOrder {
    /// Parse a direction token; anything unrecognized degrades to the default
    /// newest-first order.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("asc") | Some("ascending") => Self::Ascending,
            _ => Self::Descending,
        }
    }
}

/// Position of the last row of the previous page in the total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

impl Cursor {
    /// Opaque wire form: url-safe base64 over the JSON payload, so the token
    /// survives a query string without percent-encoding.
    pub fn encode(&self) -> String {
        // Serializing a two-field struct of primitives cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a wire cursor. An undecodable token degrades to "first page"
    /// rather than rejecting the request.
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Strict total-order comparison: does `ticket` come after this cursor in
    /// the requested direction of the `(created_at, id)` order?
    fn precedes(&self, ticket: &Ticket, order: SortOrder) -> bool {
        let ticket_key = (ticket.created_at, ticket.id);
        let cursor_key = (self.created_at, self.id);
        match order {
            SortOrder::Descending => ticket_key < cursor_key,
            SortOrder::Ascending => ticket_key > cursor_key,
        }
    }
}

/// One keyset page plus the probe-derived continuation.
#[derive(Debug)]
pub struct KeysetPage<'a> {
    pub rows: Vec<&'a Ticket>,
    pub next_cursor: Option<Cursor>,
}

/// Clamp a requested page size into `[1, MAX_PAGE_SIZE]`.
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Fetch one page of matching tickets after `cursor` in the requested
/// direction. Requests `limit` rows plus one probe row; the probe's presence
/// decides `next_cursor` without a separate count pass.
pub fn page<'a>(
    tickets: &'a [Ticket],
    pred: &TicketPredicate,
    order: SortOrder,
    cursor: Option<Cursor>,
    limit: usize,
) -> KeysetPage<'a> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);

    let mut matching: Vec<&Ticket> = tickets
        .iter()
        .filter(|t| pred.matches(t))
        .filter(|t| cursor.as_ref().map_or(true, |c| c.precedes(t, order)))
        .collect();
    matching.sort_by(|a, b| {
        let key_a = (a.created_at, a.id);
        let key_b = (b.created_at, b.id);
        match order {
            SortOrder::Descending => key_b.cmp(&key_a),
            SortOrder::Ascending => key_a.cmp(&key_b),
        }
    });

    let has_more = matching.len() > limit;
    matching.truncate(limit);

    let next_cursor = if has_more {
        matching.last().map(|t| Cursor {
            id: t.id,
            created_at: t.created_at,
        })
    } else {
        None
    };

    KeysetPage {
        rows: matching,
        next_cursor,
    }
}

/// Search mode: case-insensitive substring match over titles, best matches
/// first (earlier hit position, then the keyset order). No cursor.
pub fn search<'a>(
    tickets: &'a [Ticket],
    pred: &TicketPredicate,
    query: &str,
    limit: usize,
) -> Vec<&'a Ticket> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let limit = limit.clamp(1, MAX_PAGE_SIZE);

    let mut scored: Vec<(usize, &Ticket)> = tickets
        .iter()
        .filter(|t| pred.matches(t))
        .filter_map(|t| t.title.to_lowercase().find(&needle).map(|pos| (pos, t)))
        .collect();
    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then((b.1.created_at, b.1.id).cmp(&(a.1.created_at, a.1.id)))
    });

    scored.into_iter().take(limit).map(|(_, t)| t).collect()
}
