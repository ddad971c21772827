//! Filtered ticket listing.
//!
//! Two mutually exclusive strategies per request: keyset pagination over the
//! `(created_at, id)` descending order, or free-text search scored over the
//! full matching set in memory. A search request never returns a cursor.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_shared::Ticket;

use super::analytics::FilterQuery;
use crate::pagination::{self, clamp_limit, Cursor, SortOrder};
use crate::{ApiResult, AppState};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketListQuery {
    #[serde(flatten)]
    pub filters: FilterQuery,
    /// Opaque continuation token from a previous page.
    pub cursor: Option<String>,
    pub limit: Option<String>,
    /// `asc` or `desc` over `(created_at, id)`; defaults to newest first.
    pub sort: Option<String>,
    /// Free-text search over ticket titles; bypasses keyset paging.
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPage {
    pub data: Vec<Ticket>,
    pub next_cursor: Option<String>,
    pub has_next: bool,
}

pub fn ticket_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_tickets))
}

async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TicketListQuery>,
) -> ApiResult<Json<TicketPage>> {
    let snap = state.source.snapshot().await?;
    let pred = params.filters.predicate();
    let limit = clamp_limit(
        params
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok()),
    );

    if let Some(query) = params.search.as_deref().filter(|q| !q.trim().is_empty()) {
        let rows = pagination::search(&snap.tickets, &pred, query, limit);
        return Ok(Json(TicketPage {
            data: rows.into_iter().cloned().collect(),
            next_cursor: None,
            has_next: false,
        }));
    }

    // An undecodable cursor degrades to the first page.
    let cursor = params.cursor.as_deref().and_then(Cursor::decode);
    let order = SortOrder::parse(params.sort.as_deref());
    let page = pagination::page(&snap.tickets, &pred, order, cursor, limit);

    Ok(Json(TicketPage {
        next_cursor: page.next_cursor.map(|c| c.encode()),
        has_next: page.next_cursor.is_some(),
        data: page.rows.into_iter().cloned().collect(),
    }))
}
