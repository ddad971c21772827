//! Analytics endpoints.
//!
//! Every endpoint accepts the same date range and per-dimension filters,
//! compiles them into one predicate, and fans that predicate out across the
//! engine's aggregate functions. Malformed filter input degrades to "no
//! constraint" instead of rejecting the request.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::{
    aggregate::{self, KeyCount, PriorityStatusCount, ResolutionStats},
    filter::{normalize, normalize_assignee, FilterOp},
    forecast::forecast_next,
    histogram::{resolution_histogram, BinPreset, HistogramBin},
    overdue,
    predicate::{compile, DateRange, FilterSet, TicketPredicate},
};
use crate::{ApiResult, AppState};

// ==================== Query Parameters ====================

/// Common analytics query parameters: an inclusive UTC date range plus one
/// comma-separated value list and operator per filterable dimension, e.g.
/// `?assignee=7,none&assignee_op=is_none_of&priority=high,urgent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub assignee: Option<String>,
    pub assignee_op: Option<String>,
    pub client: Option<String>,
    pub client_op: Option<String>,
    pub ticket_type: Option<String>,
    pub ticket_type_op: Option<String>,
    pub priority: Option<String>,
    pub priority_op: Option<String>,
    pub status: Option<String>,
    pub status_op: Option<String>,
}

impl FilterQuery {
    /// Unparseable dates degrade to an unbounded side.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            from: parse_date(self.from_date.as_deref()),
            to: parse_date(self.to_date.as_deref()),
        }
    }

    pub fn filter_set(&self) -> FilterSet {
        FilterSet {
            assignee: normalize_assignee(
                FilterOp::parse(self.assignee_op.as_deref()),
                &split_values(self.assignee.as_deref()),
            ),
            client: normalize(
                FilterOp::parse(self.client_op.as_deref()),
                &split_values(self.client.as_deref()),
            ),
            ticket_type: normalize(
                FilterOp::parse(self.ticket_type_op.as_deref()),
                &split_values(self.ticket_type.as_deref()),
            ),
            priority: normalize(
                FilterOp::parse(self.priority_op.as_deref()),
                &split_values(self.priority.as_deref()),
            ),
            status: normalize(
                FilterOp::parse(self.status_op.as_deref()),
                &split_values(self.status.as_deref()),
            ),
        }
    }

    /// Compile once per request; reused across every aggregate of that
    /// request.
    pub fn predicate(&self) -> TicketPredicate {
        compile(self.date_range(), self.filter_set())
    }
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()
}

fn split_values(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

/// Lenient numeric query token: absent or unparseable means "use default".
fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse().ok()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistogramQuery {
    #[serde(flatten)]
    pub filters: FilterQuery,
    pub bins: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverdueQuery {
    #[serde(flatten)]
    pub filters: FilterQuery,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastQuery {
    #[serde(flatten)]
    pub filters: FilterQuery,
    /// Which monthly aggregate to project: `created` (default) or `resolved`.
    pub series: Option<String>,
}

// ==================== Response Shapes ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total: i64,
    pub open: i64,
    pub avg_resolution_hours: Option<f64>,
    pub avg_rating: Option<f64>,
    pub created_by_month: BTreeMap<String, i64>,
    pub resolved_by_month: BTreeMap<String, i64>,
    pub open_by_month: BTreeMap<String, i64>,
    pub avg_resolution_hours_by_month: BTreeMap<String, f64>,
    pub tickets_by_type: Vec<KeyCount>,
    pub tickets_by_priority: Vec<KeyCount>,
    pub tickets_by_priority_status: Vec<PriorityStatusCount>,
    pub expected_total: i64,
    pub overdue_total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    pub overall: Option<ResolutionStats>,
    pub by_priority: BTreeMap<String, ResolutionStats>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueReport {
    pub total: i64,
    pub rows: Vec<overdue::OverdueRow>,
}

#[derive(Debug, Serialize)]
pub struct MonthPoint {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    /// Trailing monthly series, gap-filled with zeros, oldest first.
    pub months: Vec<MonthPoint>,
    /// Projected next-month volume; absent when the series is unusable.
    pub forecast: Option<i64>,
}

// ==================== Routes ====================

pub fn analytics_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/resolution", get(get_resolution_report))
        .route("/resolution/histogram", get(get_resolution_histogram))
        .route("/overdue", get(get_overdue))
        .route("/forecast", get(get_forecast))
}

// ==================== Handlers ====================

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> ApiResult<Json<AnalyticsSummary>> {
    let snap = state.source.snapshot().await?;
    let pred = params.predicate();
    let tickets = snap.tickets.as_slice();

    let (total, open) = aggregate::total_and_open(tickets, &pred);
    let (expected_total, overdue_total) =
        aggregate::overdue_totals(tickets, &pred, &snap.ticket_types);

    Ok(Json(AnalyticsSummary {
        total,
        open,
        avg_resolution_hours: aggregate::avg_resolution_hours(tickets, &pred),
        avg_rating: aggregate::avg_rating(tickets, &pred, &snap.feedback),
        created_by_month: aggregate::created_by_month(tickets, &pred),
        resolved_by_month: aggregate::resolved_by_month(tickets, &pred),
        open_by_month: aggregate::open_by_month(tickets, &pred),
        avg_resolution_hours_by_month: aggregate::avg_resolution_hours_by_month(tickets, &pred),
        tickets_by_type: aggregate::tickets_by_type(tickets, &pred, &snap.ticket_types),
        tickets_by_priority: aggregate::tickets_by_priority(tickets, &pred),
        tickets_by_priority_status: aggregate::tickets_by_priority_status(tickets, &pred),
        expected_total,
        overdue_total,
    }))
}

async fn get_resolution_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> ApiResult<Json<ResolutionReport>> {
    let snap = state.source.snapshot().await?;
    let pred = params.predicate();

    Ok(Json(ResolutionReport {
        overall: aggregate::resolution_stats(&snap.tickets, &pred),
        by_priority: aggregate::resolution_stats_by_priority(&snap.tickets, &pred),
    }))
}

async fn get_resolution_histogram(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistogramQuery>,
) -> ApiResult<Json<Vec<HistogramBin>>> {
    let snap = state.source.snapshot().await?;
    let pred = params.filters.predicate();
    let preset = BinPreset::parse(params.bins.as_deref());

    Ok(Json(resolution_histogram(&snap.tickets, &pred, preset)))
}

async fn get_overdue(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverdueQuery>,
) -> ApiResult<Json<OverdueReport>> {
    let snap = state.source.snapshot().await?;
    let pred = params.filters.predicate();

    let limit = parse_number(params.limit.as_deref()).unwrap_or(50).max(0) as usize;
    let offset = parse_number(params.offset.as_deref()).unwrap_or(0).max(0) as usize;

    let (rows, total) = overdue::rank(
        &snap.tickets,
        &pred,
        &snap.ticket_types,
        &snap.clients,
        limit,
        offset,
    );
    Ok(Json(OverdueReport { total, rows }))
}

/// Number of trailing calendar months fed to the forecaster.
const FORECAST_WINDOW_MONTHS: usize = 11;

async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastQuery>,
) -> ApiResult<Json<ForecastReport>> {
    let snap = state.source.snapshot().await?;
    let pred = params.filters.predicate();

    let by_month = match params.series.as_deref().map(str::trim) {
        Some("resolved") => aggregate::resolved_by_month(&snap.tickets, &pred),
        _ => aggregate::created_by_month(&snap.tickets, &pred),
    };

    Ok(Json(build_forecast(
        &by_month,
        Utc::now(),
        FORECAST_WINDOW_MONTHS,
    )))
}

/// Zero-fill the trailing `window` calendar months ending at `now`'s month
/// and project the next one. The monthly maps omit empty months, but the
/// forecaster needs a gap-free chronological series.
fn build_forecast(
    by_month: &BTreeMap<String, i64>,
    now: DateTime<Utc>,
    window: usize,
) -> ForecastReport {
    let months: Vec<MonthPoint> = trailing_month_keys(now, window)
        .into_iter()
        .map(|month| {
            let count = by_month.get(&month).copied().unwrap_or(0);
            MonthPoint { month, count }
        })
        .collect();

    // Leading zero-months before the first real data point are padding, not
    // observations; feeding them in would fake a flat history.
    let series: Vec<f64> = months
        .iter()
        .skip_while(|p| p.count == 0)
        .map(|p| p.count as f64)
        .collect();

    ForecastReport {
        forecast: forecast_next(&series),
        months,
    }
}

/// The `window` month keys ending at `now`'s UTC month, oldest first.
fn trailing_month_keys(now: DateTime<Utc>, window: usize) -> Vec<String> {
    let mut year = now.year();
    let mut month = now.month() as i32;
    let mut keys = Vec::with_capacity(window);
    for _ in 0..window {
        keys.push(format!("{year:04}-{month:02}"));
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }
    keys.reverse();
    keys
}
