//! Filtered aggregate computations.
//!
//! Every function here is a pure, deterministic fold over the ticket slice
//! with the compiled predicate applied uniformly; nothing is mutated and an
//! empty matching set always yields zero/empty results rather than an error.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use triage_shared::{Feedback, Ticket, TicketType};

use super::predicate::TicketPredicate;

/// One grouped-count entry, ordered by the producing function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: i64,
}

/// One (priority, status) cross-tab cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityStatusCount {
    pub priority: String,
    pub status: String,
    pub count: i64,
}

/// min/max/mean/median over a resolution-hour population.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStats {
    pub count: i64,
    pub min_hours: f64,
    pub max_hours: f64,
    pub mean_hours: f64,
    pub median_hours: f64,
}

/// Matching-ticket count and the subset still unresolved.
pub fn total_and_open(tickets: &[Ticket], pred: &TicketPredicate) -> (i64, i64) {
    let mut total = 0;
    let mut open = 0;
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        total += 1;
        if !t.is_resolved() {
            open += 1;
        }
    }
    (total, open)
}

/// Matching tickets grouped by creation month. Months with zero matches are
/// omitted; callers fill gaps over their own requested range.
pub fn created_by_month(tickets: &[Ticket], pred: &TicketPredicate) -> BTreeMap<String, i64> {
    let mut by_month = BTreeMap::new();
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        *by_month.entry(t.created_month()).or_insert(0) += 1;
    }
    by_month
}

/// Matching resolved tickets grouped by resolution month.
pub fn resolved_by_month(tickets: &[Ticket], pred: &TicketPredicate) -> BTreeMap<String, i64> {
    let mut by_month = BTreeMap::new();
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        if let Some(month) = t.resolved_month() {
            *by_month.entry(month).or_insert(0) += 1;
        }
    }
    by_month
}

/// Matching still-open tickets grouped by creation month.
pub fn open_by_month(tickets: &[Ticket], pred: &TicketPredicate) -> BTreeMap<String, i64> {
    let mut by_month = BTreeMap::new();
    for t in tickets.iter().filter(|t| pred.matches(t) && !t.is_resolved()) {
        *by_month.entry(t.created_month()).or_insert(0) += 1;
    }
    by_month
}

/// Arithmetic mean of resolution hours over matching resolved tickets.
pub fn avg_resolution_hours(tickets: &[Ticket], pred: &TicketPredicate) -> Option<f64> {
    let hours: Vec<f64> = matching_resolution_hours(tickets, pred);
    mean(&hours)
}

/// Per-month mean resolution hours, keyed by resolution month.
pub fn avg_resolution_hours_by_month(
    tickets: &[Ticket],
    pred: &TicketPredicate,
) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, i64)> = BTreeMap::new();
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        if let (Some(month), Some(hours)) = (t.resolved_month(), t.resolution_hours()) {
            let entry = sums.entry(month).or_insert((0.0, 0));
            entry.0 += hours;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(month, (sum, n))| (month, sum / n as f64))
        .collect()
}

/// Overall resolution-hour statistics for matching resolved tickets.
pub fn resolution_stats(tickets: &[Ticket], pred: &TicketPredicate) -> Option<ResolutionStats> {
    stats_of(matching_resolution_hours(tickets, pred))
}

/// Resolution-hour statistics split by effective priority.
pub fn resolution_stats_by_priority(
    tickets: &[Ticket],
    pred: &TicketPredicate,
) -> BTreeMap<String, ResolutionStats> {
    let mut by_priority: HashMap<&str, Vec<f64>> = HashMap::new();
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        if let Some(hours) = t.resolution_hours().filter(|h| h.is_finite()) {
            by_priority.entry(t.effective_priority()).or_default().push(hours);
        }
    }
    by_priority
        .into_iter()
        .filter_map(|(priority, hours)| stats_of(hours).map(|s| (priority.to_string(), s)))
        .collect()
}

/// Matching tickets grouped by ticket-type name, descending by count with
/// ascending-key tie break. Tickets whose type is missing from the lookup
/// are excluded rather than shown with a blank label.
pub fn tickets_by_type(
    tickets: &[Ticket],
    pred: &TicketPredicate,
    types: &HashMap<i64, TicketType>,
) -> Vec<KeyCount> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        if let Some(ty) = types.get(&t.ticket_type_id) {
            *counts.entry(ty.name.as_str()).or_insert(0) += 1;
        }
    }
    ranked(counts)
}

/// Matching tickets grouped by effective priority, descending by count.
pub fn tickets_by_priority(tickets: &[Ticket], pred: &TicketPredicate) -> Vec<KeyCount> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        *counts.entry(t.effective_priority()).or_insert(0) += 1;
    }
    ranked(counts)
}

/// (priority, open|resolved) cross-tab, ascending by priority then status.
pub fn tickets_by_priority_status(
    tickets: &[Ticket],
    pred: &TicketPredicate,
) -> Vec<PriorityStatusCount> {
    let mut counts: BTreeMap<(&str, &str), i64> = BTreeMap::new();
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        let status = if t.is_resolved() { "resolved" } else { "open" };
        *counts.entry((t.effective_priority(), status)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((priority, status), count)| PriorityStatusCount {
            priority: priority.to_string(),
            status: status.to_string(),
            count,
        })
        .collect()
}

/// Overdue aggregate numbers: (tickets with a type baseline, subset whose
/// actual hours strictly exceed the baseline).
pub fn overdue_totals(
    tickets: &[Ticket],
    pred: &TicketPredicate,
    types: &HashMap<i64, TicketType>,
) -> (i64, i64) {
    let mut expected = 0;
    let mut overdue = 0;
    for t in tickets.iter().filter(|t| pred.matches(t)) {
        let Some(actual) = t.resolution_hours() else { continue };
        let Some(baseline) = types.get(&t.ticket_type_id).and_then(|ty| ty.avg_resolution_hours)
        else {
            continue;
        };
        expected += 1;
        if actual > baseline as f64 {
            overdue += 1;
        }
    }
    (expected, overdue)
}

/// Mean feedback rating over feedback rows whose ticket matches.
pub fn avg_rating(
    tickets: &[Ticket],
    pred: &TicketPredicate,
    feedback: &[Feedback],
) -> Option<f64> {
    let matching: HashSet<i64> = tickets
        .iter()
        .filter(|t| pred.matches(t))
        .map(|t| t.id)
        .collect();
    let ratings: Vec<f64> = feedback
        .iter()
        .filter(|f| matching.contains(&f.ticket_id))
        .map(|f| f.rating as f64)
        .collect();
    mean(&ratings)
}

/// `percentile_cont` order statistic: linear interpolation between the two
/// nearest ranks of an ascending-sorted slice, not nearest-rank.
pub fn percentile_cont(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let weight = rank - lo as f64;
    Some(sorted[lo] * (1.0 - weight) + sorted[hi] * weight)
}

fn matching_resolution_hours(tickets: &[Ticket], pred: &TicketPredicate) -> Vec<f64> {
    tickets
        .iter()
        .filter(|t| pred.matches(t))
        .filter_map(|t| t.resolution_hours())
        .filter(|h| h.is_finite())
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn stats_of(mut hours: Vec<f64>) -> Option<ResolutionStats> {
    if hours.is_empty() {
        return None;
    }
    hours.sort_by(|a, b| a.total_cmp(b));
    Some(ResolutionStats {
        count: hours.len() as i64,
        min_hours: hours[0],
        max_hours: hours[hours.len() - 1],
        mean_hours: mean(&hours)?,
        median_hours: percentile_cont(&hours, 0.5)?,
    })
}

fn ranked(counts: BTreeMap<&str, i64>) -> Vec<KeyCount> {
    let mut out: Vec<KeyCount> = counts
        .into_iter()
        .map(|(key, count)| KeyCount {
            key: key.to_string(),
            count,
        })
        .collect();
    // Descending by count; the BTreeMap already yields ascending keys, and
    // the stable sort preserves that order for ties.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
