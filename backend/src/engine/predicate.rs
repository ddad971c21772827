//! Predicate compilation.
//!
//! One request's date range and dimension filters are compiled once into a
//! [`TicketPredicate`] and that same predicate is reused across every
//! aggregate of the request, so sub-queries can never drift apart.

use chrono::{DateTime, NaiveDate, Utc};
use triage_shared::Ticket;

use super::filter::{AssigneeFilter, ValueFilter};

/// Inclusive calendar-day range in UTC. An unset side imposes no constraint;
/// a reversed range silently matches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    fn lower(&self) -> Option<DateTime<Utc>> {
        self.from
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    fn upper(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
            .map(|dt| dt.and_utc())
    }
}

/// The per-dimension filters of one request, already normalized. An absent
/// dimension contributes `true` to the conjunction.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub assignee: Option<AssigneeFilter>,
    pub client: Option<ValueFilter>,
    pub ticket_type: Option<ValueFilter>,
    pub priority: Option<ValueFilter>,
    pub status: Option<ValueFilter>,
}

/// Compiled boolean predicate over one ticket record.
#[derive(Debug, Clone)]
pub struct TicketPredicate {
    created_from: Option<DateTime<Utc>>,
    created_to: Option<DateTime<Utc>>,
    filters: FilterSet,
}

/// Compile a date range and filter set into a reusable predicate.
pub fn compile(range: DateRange, filters: FilterSet) -> TicketPredicate {
    TicketPredicate {
        created_from: range.lower(),
        created_to: range.upper(),
        filters,
    }
}

impl TicketPredicate {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(from) = self.created_from {
            if ticket.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if ticket.created_at > to {
                return false;
            }
        }

        if let Some(f) = &self.filters.assignee {
            if !assignee_clause(f, ticket.assigned_to) {
                return false;
            }
        }
        if !value_clause(&self.filters.client, Some(&ticket.client_id.to_string())) {
            return false;
        }
        if !value_clause(
            &self.filters.ticket_type,
            Some(&ticket.ticket_type_id.to_string()),
        ) {
            return false;
        }
        // Status and priority are defaulted before the membership test, so a
        // null-status ticket behaves as `open` under both polarities.
        if !value_clause(&self.filters.priority, Some(ticket.effective_priority())) {
            return false;
        }
        if !value_clause(&self.filters.status, Some(ticket.effective_status())) {
            return false;
        }

        true
    }
}

/// Membership clause for a non-assignee dimension. Inclusive: the value must
/// be in the set. Exclusive: null or not in the set.
fn value_clause(filter: &Option<ValueFilter>, value: Option<&str>) -> bool {
    let Some(f) = filter else { return true };
    match value {
        Some(v) => f.values.contains(v) != f.exclude,
        None => f.exclude,
    }
}

/// Assignee clause with the unassigned special case. Exclusion flips polarity
/// per component actually requested rather than negating the inclusive clause
/// wholesale: an id-only exclusion still matches unassigned tickets, while an
/// exclusion naming `none` matches only assigned ones.
fn assignee_clause(f: &AssigneeFilter, assigned_to: Option<i64>) -> bool {
    if !f.exclude {
        return match assigned_to {
            None => f.include_unassigned,
            Some(id) => f.ids.contains(&id),
        };
    }

    match assigned_to {
        None => !f.include_unassigned,
        Some(id) => {
            if f.include_unassigned && f.ids.is_empty() {
                // Excluding only "unassigned": any assignee matches.
                true
            } else {
                !f.ids.contains(&id)
            }
        }
    }
}
