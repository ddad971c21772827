//! Multi-value filter normalization.
//!
//! Every filterable dimension (assignee, client, ticket type, priority,
//! status) accepts an operator plus a raw value list from the query string.
//! Normalization canonicalizes that pair before predicate compilation so the
//! rest of the engine only ever sees one shape.

use std::collections::BTreeSet;

/// Sentinel value meaning "no constraint on this dimension".
pub const VALUE_ANY: &str = "any";
/// Sentinel value meaning "the nullable foreign key is null" (assignee only).
pub const VALUE_NONE: &str = "none";

/// Filter operator as supplied by the caller. The singular forms are
/// one-element aliases of the plural ones; only the inclusion/exclusion
/// polarity matters after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    IsAnyOf,
    IsNoneOf,
    Is,
    IsNot,
}

impl FilterOp {
    /// Parse an operator token. Unknown operators degrade to `is_any_of`
    /// rather than rejecting the request.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("is_none_of") => Self::IsNoneOf,
            Some("is") => Self::Is,
            Some("is_not") => Self::IsNot,
            _ => Self::IsAnyOf,
        }
    }

    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::IsNoneOf | Self::IsNot)
    }
}

/// A normalized value filter: deduplicated non-empty values plus polarity.
/// `None` from [`normalize`] means the filter is absent and contributes no
/// predicate clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFilter {
    pub exclude: bool,
    pub values: BTreeSet<String>,
}

/// Normalized assignee filter. The `none` sentinel is split out so the
/// predicate can apply the unassigned special case; non-numeric or
/// non-positive id tokens are discarded silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeFilter {
    pub exclude: bool,
    pub include_unassigned: bool,
    pub ids: BTreeSet<i64>,
}

fn clean(raw_values: &[String]) -> Option<BTreeSet<String>> {
    let values: BTreeSet<String> = raw_values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    // Absence takes priority over everything else, operator included.
    if values.is_empty() || values.contains(VALUE_ANY) {
        return None;
    }
    Some(values)
}

/// Normalize a generic dimension filter (client, ticket type, priority,
/// status).
pub fn normalize(op: FilterOp, raw_values: &[String]) -> Option<ValueFilter> {
    let values = clean(raw_values)?;
    Some(ValueFilter {
        exclude: op.is_exclusive(),
        values,
    })
}

/// Normalize the assignee filter, extracting the unassigned sentinel and
/// parsing the remaining tokens as positive integer ids.
pub fn normalize_assignee(op: FilterOp, raw_values: &[String]) -> Option<AssigneeFilter> {
    let values = clean(raw_values)?;

    let include_unassigned = values.contains(VALUE_NONE);
    let ids: BTreeSet<i64> = values
        .iter()
        .filter_map(|v| v.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .collect();

    if !include_unassigned && ids.is_empty() {
        // Nothing usable survived parsing; treat as absent.
        return None;
    }

    Some(AssigneeFilter {
        exclude: op.is_exclusive(),
        include_unassigned,
        ids,
    })
}
