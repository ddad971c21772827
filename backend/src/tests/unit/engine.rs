//! Cross-module engine properties over the shared fixture dataset.

use std::collections::HashMap;

use triage_shared::TicketType;

use crate::engine::aggregate;
use crate::engine::filter::{normalize, normalize_assignee, FilterOp};
use crate::engine::histogram::{resolution_histogram, BinPreset};
use crate::engine::overdue;
use crate::engine::predicate::{compile, DateRange, FilterSet, TicketPredicate};
use crate::tests::fixtures;

fn everything() -> TicketPredicate {
    compile(DateRange::default(), FilterSet::default())
}

fn vals(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn type_lookup() -> HashMap<i64, TicketType> {
    fixtures::ticket_types().into_iter().map(|t| (t.id, t)).collect()
}

#[test]
fn test_fixture_totals_match_hand_count() {
    let tickets = fixtures::tickets();
    assert_eq!(aggregate::total_and_open(&tickets, &everything()), (10, 4));
}

#[test]
fn test_monthly_partition_sums_to_total_under_any_filter() {
    let tickets = fixtures::tickets();
    let cases = vec![
        FilterSet::default(),
        FilterSet {
            client: normalize(FilterOp::IsAnyOf, &vals(&["10"])),
            ..Default::default()
        },
        FilterSet {
            priority: normalize(FilterOp::IsNoneOf, &vals(&["high"])),
            assignee: normalize_assignee(FilterOp::IsAnyOf, &vals(&["none", "100"])),
            ..Default::default()
        },
    ];

    for filters in cases {
        let pred = compile(DateRange::default(), filters);
        let (total, _) = aggregate::total_and_open(&tickets, &pred);
        let by_month = aggregate::created_by_month(&tickets, &pred);
        assert_eq!(by_month.values().sum::<i64>(), total);
    }
}

#[test]
fn test_inclusion_and_exclusion_partition_the_population() {
    let tickets = fixtures::tickets();
    // Held-constant unassigned handling: the id-only exclusion keeps
    // unassigned tickets, the inclusion without `none` drops them, and the
    // two sides still cover the population exactly once.
    let include = compile(
        DateRange::default(),
        FilterSet {
            assignee: normalize_assignee(FilterOp::IsAnyOf, &vals(&["100", "200"])),
            ..Default::default()
        },
    );
    let exclude = compile(
        DateRange::default(),
        FilterSet {
            assignee: normalize_assignee(FilterOp::IsNoneOf, &vals(&["100", "200"])),
            ..Default::default()
        },
    );

    let n_in = tickets.iter().filter(|t| include.matches(t)).count();
    let n_out = tickets.iter().filter(|t| exclude.matches(t)).count();
    assert_eq!(n_in + n_out, tickets.len());
    // The three unassigned fixtures land on the exclusion side.
    assert_eq!(n_out, 3);
}

#[test]
fn test_histogram_total_equals_resolved_count_for_every_preset() {
    let tickets = fixtures::tickets();
    let date_limited = compile(
        DateRange {
            from: Some("2024-01-01".parse().unwrap()),
            to: Some("2024-02-28".parse().unwrap()),
        },
        FilterSet::default(),
    );

    for pred in [everything(), date_limited] {
        let resolved = tickets
            .iter()
            .filter(|t| pred.matches(t) && t.resolution_hours().is_some())
            .count() as i64;
        for preset in [BinPreset::Fine, BinPreset::Default, BinPreset::Coarse] {
            let bins = resolution_histogram(&tickets, &pred, preset);
            assert_eq!(bins.iter().map(|b| b.total).sum::<i64>(), resolved);
            assert_eq!(bins.len(), preset.labels().len());
        }
    }
}

#[test]
fn test_overdue_ranking_is_monotone_over_fixtures() {
    let tickets = fixtures::tickets();
    let clients = fixtures::clients().into_iter().map(|c| (c.id, c)).collect();
    let (rows, total) = overdue::rank(&tickets, &everything(), &type_lookup(), &clients, 50, 0);

    assert_eq!(total, 3);
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![4, 2, 9]);
    for pair in rows.windows(2) {
        assert!(pair[0].delta_hours >= pair[1].delta_hours);
        if pair[0].delta_hours == pair[1].delta_hours {
            assert!(pair[0].id > pair[1].id);
        }
    }
}

#[test]
fn test_overdue_totals_agree_with_ranker() {
    let tickets = fixtures::tickets();
    let clients = fixtures::clients().into_iter().map(|c| (c.id, c)).collect();

    let (expected, overdue_count) =
        aggregate::overdue_totals(&tickets, &everything(), &type_lookup());
    let (_, ranked_total) = overdue::rank(&tickets, &everything(), &type_lookup(), &clients, 1, 0);

    assert_eq!(expected, 6);
    assert_eq!(overdue_count, 3);
    assert_eq!(ranked_total, overdue_count);
}

#[test]
fn test_one_predicate_serves_every_aggregate_consistently() {
    let tickets = fixtures::tickets();
    let pred = compile(
        DateRange {
            from: Some("2024-01-01".parse().unwrap()),
            to: Some("2024-03-31".parse().unwrap()),
        },
        FilterSet {
            client: normalize(FilterOp::IsAnyOf, &vals(&["10"])),
            ..Default::default()
        },
    );

    let (total, open) = aggregate::total_and_open(&tickets, &pred);
    let created = aggregate::created_by_month(&tickets, &pred);
    let open_by_month = aggregate::open_by_month(&tickets, &pred);
    let by_priority = aggregate::tickets_by_priority(&tickets, &pred);

    assert_eq!(total, 6);
    assert_eq!(open, 3);
    assert_eq!(created.values().sum::<i64>(), total);
    assert_eq!(open_by_month.values().sum::<i64>(), open);
    assert_eq!(by_priority.iter().map(|k| k.count).sum::<i64>(), total);
}
