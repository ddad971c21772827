//! End-to-end checks of the analytics endpoints against the fixture dataset.

use axum::http::StatusCode;
use serde_json::Value;

use super::get_json;

#[tokio::test]
async fn test_summary_unfiltered() {
    let (status, body) = get_json("/api/v1/analytics/summary").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["total"], 10);
    assert_eq!(body["open"], 4);
    assert_eq!(body["expectedTotal"], 6);
    assert_eq!(body["overdueTotal"], 3);

    // Resolved hours: 2, 6, 30, 20, 1, 5.
    let avg = body["avgResolutionHours"].as_f64().unwrap();
    assert!((avg - 64.0 / 6.0).abs() < 1e-9);
    assert_eq!(body["avgRating"].as_f64().unwrap(), 4.0);

    assert_eq!(body["createdByMonth"]["2024-01"], 3);
    assert_eq!(body["createdByMonth"]["2024-02"], 3);
    assert_eq!(body["createdByMonth"]["2024-03"], 4);
}

#[tokio::test]
async fn test_summary_breakdowns_sum_to_total() {
    let (_, body) = get_json("/api/v1/analytics/summary").await;

    let total = body["total"].as_i64().unwrap();
    let by_priority: i64 = body["ticketsByPriority"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["count"].as_i64().unwrap())
        .sum();
    assert_eq!(by_priority, total);

    // Ticket 6 has no explicit priority and surfaces under `unknown`.
    assert!(body["ticketsByPriority"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["key"] == "unknown" && e["count"] == 1));
}

#[tokio::test]
async fn test_summary_filtered_by_client() {
    let (status, body) = get_json("/api/v1/analytics/summary?client=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 6);
    assert_eq!(body["open"], 3);
}

#[tokio::test]
async fn test_summary_with_date_range() {
    let (_, body) =
        get_json("/api/v1/analytics/summary?from_date=2024-02-01&to_date=2024-02-28").await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["createdByMonth"]["2024-02"], 3);
    assert!(body["createdByMonth"].get("2024-01").is_none());
}

#[tokio::test]
async fn test_summary_malformed_filters_degrade() {
    // Bad dates and a nonsense operator must not reject the request.
    let (status, body) =
        get_json("/api/v1/analytics/summary?from_date=soon&priority_op=looks_like&assignee=x,y")
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 10);
}

#[tokio::test]
async fn test_summary_unassigned_filter() {
    let (_, body) = get_json("/api/v1/analytics/summary?assignee=none").await;
    // Tickets 3, 7, 8 carry no assignee.
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_resolution_report() {
    let (status, body) = get_json("/api/v1/analytics/resolution").await;
    assert_eq!(status, StatusCode::OK);

    let overall = &body["overall"];
    assert_eq!(overall["count"], 6);
    assert_eq!(overall["minHours"].as_f64().unwrap(), 1.0);
    assert_eq!(overall["maxHours"].as_f64().unwrap(), 30.0);
    // Sorted hours 1, 2, 5, 6, 20, 30 interpolate to 5.5 at the midpoint.
    assert!((overall["medianHours"].as_f64().unwrap() - 5.5).abs() < 1e-9);

    assert!(body["byPriority"].get("high").is_some());
    assert!(body["byPriority"].get("unknown").is_none());
}

#[tokio::test]
async fn test_resolution_histogram_default_preset() {
    let (status, body) = get_json("/api/v1/analytics/resolution/histogram").await;
    assert_eq!(status, StatusCode::OK);

    let bins = body.as_array().unwrap();
    let labels: Vec<&str> = bins.iter().map(|b| b["bin"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["0-1h", "1-2h", "2-4h", "4-8h", "8-16h", "16h+"]);

    let totals: Vec<i64> = bins.iter().map(|b| b["total"].as_i64().unwrap()).collect();
    assert_eq!(totals, vec![0, 1, 1, 2, 0, 2]);
}

#[tokio::test]
async fn test_resolution_histogram_unknown_preset_falls_back() {
    let (_, body) = get_json("/api/v1/analytics/resolution/histogram?bins=tiny").await;
    assert_eq!(body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_resolution_histogram_coarse_preset() {
    let (_, body) = get_json("/api/v1/analytics/resolution/histogram?bins=coarse").await;
    let totals: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["total"].as_i64().unwrap())
        .collect();
    // Hour 1 sits under 2h; 2, 5 and 6 under 8h; 20 and 30 spill into 16h+.
    assert_eq!(totals, vec![1, 3, 0, 2]);
}

#[tokio::test]
async fn test_overdue_report_order_and_total() {
    let (status, body) = get_json("/api/v1/analytics/overdue").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["total"], 3);
    let rows = body["rows"].as_array().unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![4, 2, 9]);

    let top = &rows[0];
    assert_eq!(top["clientName"], "Globex");
    assert_eq!(top["ticketType"], "Request");
    assert_eq!(top["expectedHours"], 24);
    assert_eq!(top["deltaHours"].as_f64().unwrap(), 6.0);
}

#[tokio::test]
async fn test_overdue_report_pagination() {
    let (_, body) = get_json("/api/v1/analytics/overdue?limit=1&offset=1").await;
    assert_eq!(body["total"], 3);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 2);
}

#[tokio::test]
async fn test_overdue_report_bad_limit_degrades() {
    let (status, body) = get_json("/api/v1/analytics/overdue?limit=lots").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_forecast_window_shape() {
    let (status, body) = get_json("/api/v1/analytics/forecast").await;
    assert_eq!(status, StatusCode::OK);

    let months = body["months"].as_array().unwrap();
    assert_eq!(months.len(), 11);
    for pair in months.windows(2) {
        assert!(pair[0]["month"].as_str().unwrap() < pair[1]["month"].as_str().unwrap());
    }

    // The fixtures live in 2024, far outside the trailing window, so the
    // series is empty and no projection is produced.
    let counts: i64 = months.iter().map(|m| m["count"].as_i64().unwrap()).sum();
    assert_eq!(counts, 0);
    assert_eq!(body["forecast"], Value::Null);
}

#[tokio::test]
async fn test_forecast_accepts_series_choice() {
    let (status, body) = get_json("/api/v1/analytics/forecast?series=resolved").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["months"].as_array().unwrap().len(), 11);
}
