//! Next-month volume forecasting.
//!
//! Holt's linear method (double exponential smoothing) over a short trailing
//! monthly series, with the smoothing pair chosen by grid search against the
//! historical one-step-ahead error. Pure and deterministic: the same series
//! always yields the same integer.

const ALPHA_GRID: [f64; 7] = [0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
const BETA_GRID: [f64; 5] = [0.1, 0.2, 0.3, 0.4, 0.5];

/// Forecast the next value of a chronological monthly series. `None` only
/// when the series has no usable points.
pub fn forecast_next(series: &[f64]) -> Option<i64> {
    let points: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();

    match points.len() {
        0 => None,
        // Too little history for trend estimation: repeat the latest point.
        1 | 2 => Some(round_non_negative(points[points.len() - 1])),
        _ => Some(round_non_negative(holt_grid_search(&points))),
    }
}

/// Run every (alpha, beta) pair, keep the one minimizing the summed squared
/// one-step errors, and return its final level + trend projection. Pairs that
/// go non-finite are skipped; if all do, fall back to the last observation.
fn holt_grid_search(points: &[f64]) -> f64 {
    let mut best: Option<(f64, f64)> = None; // (sse, forecast)

    for alpha in ALPHA_GRID {
        for beta in BETA_GRID {
            let Some((sse, forecast)) = holt_pass(points, alpha, beta) else {
                continue;
            };
            if best.map_or(true, |(best_sse, _)| sse < best_sse) {
                best = Some((sse, forecast));
            }
        }
    }

    best.map(|(_, forecast)| forecast)
        .unwrap_or(points[points.len() - 1])
}

/// One smoothing pass. Returns (sse, next-period forecast) or `None` if any
/// intermediate value is non-finite.
fn holt_pass(points: &[f64], alpha: f64, beta: f64) -> Option<(f64, f64)> {
    let mut level = points[0];
    let mut trend = points[1] - points[0];
    let mut sse = 0.0;

    for &x in &points[1..] {
        let predicted = level + trend;
        sse += (x - predicted) * (x - predicted);

        let next_level = alpha * x + (1.0 - alpha) * (level + trend);
        trend = beta * (next_level - level) + (1.0 - beta) * trend;
        level = next_level;

        if !level.is_finite() || !trend.is_finite() || !sse.is_finite() {
            return None;
        }
    }

    Some((sse, level + trend))
}

fn round_non_negative(value: f64) -> i64 {
    (value.round() as i64).max(0)
}
