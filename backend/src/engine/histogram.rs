//! Resolution-time histogram with fixed bin presets.
//!
//! Bin boundaries are presets, not data-driven: charts stay comparable across
//! requests, and every bin of the chosen preset appears in the output in its
//! declared order even when empty.

use serde::Serialize;
use triage_shared::Ticket;

use super::predicate::TicketPredicate;

/// One of the three fixed bin-boundary presets over resolution hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinPreset {
    Fine,
    Default,
    Coarse,
}

impl BinPreset {
    /// Parse a preset selector; anything unrecognized degrades to `Default`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("fine") => Self::Fine,
            Some("coarse") => Self::Coarse,
            _ => Self::Default,
        }
    }

    /// Upper bounds of all but the last, open-ended bin.
    fn upper_bounds(self) -> &'static [f64] {
        match self {
            Self::Fine => &[0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 24.0],
            Self::Default => &[1.0, 2.0, 4.0, 8.0, 16.0],
            Self::Coarse => &[2.0, 8.0, 16.0],
        }
    }

    /// Stable display keys, one per bin, in ascending bin order. Ties are
    /// never resolved by sorting these strings; the vector index is the order.
    pub fn labels(self) -> Vec<String> {
        let bounds = self.upper_bounds();
        let mut labels = Vec::with_capacity(bounds.len() + 1);
        let mut lower = 0.0;
        for upper in bounds {
            labels.push(format!("{}-{}h", fmt_hours(lower), fmt_hours(*upper)));
            lower = *upper;
        }
        labels.push(format!("{}h+", fmt_hours(lower)));
        labels
    }

    fn bin_count(self) -> usize {
        self.upper_bounds().len() + 1
    }

    /// Index of the first bin whose upper bound exceeds `hours`; the last bin
    /// catches everything else.
    fn bin_index(self, hours: f64) -> usize {
        let bounds = self.upper_bounds();
        bounds
            .iter()
            .position(|upper| hours < *upper)
            .unwrap_or(bounds.len())
    }
}

fn fmt_hours(h: f64) -> String {
    if h.fract() == 0.0 {
        format!("{}", h as i64)
    } else {
        format!("{h}")
    }
}

/// One histogram row: total plus per-priority sub-counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub bin: String,
    pub total: i64,
    pub urgent: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
    pub unknown: i64,
}

impl HistogramBin {
    fn empty(label: String) -> Self {
        Self {
            bin: label,
            total: 0,
            urgent: 0,
            high: 0,
            medium: 0,
            low: 0,
            unknown: 0,
        }
    }

    fn bump(&mut self, priority: &str) {
        self.total += 1;
        match priority {
            "urgent" => self.urgent += 1,
            "high" => self.high += 1,
            "medium" => self.medium += 1,
            "low" => self.low += 1,
            _ => self.unknown += 1,
        }
    }
}

/// Bucket every matching resolved ticket's resolution hours into the preset's
/// bins, zero-filling empty bins.
pub fn resolution_histogram(
    tickets: &[Ticket],
    pred: &TicketPredicate,
    preset: BinPreset,
) -> Vec<HistogramBin> {
    let mut bins: Vec<HistogramBin> = preset
        .labels()
        .into_iter()
        .map(HistogramBin::empty)
        .collect();
    debug_assert_eq!(bins.len(), preset.bin_count());

    for t in tickets.iter().filter(|t| pred.matches(t)) {
        let Some(hours) = t.resolution_hours().filter(|h| h.is_finite()) else {
            continue;
        };
        bins[preset.bin_index(hours)].bump(t.effective_priority());
    }
    bins
}
