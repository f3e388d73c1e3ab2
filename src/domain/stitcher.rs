//! Multi-interval valuation: walks the rebalancing schedule, prices each
//! interval's basket and compounds the ending value into the next interval.

use crate::domain::error::PortvalError;
use crate::domain::exclusion::ExclusionRules;
use crate::domain::interval::{WeightMode, price_interval};
use crate::domain::price::offset_date;
use crate::domain::snapshot::RebalanceSnapshot;
use crate::domain::valuation::ValuationPoint;
use crate::ports::price_port::PriceStore;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// How the date shared by consecutive intervals appears in the stitched series.
///
/// The end of interval `i` is the start of interval `i + 1`, so each boundary
/// date is valued twice: once with the old basket (closing value) and once
/// with the new basket (opening value, equal to the closing value up to
/// rounding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Boundary date appears once, with the earlier interval's closing value.
    #[default]
    Deduplicate,
    /// Raw concatenation: boundary date appears twice.
    Duplicate,
}

impl FromStr for BoundaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dedupe" | "deduplicate" => Ok(BoundaryPolicy::Deduplicate),
            "duplicate" | "keep" => Ok(BoundaryPolicy::Duplicate),
            other => Err(format!("unknown boundary policy '{}'", other)),
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Deduplicate => write!(f, "dedupe"),
            BoundaryPolicy::Duplicate => write!(f, "duplicate"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StitchConfig {
    pub initial_value: f64,
    /// Length of the final interval, which has no next rebalancing date.
    pub out_of_sample_days: i64,
    pub weight_mode: WeightMode,
    pub boundary: BoundaryPolicy,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            initial_value: 1.0,
            out_of_sample_days: 30,
            weight_mode: WeightMode::Weighted,
            boundary: BoundaryPolicy::Deduplicate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_value: f64,
    pub end_value: f64,
    /// Symbols priced, sorted.
    pub holdings: Vec<String>,
    /// Symbols removed by exclusion rules.
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub points: Vec<ValuationPoint>,
    pub intervals: Vec<IntervalSummary>,
}

impl Valuation {
    pub fn dates(&self) -> Vec<NaiveDate> {
        crate::domain::valuation::dates(&self.points)
    }

    pub fn values(&self) -> Vec<f64> {
        crate::domain::valuation::values(&self.points)
    }

    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

/// End date of interval `index`.
pub fn interval_end(
    snapshots: &[RebalanceSnapshot],
    index: usize,
    out_of_sample_days: i64,
) -> Result<NaiveDate, PortvalError> {
    match snapshots.get(index + 1) {
        Some(next) => Ok(next.date),
        None => offset_date(snapshots[index].date, out_of_sample_days),
    }
}

/// Value the whole schedule. Any interval failure aborts the run.
pub fn stitch(
    store: &dyn PriceStore,
    snapshots: &[RebalanceSnapshot],
    rules: &ExclusionRules,
    config: &StitchConfig,
) -> Result<Valuation, PortvalError> {
    debug_assert!(snapshots.windows(2).all(|w| w[0].date < w[1].date));

    let mut points: Vec<ValuationPoint> = Vec::new();
    let mut intervals = Vec::with_capacity(snapshots.len());
    let mut start_value = config.initial_value;

    for (i, snapshot) in snapshots.iter().enumerate() {
        let start = snapshot.date;
        let end = interval_end(snapshots, i, config.out_of_sample_days)?;

        let (basket, excluded) = rules.apply(start, end, &snapshot.holdings);
        tracing::info!(
            %start,
            %end,
            holdings = basket.len(),
            excluded = excluded.len(),
            start_value,
            "processing interval"
        );
        if !excluded.is_empty() {
            tracing::debug!(%start, ?excluded, "exclusion rules removed symbols");
        }

        let valuation = price_interval(store, start, end, &basket, start_value, config.weight_mode)?;
        let end_value = valuation.end_value();

        let skip = match config.boundary {
            BoundaryPolicy::Deduplicate if i > 0 => 1,
            _ => 0,
        };
        points.extend(valuation.points.iter().skip(skip).copied());

        intervals.push(IntervalSummary {
            start,
            end,
            start_value,
            end_value,
            holdings: valuation.positions.iter().map(|p| p.symbol.clone()).collect(),
            excluded,
        });

        start_value = end_value;
    }

    Ok(Valuation { points, intervals })
}
