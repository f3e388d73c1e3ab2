//! Daily return statistics and the portfolio-versus-benchmark comparison.

use crate::domain::error::PortvalError;
use crate::domain::price::{PriceSeries, offset_date};
use chrono::NaiveDate;

/// A sample standard deviation needs at least this many returns.
pub const MIN_RETURNS_FOR_STD: usize = 2;

/// `(v[k] - v[k-1]) / v[k-1]` for `k >= 1`. The first point has no return.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Return statistics in percent. A statistic the series is too short to
/// define is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStats {
    /// Number of daily returns (one fewer than values).
    pub returns: usize,
    pub mean_daily_return_pct: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std_daily_return_pct: Option<f64>,
    pub total_return_pct: Option<f64>,
}

impl ReturnStats {
    pub fn compute(values: &[f64]) -> Self {
        let returns = daily_returns(values);
        let n = returns.len() as f64;

        let mean = (!returns.is_empty()).then(|| returns.iter().sum::<f64>() / n);
        let std = mean.filter(|_| returns.len() >= MIN_RETURNS_FOR_STD).map(|mean| {
            let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        });
        let total = match (values.first(), values.last()) {
            (Some(&first), Some(&last)) if values.len() > 1 => Some((last - first) / first),
            _ => None,
        };

        ReturnStats {
            returns: returns.len(),
            mean_daily_return_pct: mean.map(|m| 100.0 * m),
            std_daily_return_pct: std.map(|s| 100.0 * s),
            total_return_pct: total.map(|t| 100.0 * t),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.mean_daily_return_pct.is_some() && self.std_daily_return_pct.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub label: String,
    pub mean_daily_return_pct: Option<f64>,
    pub std_daily_return_pct: Option<f64>,
}

impl ComparisonRow {
    pub fn new(label: impl Into<String>, stats: &ReturnStats) -> Self {
        Self {
            label: label.into(),
            mean_daily_return_pct: stats.mean_daily_return_pct,
            std_daily_return_pct: stats.std_daily_return_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsComparison {
    pub rows: Vec<ComparisonRow>,
}

/// Benchmark prices with `first_date <= date <= first_date + days`.
///
/// The window is anchored at the first rebalancing date, not the full
/// multi-interval horizon.
pub fn benchmark_window(
    benchmark: &PriceSeries,
    first_date: NaiveDate,
    days: i64,
) -> Result<Vec<f64>, PortvalError> {
    let end = offset_date(first_date, days)?;
    Ok(benchmark
        .window(first_date, end)
        .iter()
        .map(|p| p.price)
        .collect())
}

fn row(label: &str, values: &[f64]) -> ComparisonRow {
    let stats = ReturnStats::compute(values);
    if !stats.is_complete() {
        tracing::warn!(
            series = label,
            returns = stats.returns,
            "too few returns, statistics left undefined"
        );
    }
    ComparisonRow::new(label, &stats)
}

/// Compare the portfolio's values against the benchmark restricted to its window.
pub fn compare(
    portfolio_label: &str,
    portfolio_values: &[f64],
    benchmark_label: &str,
    benchmark: &PriceSeries,
    first_date: NaiveDate,
    benchmark_days: i64,
) -> Result<StatsComparison, PortvalError> {
    let bench_values = benchmark_window(benchmark, first_date, benchmark_days)?;

    Ok(StatsComparison {
        rows: vec![
            row(portfolio_label, portfolio_values),
            row(benchmark_label, &bench_values),
        ],
    })
}
