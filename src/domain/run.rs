//! End-to-end valuation run: schedule → stitched series → comparison table.

use crate::domain::error::PortvalError;
use crate::domain::exclusion::ExclusionRules;
use crate::domain::snapshot::{WeightRecord, build_snapshots};
use crate::domain::stats::{StatsComparison, compare};
use crate::domain::stitcher::{StitchConfig, Valuation, stitch};
use crate::ports::price_port::PriceStore;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub stitch: StitchConfig,
    pub portfolio_label: String,
    /// Symbol of the benchmark series in the price store.
    pub benchmark: String,
    pub benchmark_label: String,
    /// Benchmark window length, anchored at the first rebalancing date.
    pub benchmark_days: i64,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub valuation: Valuation,
    pub comparison: StatsComparison,
}

pub fn run_valuation(
    store: &dyn PriceStore,
    records: &[WeightRecord],
    rules: &ExclusionRules,
    config: &RunConfig,
) -> Result<RunResult, PortvalError> {
    let snapshots = build_snapshots(records)?;
    tracing::info!(
        rebalances = snapshots.len(),
        first = %snapshots[0].date,
        rules = rules.len(),
        mode = %config.stitch.weight_mode,
        "starting valuation"
    );

    let valuation = stitch(store, &snapshots, rules, &config.stitch)?;

    let benchmark = store.fetch_series(&config.benchmark)?;
    let comparison = compare(
        &config.portfolio_label,
        &valuation.values(),
        &config.benchmark_label,
        &benchmark,
        snapshots[0].date,
        config.benchmark_days,
    )?;

    Ok(RunResult {
        valuation,
        comparison,
    })
}
