//! Constituent selection for a rebalancing date.
//!
//! Looks up the index membership in force on the as-of date, then drops
//! symbols whose price archive has no observation around that date.

use crate::domain::error::PortvalError;
use crate::domain::price::offset_date;
use crate::ports::price_port::PriceStore;
use crate::ports::reference_port::ReferenceTable;
use chrono::NaiveDate;
use std::collections::BTreeSet;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 60;
pub const DEFAULT_LOOKFORWARD_DAYS: i64 = 30;

/// A reference-table row: `symbol` is a member from `beg_date` onward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstituentRecord {
    pub beg_date: NaiveDate,
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct SelectorOptions {
    pub lookback_days: i64,
    pub lookforward_days: i64,
    /// Removed before the availability check.
    pub drop_symbols: Vec<String>,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            lookforward_days: DEFAULT_LOOKFORWARD_DAYS,
            drop_symbols: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    Unreadable(String),
    NoData,
    NoCoverage,
}

pub struct Selection {
    /// Sorted.
    pub symbols: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Latest reference `beg_date` on or before `as_of`.
pub fn effective_beg_date(records: &[ConstituentRecord], as_of: NaiveDate) -> Option<NaiveDate> {
    records
        .iter()
        .map(|r| r.beg_date)
        .filter(|d| *d <= as_of)
        .max()
}

/// Keep the symbols with at least one observation in
/// `[as_of - lookback, as_of + lookforward]`.
pub fn remove_unavailable(
    store: &dyn PriceStore,
    symbols: Vec<String>,
    as_of: NaiveDate,
    options: &SelectorOptions,
) -> Result<Selection, PortvalError> {
    let from = offset_date(as_of, options.lookback_days.saturating_neg())?;
    let to = offset_date(as_of, options.lookforward_days)?;
    let total = symbols.len();

    let mut kept = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        let reason = match store.fetch_series(&symbol) {
            Err(e) => Some(SkipReason::Unreadable(e.to_string())),
            Ok(series) if series.is_empty() => Some(SkipReason::NoData),
            Ok(series) if !series.has_observation_between(from, to) => Some(SkipReason::NoCoverage),
            Ok(_) => None,
        };
        match reason {
            None => kept.push(symbol),
            Some(reason) => {
                tracing::warn!(%symbol, ?reason, %from, %to, "skipping unavailable symbol");
                skipped.push(SkippedSymbol { symbol, reason });
            }
        }
    }

    tracing::info!(%as_of, chosen = kept.len(), total, "selected constituents");
    Ok(Selection {
        symbols: kept,
        skipped,
    })
}

pub fn select_constituents(
    table: &dyn ReferenceTable,
    store: &dyn PriceStore,
    as_of: NaiveDate,
    options: &SelectorOptions,
) -> Result<Selection, PortvalError> {
    let records = table.constituent_records()?;
    let beg_date =
        effective_beg_date(&records, as_of).ok_or(PortvalError::NoReferenceSnapshot { date: as_of })?;

    let members: BTreeSet<String> = records
        .into_iter()
        .filter(|r| r.beg_date == beg_date)
        .map(|r| r.symbol)
        .filter(|s| !options.drop_symbols.contains(s))
        .collect();

    remove_unavailable(store, members.into_iter().collect(), as_of, options)
}
