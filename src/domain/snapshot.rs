//! Rebalancing schedule: weight-table records grouped into dated baskets.

use crate::domain::error::PortvalError;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One row of the input weight table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRecord {
    pub date: NaiveDate,
    pub stock: String,
    pub allocation: f64,
}

/// A basket member and its raw (unnormalised) allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub allocation: f64,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, allocation: f64) -> Self {
        Self {
            symbol: symbol.into(),
            allocation,
        }
    }
}

/// Holdings active from `date` until the next rebalancing date.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceSnapshot {
    pub date: NaiveDate,
    /// Sorted by symbol, unique.
    pub holdings: Vec<Holding>,
}

impl RebalanceSnapshot {
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.holdings.iter().map(|h| h.symbol.as_str())
    }
}

/// Group weight records by date into snapshots sorted ascending.
pub fn build_snapshots(records: &[WeightRecord]) -> Result<Vec<RebalanceSnapshot>, PortvalError> {
    if records.is_empty() {
        return Err(PortvalError::EmptyWeightTable);
    }

    let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
    for record in records {
        if !(record.allocation.is_finite() && record.allocation >= 0.0) {
            return Err(PortvalError::InvalidAllocation {
                stock: record.stock.clone(),
                date: record.date,
                allocation: record.allocation,
            });
        }
        let basket = by_date.entry(record.date).or_default();
        if basket.insert(record.stock.clone(), record.allocation).is_some() {
            return Err(PortvalError::DuplicateHolding {
                stock: record.stock.clone(),
                date: record.date,
            });
        }
    }

    Ok(by_date
        .into_iter()
        .map(|(date, basket)| RebalanceSnapshot {
            date,
            holdings: basket
                .into_iter()
                .map(|(symbol, allocation)| Holding { symbol, allocation })
                .collect(),
        })
        .collect())
}
