//! Buy-and-hold valuation of one basket over one rebalancing interval.
//!
//! Share counts are fixed on the interval's first day from the target weights
//! and the starting capital. Every calendar day in `[start, end]` is valued;
//! days without an observation take the last known price (forward fill), and
//! days before a symbol's first observation in the window take that first
//! price (backward fill).

use crate::domain::error::PortvalError;
use crate::domain::price::PriceSeries;
use crate::domain::snapshot::Holding;
use crate::domain::valuation::ValuationPoint;
use crate::ports::price_port::PriceStore;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightMode {
    /// Every holding gets `1 / n`.
    Equal,
    /// Allocations divided by their sum over the basket.
    #[default]
    Weighted,
}

impl FromStr for WeightMode {
    type Err = std::convert::Infallible;

    /// `equal` selects equal weights; any other value means weighted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("equal") {
            Ok(WeightMode::Equal)
        } else {
            Ok(WeightMode::Weighted)
        }
    }
}

impl fmt::Display for WeightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightMode::Equal => write!(f, "equal"),
            WeightMode::Weighted => write!(f, "weighted"),
        }
    }
}

/// Share count for one basket member, fixed for the whole interval.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSize {
    pub symbol: String,
    pub weight: f64,
    pub start_price: f64,
    pub shares: f64,
}

impl PositionSize {
    /// Capital allocated on the first day.
    pub fn start_value(&self) -> f64 {
        self.shares * self.start_price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalValuation {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_value: f64,
    /// Ordered by symbol.
    pub positions: Vec<PositionSize>,
    /// One point per calendar day, ascending.
    pub points: Vec<ValuationPoint>,
}

impl IntervalValuation {
    pub fn end_value(&self) -> f64 {
        self.points.last().map(|p| p.value).unwrap_or(self.start_value)
    }
}

/// Every calendar day from `start` to `end` inclusive.
pub fn dense_axis(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Align `series` onto the dense axis `[start, end]`, forward filling first and
/// backward filling any leading gap.
pub fn align_prices(
    series: &PriceSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<f64>, PortvalError> {
    let window = series.window(start, end);
    if window.is_empty() {
        return Err(PortvalError::NoPriceData {
            symbol: series.symbol().to_string(),
            start,
            end,
        });
    }

    let days = (end - start).num_days() as usize + 1;
    let mut cells: Vec<Option<f64>> = vec![None; days];
    for point in window {
        cells[(point.date - start).num_days() as usize] = Some(point.price);
    }

    let mut last = None;
    for cell in cells.iter_mut() {
        if cell.is_some() {
            last = *cell;
        } else {
            *cell = last;
        }
    }

    let first = window[0].price;
    let filled = days - window.len();
    if filled > 0 {
        tracing::debug!(symbol = series.symbol(), filled, "filled missing prices");
    }
    Ok(cells.into_iter().map(|c| c.unwrap_or(first)).collect())
}

/// Target weights for the basket, in holding order. Weighted mode
/// renormalises over whatever holdings remain after exclusions.
pub fn normalized_weights(
    holdings: &[Holding],
    mode: WeightMode,
    start: NaiveDate,
) -> Result<Vec<f64>, PortvalError> {
    if holdings.is_empty() {
        return Err(PortvalError::EmptyBasket { date: start });
    }
    match mode {
        WeightMode::Equal => {
            let w = 1.0 / holdings.len() as f64;
            Ok(vec![w; holdings.len()])
        }
        WeightMode::Weighted => {
            let total: f64 = holdings.iter().map(|h| h.allocation).sum();
            if total <= 0.0 {
                return Err(PortvalError::ZeroAllocation { date: start });
            }
            Ok(holdings.iter().map(|h| h.allocation / total).collect())
        }
    }
}

/// Value a basket whose price histories are already loaded. `series[i]`
/// belongs to `holdings[i]`.
pub fn value_interval(
    start: NaiveDate,
    end: NaiveDate,
    holdings: &[Holding],
    series: &[PriceSeries],
    start_value: f64,
    mode: WeightMode,
) -> Result<IntervalValuation, PortvalError> {
    debug_assert_eq!(holdings.len(), series.len());
    let weights = normalized_weights(holdings, mode, start)?;
    let axis = dense_axis(start, end);

    let mut values = vec![0.0_f64; axis.len()];
    let mut positions = Vec::with_capacity(holdings.len());

    for ((holding, prices), weight) in holdings.iter().zip(series).zip(weights) {
        let aligned = align_prices(prices, start, end)?;
        let start_price = aligned[0];
        let shares = weight * start_value / start_price;

        for (total, price) in values.iter_mut().zip(&aligned) {
            *total += shares * price;
        }

        positions.push(PositionSize {
            symbol: holding.symbol.clone(),
            weight,
            start_price,
            shares,
        });
    }

    let points = axis
        .into_iter()
        .zip(values)
        .map(|(date, value)| ValuationPoint { date, value })
        .collect();

    Ok(IntervalValuation {
        start,
        end,
        start_value,
        positions,
        points,
    })
}

/// Load each holding's price history from `store` and value the basket over
/// `[start, end]`.
pub fn price_interval(
    store: &dyn PriceStore,
    start: NaiveDate,
    end: NaiveDate,
    holdings: &[Holding],
    start_value: f64,
    mode: WeightMode,
) -> Result<IntervalValuation, PortvalError> {
    let mut basket = holdings.to_vec();
    basket.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    let series = load_basket(store, &basket)?;
    value_interval(start, end, &basket, &series, start_value, mode)
}

#[cfg(not(feature = "parallel"))]
fn load_basket(store: &dyn PriceStore, holdings: &[Holding]) -> Result<Vec<PriceSeries>, PortvalError> {
    holdings
        .iter()
        .map(|h| store.fetch_series(&h.symbol))
        .collect()
}

#[cfg(feature = "parallel")]
fn load_basket(store: &dyn PriceStore, holdings: &[Holding]) -> Result<Vec<PriceSeries>, PortvalError> {
    use rayon::prelude::*;

    // Indexed collect keeps holding order regardless of completion order.
    holdings
        .par_iter()
        .map(|h| store.fetch_series(&h.symbol))
        .collect()
}
