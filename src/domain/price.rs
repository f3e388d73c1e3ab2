//! Daily price history for a single symbol.

use crate::domain::error::PortvalError;
use chrono::{NaiveDate, TimeDelta};

/// `date + days` (negative `days` steps back), or `DateOverflow` when the
/// result falls off the calendar.
pub fn offset_date(date: NaiveDate, days: i64) -> Result<NaiveDate, PortvalError> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(PortvalError::DateOverflow { date, days })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Ordered (date, price) observations for one symbol.
///
/// Sorted ascending by date with no duplicate dates; every price is positive
/// and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting the observations by date.
    ///
    /// Fails on duplicate dates or on a price that is not a positive finite number.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self, PortvalError> {
        let symbol = symbol.into();
        points.sort_by_key(|p| p.date);

        if let Some(w) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(PortvalError::InvalidPriceData {
                symbol,
                reason: format!("duplicate date {}", w[0].date),
            });
        }
        if let Some(p) = points.iter().find(|p| !(p.price.is_finite() && p.price > 0.0)) {
            return Err(PortvalError::InvalidPriceData {
                symbol,
                reason: format!("price {} on {} is not positive", p.price, p.date),
            });
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observations with `start <= date <= end`.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> &[PricePoint] {
        let lo = self.points.partition_point(|p| p.date < start);
        let hi = self.points.partition_point(|p| p.date <= end);
        &self.points[lo..hi.max(lo)]
    }

    pub fn has_observation_between(&self, start: NaiveDate, end: NaiveDate) -> bool {
        !self.window(start, end).is_empty()
    }
}
