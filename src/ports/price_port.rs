//! Price store port trait.

use crate::domain::error::PortvalError;
use crate::domain::price::PriceSeries;

/// Keyed access to full daily price histories.
///
/// Implementations return series sorted ascending by date with unique dates.
/// `Sync` so a basket's symbols can be loaded concurrently.
pub trait PriceStore: Send + Sync {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, PortvalError>;
}
