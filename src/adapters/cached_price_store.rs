//! Memoising wrapper around any [`PriceStore`].
//!
//! Consecutive intervals usually share most of their basket, so each symbol's
//! history is loaded from the backing store once per run.

use crate::domain::error::PortvalError;
use crate::domain::price::PriceSeries;
use crate::ports::price_port::PriceStore;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct CachedPriceStore<S> {
    inner: S,
    cache: Mutex<HashMap<String, PriceSeries>>,
}

impl<S: PriceStore> CachedPriceStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<S: PriceStore> PriceStore for CachedPriceStore<S> {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, PortvalError> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(series) = cache.get(symbol) {
                return Ok(series.clone());
            }
        }

        // Loaded outside the lock; a concurrent miss on the same symbol just loads twice.
        let series = self.inner.fetch_series(symbol)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(symbol.to_string(), series.clone());
        }
        Ok(series)
    }
}
