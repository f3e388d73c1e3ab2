#![allow(dead_code)]

use chrono::NaiveDate;
use portval::domain::error::PortvalError;
use portval::domain::price::{PricePoint, PriceSeries};
use portval::domain::snapshot::WeightRecord;
use portval::ports::price_port::PriceStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockPriceStore {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
    pub fetches: AtomicUsize,
}

impl MockPriceStore {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: &[(&str, f64)]) -> Self {
        let points = prices
            .iter()
            .map(|&(d, price)| PricePoint {
                date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
                price,
            })
            .collect();
        self.data
            .insert(symbol.to_string(), PriceSeries::new(symbol, points).unwrap());
        self
    }

    /// Daily prices `start_price, start_price + step, ...` for `count` days.
    pub fn with_ramp(mut self, symbol: &str, start: &str, count: usize, start_price: f64, step: f64) -> Self {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        let points = (0..count)
            .map(|i| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                price: start_price + step * i as f64,
            })
            .collect();
        self.data
            .insert(symbol.to_string(), PriceSeries::new(symbol, points).unwrap());
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl PriceStore for MockPriceStore {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, PortvalError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PortvalError::DataAccess {
                reason: reason.clone(),
            });
        }
        self.data.get(symbol).cloned().ok_or_else(|| PortvalError::NoData {
            symbol: symbol.to_string(),
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn weight(d: &str, stock: &str, allocation: f64) -> WeightRecord {
    WeightRecord {
        date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
        stock: stock.to_string(),
        allocation,
    }
}
