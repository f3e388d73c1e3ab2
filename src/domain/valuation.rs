//! Portfolio valuation points.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationPoint {
    pub date: NaiveDate,
    pub value: f64,
}

pub fn dates(points: &[ValuationPoint]) -> Vec<NaiveDate> {
    points.iter().map(|p| p.date).collect()
}

pub fn values(points: &[ValuationPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}
