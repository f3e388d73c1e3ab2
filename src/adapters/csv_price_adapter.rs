//! CSV price archive adapter: one `<SYMBOL>.csv` per symbol.

use crate::domain::error::PortvalError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::price_port::PriceStore;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

/// Parse `YYYY-MM-DD`, ignoring any time suffix (`2024-01-15 00:00:00`,
/// `2024-01-15T00:00:00`).
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    let trimmed = value.trim();
    let day = trimmed
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
}

pub struct CsvPriceStore {
    base_path: PathBuf,
}

impl CsvPriceStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    pub fn list_symbols(&self) -> Result<Vec<String>, PortvalError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PortvalError::DataAccess {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PortvalError::DataAccess {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

/// Price column: the one named after the symbol, else `Adj Close`, else
/// `Close`, else the first non-date column.
fn price_column(headers: &csv::StringRecord, symbol: &str, date_col: usize) -> Option<usize> {
    let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    find(symbol)
        .or_else(|| find("Adj Close"))
        .or_else(|| find("Close"))
        .or_else(|| (0..headers.len()).find(|&i| i != date_col))
}

impl PriceStore for CsvPriceStore {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, PortvalError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PortvalError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(PortvalError::DataAccess {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| PortvalError::DataAccess {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();

        let date_col = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("date"))
            .ok_or_else(|| PortvalError::DataAccess {
                reason: format!("missing Date column in {}", path.display()),
            })?;
        let price_col = price_column(&headers, symbol, date_col).ok_or_else(|| {
            PortvalError::DataAccess {
                reason: format!("missing price column in {}", path.display()),
            }
        })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PortvalError::DataAccess {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default();
            let date = parse_date(date_str).map_err(|e| PortvalError::DataAccess {
                reason: format!("invalid date '{}' in {}: {}", date_str, path.display(), e),
            })?;

            let price_str = record.get(price_col).unwrap_or_default().trim();
            if price_str.is_empty() {
                continue;
            }
            let price: f64 = price_str.parse().map_err(|e| PortvalError::DataAccess {
                reason: format!("invalid price '{}' on {}: {}", price_str, date, e),
            })?;

            points.push(PricePoint { date, price });
        }

        PriceSeries::new(symbol, points)
    }
}
