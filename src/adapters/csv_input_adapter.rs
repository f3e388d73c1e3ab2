//! CSV readers for the rebalancing weight table, the exclusion rule list and
//! the reference constituent table.

use crate::adapters::csv_price_adapter::parse_date;
use crate::domain::constituents::ConstituentRecord;
use crate::domain::error::PortvalError;
use crate::domain::exclusion::{ExclusionRule, ExclusionRules, ExclusionWhen};
use crate::domain::snapshot::WeightRecord;
use crate::ports::reference_port::ReferenceTable;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct WeightRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Stock")]
    stock: String,
    #[serde(rename = "Allocation")]
    allocation: f64,
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    symbol: String,
    when: String,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    beg_date: String,
    symbol: String,
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, PortvalError> {
    csv::Reader::from_path(path).map_err(|e| PortvalError::DataAccess {
        reason: format!("failed to open {}: {}", path.display(), e),
    })
}

fn row_error(path: &Path, e: csv::Error) -> PortvalError {
    PortvalError::DataAccess {
        reason: format!("CSV parse error in {}: {}", path.display(), e),
    }
}

fn date_error(path: &Path, value: &str) -> PortvalError {
    PortvalError::DataAccess {
        reason: format!("invalid date '{}' in {}", value, path.display()),
    }
}

/// Read `Date,Stock,Allocation` rows. Extra columns are ignored.
pub fn load_weight_table(path: &Path) -> Result<Vec<WeightRecord>, PortvalError> {
    let mut rdr = open(path)?;
    let mut records = Vec::new();
    for row in rdr.deserialize::<WeightRow>() {
        let row = row.map_err(|e| row_error(path, e))?;
        let date = parse_date(&row.date).map_err(|_| date_error(path, &row.date))?;
        records.push(WeightRecord {
            date,
            stock: row.stock.trim().to_string(),
            allocation: row.allocation,
        });
    }
    tracing::debug!(path = %path.display(), rows = records.len(), "loaded weight table");
    Ok(records)
}

/// Read `symbol,when,from,to` rows; `when` is one of `always`, `ends_after`,
/// `starts_before`, `overlaps`.
pub fn load_exclusion_rules(path: &Path) -> Result<ExclusionRules, PortvalError> {
    let mut rdr = open(path)?;
    let mut rules = Vec::new();

    let optional_date = |value: Option<String>| -> Result<_, PortvalError> {
        match value.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_date(s).map(Some).map_err(|_| date_error(path, s)),
        }
    };

    for row in rdr.deserialize::<RuleRow>() {
        let row = row.map_err(|e| row_error(path, e))?;
        let symbol = row.symbol.trim().to_string();
        let when = ExclusionWhen::parse(&symbol, &row.when, optional_date(row.from)?, optional_date(row.to)?)?;
        rules.push(ExclusionRule::new(symbol, when));
    }
    tracing::debug!(path = %path.display(), rules = rules.len(), "loaded exclusion rules");
    Ok(ExclusionRules::new(rules))
}

/// Index membership table with `beg_date` and `symbol` columns.
pub struct CsvReferenceTable {
    path: PathBuf,
}

impl CsvReferenceTable {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ReferenceTable for CsvReferenceTable {
    fn constituent_records(&self) -> Result<Vec<ConstituentRecord>, PortvalError> {
        let mut rdr = open(&self.path)?;
        let mut records = Vec::new();
        for row in rdr.deserialize::<ReferenceRow>() {
            let row = row.map_err(|e| row_error(&self.path, e))?;
            let beg_date = parse_date(&row.beg_date).map_err(|_| date_error(&self.path, &row.beg_date))?;
            records.push(ConstituentRecord {
                beg_date,
                symbol: row.symbol.trim().to_string(),
            });
        }
        Ok(records)
    }
}
