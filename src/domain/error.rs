//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for portval.
#[derive(Debug, thiserror::Error)]
pub enum PortvalError {
    #[error("data access error: {reason}")]
    DataAccess { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("no price data for {symbol} between {start} and {end}")]
    NoPriceData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("invalid price data for {symbol}: {reason}")]
    InvalidPriceData { symbol: String, reason: String },

    #[error("date {date} plus {days} days is out of range")]
    DateOverflow { date: NaiveDate, days: i64 },

    #[error("empty basket for interval starting {date}")]
    EmptyBasket { date: NaiveDate },

    #[error("allocations sum to zero for interval starting {date}")]
    ZeroAllocation { date: NaiveDate },

    #[error("duplicate holding {stock} on {date}")]
    DuplicateHolding { stock: String, date: NaiveDate },

    #[error("invalid allocation {allocation} for {stock} on {date}")]
    InvalidAllocation {
        stock: String,
        date: NaiveDate,
        allocation: f64,
    },

    #[error("weight table is empty")]
    EmptyWeightTable,

    #[error("no reference snapshot on or before {date}")]
    NoReferenceSnapshot { date: NaiveDate },

    #[error("invalid exclusion rule for {symbol}: {reason}")]
    InvalidRule { symbol: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PortvalError> for std::process::ExitCode {
    fn from(err: &PortvalError) -> Self {
        let code: u8 = match err {
            PortvalError::Io(_) => 1,
            PortvalError::ConfigParse { .. }
            | PortvalError::ConfigMissing { .. }
            | PortvalError::ConfigInvalid { .. }
            | PortvalError::InvalidRule { .. }
            | PortvalError::DateOverflow { .. } => 2,
            PortvalError::DataAccess { .. } | PortvalError::InvalidPriceData { .. } => 3,
            PortvalError::NoData { .. }
            | PortvalError::NoPriceData { .. }
            | PortvalError::NoReferenceSnapshot { .. } => 5,
            PortvalError::EmptyBasket { .. }
            | PortvalError::ZeroAllocation { .. }
            | PortvalError::DuplicateHolding { .. }
            | PortvalError::InvalidAllocation { .. }
            | PortvalError::EmptyWeightTable => 6,
        };
        std::process::ExitCode::from(code)
    }
}
