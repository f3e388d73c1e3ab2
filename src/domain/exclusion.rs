//! Corporate-action basket adjustments.
//!
//! The price archive does not reflect delistings and mergers, so a symbol that
//! disappeared mid-history cannot be priced across the event. These rules drop
//! such symbols from an interval's basket before pricing. Rules are supplied
//! as data; the stitcher evaluates them generically.

use crate::domain::error::PortvalError;
use crate::domain::snapshot::Holding;
use chrono::NaiveDate;
use std::fmt;

/// When a rule removes its symbol, relative to an interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionWhen {
    Always,
    /// `end > date`
    EndsAfter(NaiveDate),
    /// `start < date`
    StartsBefore(NaiveDate),
    /// The interval intersects `[from, to]`.
    Overlaps { from: NaiveDate, to: NaiveDate },
}

impl ExclusionWhen {
    pub fn applies(&self, start: NaiveDate, end: NaiveDate) -> bool {
        match *self {
            ExclusionWhen::Always => true,
            ExclusionWhen::EndsAfter(d) => end > d,
            ExclusionWhen::StartsBefore(d) => start < d,
            ExclusionWhen::Overlaps { from, to } => start <= to && end >= from,
        }
    }

    /// Parse the `when` keyword with its date columns.
    pub fn parse(
        symbol: &str,
        when: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, PortvalError> {
        let missing = |column: &str| PortvalError::InvalidRule {
            symbol: symbol.to_string(),
            reason: format!("'{}' requires a {} date", when, column),
        };
        match when.trim().to_lowercase().as_str() {
            "always" => Ok(ExclusionWhen::Always),
            "ends_after" => Ok(ExclusionWhen::EndsAfter(from.ok_or_else(|| missing("from"))?)),
            "starts_before" => Ok(ExclusionWhen::StartsBefore(
                from.ok_or_else(|| missing("from"))?,
            )),
            "overlaps" => {
                let from = from.ok_or_else(|| missing("from"))?;
                let to = to.ok_or_else(|| missing("to"))?;
                if to < from {
                    return Err(PortvalError::InvalidRule {
                        symbol: symbol.to_string(),
                        reason: format!("overlap window ends ({}) before it starts ({})", to, from),
                    });
                }
                Ok(ExclusionWhen::Overlaps { from, to })
            }
            other => Err(PortvalError::InvalidRule {
                symbol: symbol.to_string(),
                reason: format!("unknown condition '{}'", other),
            }),
        }
    }
}

impl fmt::Display for ExclusionWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionWhen::Always => write!(f, "always"),
            ExclusionWhen::EndsAfter(d) => write!(f, "ends after {}", d),
            ExclusionWhen::StartsBefore(d) => write!(f, "starts before {}", d),
            ExclusionWhen::Overlaps { from, to } => write!(f, "overlaps {}..{}", from, to),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRule {
    pub symbol: String,
    pub when: ExclusionWhen,
}

impl ExclusionRule {
    pub fn new(symbol: impl Into<String>, when: ExclusionWhen) -> Self {
        Self {
            symbol: symbol.into(),
            when,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    rules: Vec<ExclusionRule>,
}

impl ExclusionRules {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn excludes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> bool {
        self.rules
            .iter()
            .any(|r| r.symbol == symbol && r.when.applies(start, end))
    }

    /// Split `holdings` into (kept, excluded symbols) for the interval `[start, end]`.
    pub fn apply(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        holdings: &[Holding],
    ) -> (Vec<Holding>, Vec<String>) {
        let mut kept = Vec::with_capacity(holdings.len());
        let mut excluded = Vec::new();
        for holding in holdings {
            if self.excludes(&holding.symbol, start, end) {
                excluded.push(holding.symbol.clone());
            } else {
                kept.push(holding.clone());
            }
        }
        (kept, excluded)
    }
}
