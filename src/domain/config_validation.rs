//! Configuration validation.
//!
//! Validates the INI fields before any price data is touched.

use crate::domain::error::PortvalError;
use crate::domain::stitcher::BoundaryPolicy;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_VALUE: f64 = 1.0;

/// Upper bound for any day-count setting (about a century).
pub const MAX_DAY_COUNT: i64 = 36_525;

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), PortvalError> {
    validate_data_section(config)?;
    require(config, "portfolio", "weights")?;
    validate_initial_value(config)?;
    validate_day_count(config, "portfolio", "out_of_sample_days")?;
    validate_day_count(config, "portfolio", "benchmark_days")?;
    validate_weight_mode(config)?;
    validate_boundary(config)?;
    Ok(())
}

pub fn validate_universe_config(config: &dyn ConfigPort) -> Result<(), PortvalError> {
    validate_data_section(config)?;
    require(config, "data", "reference_table")?;
    validate_day_count(config, "universe", "lookback_days")?;
    validate_day_count(config, "universe", "lookforward_days")?;
    Ok(())
}

fn validate_data_section(config: &dyn ConfigPort) -> Result<(), PortvalError> {
    require(config, "data", "price_dir")
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), PortvalError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(PortvalError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

/// `[portfolio] initial_value`, defaulting when absent. A present value must
/// parse as a positive finite number.
pub fn initial_value(config: &dyn ConfigPort) -> Result<f64, PortvalError> {
    let Some(raw) = config.get_string("portfolio", "initial_value") else {
        return Ok(DEFAULT_INITIAL_VALUE);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(PortvalError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "initial_value".to_string(),
            reason: format!("'{}' is not a positive number", raw),
        }),
    }
}

fn validate_initial_value(config: &dyn ConfigPort) -> Result<(), PortvalError> {
    initial_value(config).map(|_| ())
}

fn validate_day_count(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), PortvalError> {
    if let Some(raw) = config.get_string(section, key) {
        match raw.trim().parse::<i64>() {
            Ok(v) if (0..=MAX_DAY_COUNT).contains(&v) => {}
            _ => {
                return Err(PortvalError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("{} must be an integer between 0 and {}", key, MAX_DAY_COUNT),
                });
            }
        }
    }
    Ok(())
}

fn validate_weight_mode(config: &dyn ConfigPort) -> Result<(), PortvalError> {
    match config.get_string("portfolio", "weight_mode") {
        None => Ok(()),
        Some(s) if matches!(s.trim().to_lowercase().as_str(), "equal" | "weighted") => Ok(()),
        Some(_) => Err(PortvalError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "weight_mode".to_string(),
            reason: "weight_mode must be 'equal' or 'weighted'".to_string(),
        }),
    }
}

fn validate_boundary(config: &dyn ConfigPort) -> Result<(), PortvalError> {
    match config.get_string("portfolio", "boundary") {
        None => Ok(()),
        Some(s) => s
            .parse::<BoundaryPolicy>()
            .map(|_| ())
            .map_err(|reason| PortvalError::ConfigInvalid {
                section: "portfolio".to_string(),
                key: "boundary".to_string(),
                reason,
            }),
    }
}
