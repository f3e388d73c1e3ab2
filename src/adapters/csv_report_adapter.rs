//! CSV report writer for the stitched series and the comparison table.

use crate::domain::error::PortvalError;
use crate::domain::stats::StatsComparison;
use crate::domain::valuation::ValuationPoint;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvReportAdapter;

/// Undefined statistics are written as an empty cell.
fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_error(path: &Path, e: csv::Error) -> PortvalError {
    PortvalError::DataAccess {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_series(&self, points: &[ValuationPoint], output_path: &Path) -> Result<(), PortvalError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| write_error(output_path, e))?;
        wtr.write_record(["Date", "port_val"])
            .map_err(|e| write_error(output_path, e))?;
        for point in points {
            wtr.write_record([point.date.format("%Y-%m-%d").to_string(), point.value.to_string()])
                .map_err(|e| write_error(output_path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_comparison(
        &self,
        comparison: &StatsComparison,
        output_path: &Path,
    ) -> Result<(), PortvalError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| write_error(output_path, e))?;
        wtr.write_record(["Portfolio", "Avg. Daily Return (%)", "Std. Dev. Daily Return (%)"])
            .map_err(|e| write_error(output_path, e))?;
        for row in &comparison.rows {
            wtr.write_record([
                row.label.clone(),
                cell(row.mean_daily_return_pct),
                cell(row.std_daily_return_pct),
            ])
            .map_err(|e| write_error(output_path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Fixed-width text rendering of the comparison table for the console.
pub fn format_comparison(comparison: &StatsComparison) -> String {
    let width = comparison
        .rows
        .iter()
        .map(|r| r.label.len())
        .max()
        .unwrap_or(0)
        .max("Portfolio".len());

    let mut out = format!(
        "{:<width$}  {:>22}  {:>27}\n",
        "Portfolio",
        "Avg. Daily Return (%)",
        "Std. Dev. Daily Return (%)",
        width = width
    );
    let fixed = |v: Option<f64>| v.map_or_else(|| "NaN".to_string(), |v| format!("{:.4}", v));
    for row in &comparison.rows {
        out.push_str(&format!(
            "{:<width$}  {:>22}  {:>27}\n",
            row.label,
            fixed(row.mean_daily_return_pct),
            fixed(row.std_daily_return_pct),
            width = width
        ));
    }
    out
}
