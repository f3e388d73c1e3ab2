//! Report output port trait.

use crate::domain::error::PortvalError;
use crate::domain::stats::StatsComparison;
use crate::domain::valuation::ValuationPoint;
use std::path::Path;

/// Port for writing the stitched series and the comparison table.
pub trait ReportPort {
    fn write_series(&self, points: &[ValuationPoint], output_path: &Path) -> Result<(), PortvalError>;

    fn write_comparison(
        &self,
        comparison: &StatsComparison,
        output_path: &Path,
    ) -> Result<(), PortvalError>;
}
