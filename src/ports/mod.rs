//! Port traits for the valuation engine's collaborators.

pub mod config_port;
pub mod price_port;
pub mod reference_port;
pub mod report_port;
