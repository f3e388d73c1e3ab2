//! Core domain types and the valuation engine.

pub mod price;
pub mod snapshot;
pub mod valuation;
pub mod exclusion;
pub mod interval;
pub mod stitcher;
pub mod stats;
pub mod constituents;
pub mod run;
pub mod config_validation;
pub mod error;
