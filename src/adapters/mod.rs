//! Concrete adapter implementations for ports.

pub mod cached_price_store;
pub mod csv_input_adapter;
pub mod csv_price_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
