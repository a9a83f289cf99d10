//! Concrete implementations of the port traits.

pub mod csv_ledger_adapter;
pub mod csv_price_adapter;
pub mod file_config_adapter;
