//! Core domain types and logic.

pub mod error;
pub mod indicator;
pub mod ledger;
pub mod params;
pub mod price;
pub mod strategy;
