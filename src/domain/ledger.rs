//! Daily ledger rows and the export column contract.

use chrono::NaiveDate;

/// Column order of the ledger wire contract. Consumers (CSV export, charting)
/// rely on this order being stable; the optional per-strategy column is
/// appended after these, never inserted mid-sequence.
pub const LEDGER_COLUMNS: [&str; 7] = [
    "Date",
    "Investment $",
    "Stocks Bought",
    "Stocks",
    "Total Account",
    "Profit/Loss",
    "Principal Invested",
];

/// One trading day's decision and resulting cumulative portfolio figures.
/// Rows are appended during the daily fold and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub investment: f64,
    pub shares_bought: f64,
    pub shares_cumulative: f64,
    pub account_value: f64,
    pub profit_loss: f64,
    pub principal_invested: f64,
    /// Value of the strategy's optional trailing column (current state or
    /// current ticker), when the strategy declares one.
    pub extra: Option<String>,
}
