//! Strategy contract and registry.
//!
//! Each variant is a stateless value implementing [`Strategy`]; all run state
//! lives in locals threaded through the daily fold, so independent runs
//! (parallel backtests, parameter sweeps) cannot interfere.

pub mod macd_ema_trailing_stop;
pub mod macd_swing;
pub mod rsi_swing;
pub mod simple_recurring;

use crate::domain::error::LedgerError;
use crate::domain::ledger::LedgerRow;
use crate::domain::params::{ParamSpec, Parameters};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;

pub use macd_ema_trailing_stop::MacdEmaTrailingStop;
pub use macd_swing::MacdSwing;
pub use rsi_swing::RsiSwing;
pub use simple_recurring::SimpleRecurring;

pub trait Strategy: std::fmt::Debug {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameter_schema(&self) -> Vec<ParamSpec>;

    /// Header of the optional trailing ledger column, if the variant emits one.
    fn extra_column(&self) -> Option<&'static str> {
        None
    }

    /// Fold the price series into a day-by-day ledger. Validates `params`
    /// against the schema before touching any data and fails with
    /// [`LedgerError::NoData`] when the resolved trading-day range is empty.
    fn calculate(
        &self,
        data: &dyn PriceDataPort,
        params: &Parameters,
    ) -> Result<Vec<LedgerRow>, LedgerError>;
}

/// All strategy variants, in registry order.
pub fn all_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(SimpleRecurring),
        Box::new(MacdSwing),
        Box::new(MacdEmaTrailingStop),
        Box::new(RsiSwing),
    ]
}

pub fn get_strategy(id: &str) -> Result<Box<dyn Strategy>, LedgerError> {
    all_strategies()
        .into_iter()
        .find(|s| s.id() == id)
        .ok_or_else(|| LedgerError::UnknownStrategy { id: id.to_string() })
}

/// Dispatch by id: look the strategy up and run it.
pub fn calculate(
    id: &str,
    data: &dyn PriceDataPort,
    params: &Parameters,
) -> Result<Vec<LedgerRow>, LedgerError> {
    get_strategy(id)?.calculate(data, params)
}

/// Common required parameters, resolved after schema validation.
pub(crate) fn resolve_date_range(
    params: &Parameters,
) -> Result<(NaiveDate, NaiveDate), LedgerError> {
    let start = params.require_date("start_date")?;
    let end = params.require_date("end_date")?;
    if start > end {
        return Err(LedgerError::InvalidParameter {
            parameter: "start_date".into(),
            reason: "start_date must not be after end_date".into(),
        });
    }
    Ok((start, end))
}

pub(crate) fn resolve_ticker(params: &Parameters) -> Result<String, LedgerError> {
    let ticker = params.require_text("ticker")?.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(LedgerError::InvalidParameter {
            parameter: "ticker".into(),
            reason: "ticker must not be empty".into(),
        });
    }
    Ok(ticker)
}
