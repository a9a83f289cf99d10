//! Simple recurring strategy: invest a fixed amount every trading day.
//!
//! Stateless dollar-cost averaging; the baseline for ledger-accumulation
//! correctness.

use crate::domain::error::LedgerError;
use crate::domain::ledger::LedgerRow;
use crate::domain::params::{self, ParamSpec, Parameters};
use crate::domain::strategy::{resolve_date_range, resolve_ticker, Strategy};
use crate::ports::data_port::PriceDataPort;
use tracing::debug;

#[derive(Debug)]
pub struct SimpleRecurring;

impl Strategy for SimpleRecurring {
    fn id(&self) -> &'static str {
        "simple_recurring"
    }

    fn name(&self) -> &'static str {
        "Simple Recurring Strategy"
    }

    fn description(&self) -> &'static str {
        "Invest a fixed amount every trading day (dollar-cost averaging)"
    }

    fn parameter_schema(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::text("ticker", "Stock Ticker")
                .help("Stock ticker symbol (e.g. AAPL, MSFT, GOOGL)"),
            ParamSpec::date("start_date", "Start Date")
                .help("Start date for the investment period"),
            ParamSpec::date("end_date", "End Date").help("End date for the investment period"),
            ParamSpec::number("daily_investment", "Daily Investment ($)")
                .min(0.01)
                .help("Amount to invest each trading day"),
        ]
    }

    fn calculate(
        &self,
        data: &dyn PriceDataPort,
        params: &Parameters,
    ) -> Result<Vec<LedgerRow>, LedgerError> {
        params::validate(&self.parameter_schema(), params)?;

        let ticker = resolve_ticker(params)?;
        let (start, end) = resolve_date_range(params)?;
        let daily = params.require_number("daily_investment")?;

        let series = data.fetch_prices(&ticker, start, end)?;
        if series.is_empty() {
            return Err(LedgerError::NoData { ticker });
        }

        let mut shares = 0.0;
        let mut principal = 0.0;
        let mut rows = Vec::with_capacity(series.len());

        for point in &series {
            let bought = if point.close > 0.0 {
                daily / point.close
            } else {
                0.0
            };
            shares += bought;
            principal += daily;

            let account = shares * point.close;
            debug!(
                date = %point.date,
                bought,
                shares,
                account,
                "daily purchase"
            );

            rows.push(LedgerRow {
                date: point.date,
                investment: daily,
                shares_bought: bought,
                shares_cumulative: shares,
                account_value: account,
                profit_loss: account - principal,
                principal_invested: principal,
                extra: None,
            });
        }

        Ok(rows)
    }
}
