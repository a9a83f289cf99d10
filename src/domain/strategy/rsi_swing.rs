//! RSI swing strategy over a list of candidate stocks.
//!
//! Holds one stock at a time, always the one whose latest RSI is lowest at
//! selection time. When profit in the current stock falls a set percentage
//! below its running peak, the position is liquidated and the proceeds move
//! into whichever candidate then has the lowest RSI.

use crate::domain::error::LedgerError;
use crate::domain::indicator::calculate_rsi;
use crate::domain::ledger::LedgerRow;
use crate::domain::params::{self, ParamSpec, Parameters};
use crate::domain::price::{position_of, PricePoint};
use crate::domain::strategy::{resolve_date_range, Strategy};
use crate::ports::data_port::PriceDataPort;
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;
use tracing::debug;

/// Calendar days of history beyond the RSI period used for each RSI
/// evaluation window.
const RSI_WINDOW_SLACK_DAYS: u64 = 30;

#[derive(Debug)]
pub struct RsiSwing;

impl Strategy for RsiSwing {
    fn id(&self) -> &'static str {
        "rsi_swing"
    }

    fn name(&self) -> &'static str {
        "RSI Swing Strategy"
    }

    fn description(&self) -> &'static str {
        "Rotate a daily investment into whichever candidate stock has the \
         lowest RSI, switching on a profit drawdown"
    }

    fn parameter_schema(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::text("stock_list", "Stock Tickers")
                .help("Comma-separated candidate tickers (e.g. AAPL,MSFT,GOOGL)"),
            ParamSpec::date("start_date", "Start Date")
                .help("Start date for the investment period"),
            ParamSpec::date("end_date", "End Date").help("End date for the investment period"),
            ParamSpec::number("daily_investment", "Daily Investment ($)")
                .min(0.01)
                .help("Amount to invest each trading day"),
            ParamSpec::number("rsi_period", "RSI Period")
                .optional()
                .default_number(14.0)
                .bounds(2.0, 50.0)
                .help("Lookback period for RSI calculation (default: 14)"),
            ParamSpec::number("profit_drop_threshold", "Profit Drop Threshold (%)")
                .optional()
                .default_number(10.0)
                .bounds(1.0, 50.0)
                .help("Switch stocks when profit drops this far below its peak (default: 10)"),
        ]
    }

    fn extra_column(&self) -> Option<&'static str> {
        Some("Current Stock")
    }

    fn calculate(
        &self,
        data: &dyn PriceDataPort,
        params: &Parameters,
    ) -> Result<Vec<LedgerRow>, LedgerError> {
        params::validate(&self.parameter_schema(), params)?;

        let tickers = parse_stock_list(params.require_text("stock_list")?)?;
        let (start, end) = resolve_date_range(params)?;
        let daily = params.require_number("daily_investment")?;
        let period = params.number_or("rsi_period", 14.0) as usize;
        let threshold = params.number_or("profit_drop_threshold", 10.0);

        let lookback = Days::new(period as u64 + RSI_WINDOW_SLACK_DAYS);
        let fetch_start = start.checked_sub_days(lookback).unwrap_or(start);

        let mut universe = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let series = data.fetch_prices(&ticker, fetch_start, end)?;
            universe.push((ticker, series));
        }

        // Trading calendar: union of in-range dates across all candidates.
        let dates: BTreeSet<NaiveDate> = universe
            .iter()
            .flat_map(|(_, series)| series.iter())
            .filter(|p| p.date >= start && p.date <= end)
            .map(|p| p.date)
            .collect();
        if dates.is_empty() {
            let joined = universe
                .iter()
                .map(|(t, _)| t.as_str())
                .collect::<Vec<_>>()
                .join(",");
            return Err(LedgerError::NoData { ticker: joined });
        }

        let mut current: Option<usize> = None;
        let mut shares = 0.0;
        let mut cash = 0.0;
        let mut principal = 0.0;
        let mut peak_profit = 0.0;
        let mut rows = Vec::with_capacity(dates.len());

        for date in dates {
            if current.is_none() {
                let picked = select_ticker(&universe, date, lookback, period, None);
                debug!(%date, ticker = %universe[picked].0, "initial selection");
                current = Some(picked);
                peak_profit = 0.0;
            }
            let mut held = current.unwrap_or(0);

            // Candidates do not share a calendar; days where the held stock
            // has no bar contribute no ledger row.
            let Some(close) = close_on(&universe[held].1, date) else {
                continue;
            };

            let account = cash + shares * close;
            let profit = account - principal;
            if profit > peak_profit {
                peak_profit = profit;
            }

            let switching = peak_profit > 0.0
                && profit < peak_profit * (1.0 - threshold / 100.0);

            let (investment, bought, account) = if switching {
                cash = account;
                shares = 0.0;
                let picked = select_ticker(&universe, date, lookback, period, Some(held));
                debug!(
                    %date, profit, peak = peak_profit,
                    from = %universe[held].0, to = %universe[picked].0,
                    "drawdown switch"
                );
                held = picked;
                current = Some(picked);
                peak_profit = profit.max(0.0);

                match close_on(&universe[held].1, date) {
                    Some(new_close) if new_close > 0.0 => {
                        let total = cash + daily;
                        shares = total / new_close;
                        cash = 0.0;
                        principal += daily;
                        (daily, shares, shares * new_close)
                    }
                    _ => (0.0, 0.0, cash),
                }
            } else {
                let bought = if close > 0.0 { daily / close } else { 0.0 };
                shares += bought;
                principal += daily;
                (daily, bought, cash + shares * close)
            };

            rows.push(LedgerRow {
                date,
                investment,
                shares_bought: bought,
                shares_cumulative: shares,
                account_value: account,
                profit_loss: account - principal,
                principal_invested: principal,
                extra: Some(universe[held].0.clone()),
            });
        }

        Ok(rows)
    }
}

fn parse_stock_list(raw: &str) -> Result<Vec<String>, LedgerError> {
    let tickers: Vec<String> = raw
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tickers.is_empty() {
        return Err(LedgerError::EmptyStockList);
    }
    Ok(tickers)
}

fn close_on(series: &[PricePoint], date: NaiveDate) -> Option<f64> {
    position_of(series, date).map(|i| series[i].close)
}

/// Index of the candidate with the lowest latest RSI on `date`. A switch
/// excludes the held candidate so the position always moves. Candidates
/// without enough history for a defined RSI are skipped; ties keep the
/// earlier list position; with no usable candidate the held one (or the
/// first) is returned.
fn select_ticker(
    universe: &[(String, Vec<PricePoint>)],
    date: NaiveDate,
    lookback: Days,
    period: usize,
    exclude: Option<usize>,
) -> usize {
    let window_start = date.checked_sub_days(lookback).unwrap_or(date);
    let mut best: Option<(usize, f64)> = None;

    for (index, (ticker, series)) in universe.iter().enumerate() {
        if exclude == Some(index) {
            continue;
        }
        let window: Vec<PricePoint> = series
            .iter()
            .filter(|p| p.date >= window_start && p.date <= date)
            .cloned()
            .collect();
        if window.len() <= period {
            continue;
        }

        let rsi = calculate_rsi(&window, period);
        let Some(value) = rsi.latest_simple(window.len() - 1) else {
            continue;
        };
        debug!(%date, %ticker, rsi = value, "candidate");

        if best.is_none_or(|(_, b)| value < b) {
            best = Some((index, value));
        }
    }

    best.map(|(index, _)| index)
        .unwrap_or_else(|| exclude.unwrap_or(0))
}
