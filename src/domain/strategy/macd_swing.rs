//! MACD swing strategy: buy daily while MACD is above its signal line, wait
//! out the stretches below it.
//!
//! Two-state machine. The initial state comes from a non-strict level check on
//! the first date with a defined MACD value; every later change requires a
//! strict crossover between consecutive days. Shares are held through waiting
//! stretches, never sold.

use crate::domain::error::LedgerError;
use crate::domain::indicator::{calculate_macd, IndicatorSeries};
use crate::domain::ledger::LedgerRow;
use crate::domain::params::{self, ParamSpec, Parameters};
use crate::domain::price::{indices_in_range, PricePoint};
use crate::domain::strategy::{resolve_date_range, resolve_ticker, Strategy};
use crate::ports::data_port::PriceDataPort;
use chrono::Days;
use tracing::debug;

const BUYING: &str = "Buying";
const WAITING: &str = "Waiting for MACD Crossover Up";

/// Calendar-day cushion on top of the indicator warmup so MACD is normally
/// defined from the first ledger row (weekends and holidays eat into it).
const LOOKBACK_BUFFER_DAYS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Buying,
    Waiting,
}

#[derive(Debug)]
pub struct MacdSwing;

impl Strategy for MacdSwing {
    fn id(&self) -> &'static str {
        "macd_swing"
    }

    fn name(&self) -> &'static str {
        "MACD Swing Strategy"
    }

    fn description(&self) -> &'static str {
        "Buy when MACD crosses up, keep buying until MACD crosses down, repeat."
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
                .help("Amount to invest each trading day when in buying mode"),
            ParamSpec::number("macd_fast", "MACD Fast Period")
                .optional()
                .default_number(12.0)
                .bounds(2.0, 50.0)
                .help("Fast EMA period for MACD calculation (default: 12)"),
            ParamSpec::number("macd_slow", "MACD Slow Period")
                .optional()
                .default_number(26.0)
                .bounds(2.0, 100.0)
                .help("Slow EMA period for MACD calculation (default: 26)"),
            ParamSpec::number("macd_signal", "MACD Signal Period")
                .optional()
                .default_number(9.0)
                .bounds(2.0, 50.0)
                .help("Signal line EMA period for MACD calculation (default: 9)"),
        ]
    }

    fn extra_column(&self) -> Option<&'static str> {
        Some("Current State")
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
        let fast = params.number_or("macd_fast", 12.0) as usize;
        let slow = params.number_or("macd_slow", 26.0) as usize;
        let signal = params.number_or("macd_signal", 9.0) as usize;

        let lookback = Days::new((slow + signal + LOOKBACK_BUFFER_DAYS) as u64);
        let fetch_start = start.checked_sub_days(lookback).unwrap_or(start);
        let series = data.fetch_prices(&ticker, fetch_start, end)?;

        let in_range = indices_in_range(&series, start, end);
        if in_range.is_empty() {
            return Err(LedgerError::NoData { ticker });
        }

        let macd = calculate_macd(&series, fast, slow, signal);
        Ok(fold(&series, &in_range, &macd, daily))
    }
}

/// The daily fold, on a precomputed MACD series aligned to `series`.
fn fold(
    series: &[PricePoint],
    in_range: &[usize],
    macd: &IndicatorSeries,
    daily: f64,
) -> Vec<LedgerRow> {
    let mut mode: Option<Mode> = None;
    let mut shares = 0.0;
    let mut principal = 0.0;
    let mut rows = Vec::with_capacity(in_range.len());

    for &i in in_range {
        let point = &series[i];
        let current = macd.macd_at(i);

        // Initialize on the first usable date; non-strict comparison here only.
        if mode.is_none() {
            if let Some((line, sig)) = current {
                let initial = if line >= sig {
                    Mode::Buying
                } else {
                    Mode::Waiting
                };
                debug!(date = %point.date, ?initial, line, signal = sig, "initial state");
                mode = Some(initial);
            }
        } else if i > 0 {
            // Strict crossovers only, requiring the previous day's values.
            if let (Some((line, sig)), Some((prev_line, prev_sig))) =
                (current, macd.macd_at(i - 1))
            {
                match mode {
                    Some(Mode::Buying) if line < sig && prev_line >= prev_sig => {
                        debug!(date = %point.date, line, signal = sig, "bearish cross, waiting");
                        mode = Some(Mode::Waiting);
                    }
                    Some(Mode::Waiting) if line > sig && prev_line <= prev_sig => {
                        debug!(date = %point.date, line, signal = sig, "bullish cross, buying");
                        mode = Some(Mode::Buying);
                    }
                    _ => {}
                }
            }
        }

        let (investment, bought) = if mode == Some(Mode::Buying) && point.close > 0.0 {
            let bought = daily / point.close;
            shares += bought;
            principal += daily;
            (daily, bought)
        } else {
            (0.0, 0.0)
        };

        let account = shares * point.close;
        let label = match mode {
            Some(Mode::Buying) => BUYING,
            _ => WAITING,
        };

        rows.push(LedgerRow {
            date: point.date,
            investment,
            shares_bought: bought,
            shares_cumulative: shares,
            account_value: account,
            profit_loss: account - principal,
            principal_invested: principal,
            extra: Some(label.to_string()),
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{IndicatorPoint, IndicatorType, IndicatorValue};
    use chrono::NaiveDate;

    fn make_series(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                ticker: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(Days::new(i as u64))
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    /// Synthetic MACD series: (line, signal) pairs, None for warmup.
    fn make_macd(series: &[PricePoint], pairs: &[Option<(f64, f64)>]) -> IndicatorSeries {
        IndicatorSeries {
            indicator_type: IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            values: series
                .iter()
                .zip(pairs)
                .map(|(p, pair)| IndicatorPoint {
                    date: p.date,
                    value: pair.map(|(line, signal)| IndicatorValue::Macd {
                        line,
                        signal,
                        histogram: line - signal,
                    }),
                })
                .collect(),
        }
    }

    fn all_indices(series: &[PricePoint]) -> Vec<usize> {
        (0..series.len()).collect()
    }

    #[test]
    fn initial_state_buying_when_macd_at_or_above_signal() {
        let series = make_series(&[10.0, 10.0]);
        // exactly equal: non-strict initialization picks Buying
        let macd = make_macd(&series, &[Some((0.5, 0.5)), Some((0.5, 0.5))]);
        let rows = fold(&series, &all_indices(&series), &macd, 100.0);

        assert_eq!(rows[0].extra.as_deref(), Some(BUYING));
        assert!((rows[0].investment - 100.0).abs() < 1e-9);
    }

    #[test]
    fn initial_state_waiting_when_macd_below_signal() {
        let series = make_series(&[10.0, 10.0]);
        let macd = make_macd(&series, &[Some((-0.5, 0.0)), Some((-0.5, 0.0))]);
        let rows = fold(&series, &all_indices(&series), &macd, 100.0);

        assert_eq!(rows[0].extra.as_deref(), Some(WAITING));
        assert!(rows[0].investment.abs() < f64::EPSILON);
    }

    #[test]
    fn bullish_cross_transitions_on_cross_day_only() {
        // Below on day 5, above on day 6: the switch lands on day 6.
        let series = make_series(&[10.0; 8]);
        let pairs: Vec<Option<(f64, f64)>> = vec![
            Some((-0.5, 0.0)),
            Some((-0.4, 0.0)),
            Some((-0.3, 0.0)),
            Some((-0.2, 0.0)),
            Some((-0.15, 0.0)),
            Some((-0.1, 0.0)),  // day 5: still below
            Some((0.1, 0.05)),  // day 6: crossed above
            Some((0.2, 0.1)),
        ];
        let macd = make_macd(&series, &pairs);
        let rows = fold(&series, &all_indices(&series), &macd, 100.0);

        assert_eq!(rows[5].extra.as_deref(), Some(WAITING));
        assert_eq!(rows[6].extra.as_deref(), Some(BUYING));
        assert!(rows[5].investment.abs() < f64::EPSILON);
        assert!((rows[6].investment - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bearish_cross_stops_buying_but_keeps_shares() {
        let series = make_series(&[10.0, 10.0, 10.0, 10.0]);
        let pairs = vec![
            Some((0.2, 0.1)),
            Some((0.2, 0.1)),
            Some((-0.1, 0.0)), // crossed below
            Some((-0.2, 0.0)),
        ];
        let macd = make_macd(&series, &pairs);
        let rows = fold(&series, &all_indices(&series), &macd, 100.0);

        assert_eq!(rows[1].extra.as_deref(), Some(BUYING));
        assert_eq!(rows[2].extra.as_deref(), Some(WAITING));
        // shares bought on days 0-1 are held through the waiting stretch
        assert!((rows[3].shares_cumulative - 20.0).abs() < 1e-9);
        assert!(rows[3].investment.abs() < f64::EPSILON);
        assert!((rows[3].principal_invested - 200.0).abs() < 1e-9);
    }

    #[test]
    fn level_without_cross_does_not_transition() {
        // Waiting, then macd pops above signal without the previous day being
        // at-or-below: prev day undefined means no strict crossover evidence.
        let series = make_series(&[10.0, 10.0, 10.0]);
        let pairs = vec![Some((-0.1, 0.0)), None, Some((0.3, 0.1))];
        let macd = make_macd(&series, &pairs);
        let rows = fold(&series, &all_indices(&series), &macd, 100.0);

        assert_eq!(rows[2].extra.as_deref(), Some(WAITING));
    }

    #[test]
    fn undefined_macd_days_wait_and_invest_nothing() {
        let series = make_series(&[10.0, 10.0, 10.0]);
        let pairs = vec![None, None, Some((0.1, 0.0))];
        let macd = make_macd(&series, &pairs);
        let rows = fold(&series, &all_indices(&series), &macd, 100.0);

        assert_eq!(rows[0].extra.as_deref(), Some(WAITING));
        assert!(rows[0].investment.abs() < f64::EPSILON);
        assert!(rows[1].investment.abs() < f64::EPSILON);
        // initialization happens on the first defined day
        assert_eq!(rows[2].extra.as_deref(), Some(BUYING));
    }

    #[test]
    fn waiting_rows_invest_zero_buying_rows_invest_daily() {
        let series = make_series(&[10.0; 6]);
        let pairs = vec![
            Some((0.1, 0.0)),
            Some((0.1, 0.0)),
            Some((-0.1, 0.0)),
            Some((-0.1, 0.0)),
            Some((0.1, 0.0)),
            Some((0.1, 0.0)),
        ];
        let macd = make_macd(&series, &pairs);
        let rows = fold(&series, &all_indices(&series), &macd, 50.0);

        for row in &rows {
            match row.extra.as_deref() {
                Some(BUYING) => assert!((row.investment - 50.0).abs() < 1e-9),
                Some(WAITING) => assert!(row.investment.abs() < f64::EPSILON),
                other => panic!("unexpected state label {:?}", other),
            }
        }
    }

    #[test]
    fn principal_is_running_sum_of_investment() {
        let series = make_series(&[10.0, 12.0, 9.0, 11.0, 10.0]);
        let pairs = vec![
            Some((0.1, 0.0)),
            Some((-0.1, 0.0)),
            Some((-0.2, 0.0)),
            Some((0.1, 0.0)),
            Some((0.2, 0.1)),
        ];
        let macd = make_macd(&series, &pairs);
        let rows = fold(&series, &all_indices(&series), &macd, 100.0);

        let mut sum = 0.0;
        for row in &rows {
            sum += row.investment;
            assert!((row.principal_invested - sum).abs() < 1e-9);
            assert!((row.profit_loss - (row.account_value - row.principal_invested)).abs() < 1e-9);
        }
    }
}
