//! MACD + EMA trailing-stop strategy.
//!
//! Buys daily while MACD is strictly above its signal line and the close is
//! above the 50-day EMA, redeploying any cash held from an earlier sale.
//! Sells everything when profit falls more than the configured percentage
//! below its reference high; the drawdown check is the only sell trigger.

use crate::domain::error::LedgerError;
use crate::domain::indicator::{calculate_ema, calculate_macd_default, IndicatorSeries};
use crate::domain::ledger::LedgerRow;
use crate::domain::params::{self, ParamSpec, Parameters};
use crate::domain::price::{indices_in_range, PricePoint};
use crate::domain::strategy::{resolve_date_range, resolve_ticker, Strategy};
use crate::ports::data_port::PriceDataPort;
use chrono::Days;
use tracing::debug;

const BUYING: &str = "Buying";
const WAITING: &str = "Waiting";

const EMA_PERIOD: usize = 50;

/// Calendar days fetched before the start date so the 12/26/9 MACD and the
/// 50-day EMA are defined from the first ledger row.
const LOOKBACK_DAYS: u64 = 100;

#[derive(Debug)]
pub struct MacdEmaTrailingStop;

impl Strategy for MacdEmaTrailingStop {
    fn id(&self) -> &'static str {
        "macd_ema_trailing_stop"
    }

    fn name(&self) -> &'static str {
        "MACD/EMA with Trailing Stop"
    }

    fn description(&self) -> &'static str {
        "Buy on MACD and 50-day EMA confirmation, sell everything when profit \
         drops a set percentage from its high"
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
                .help("Amount of new money to add each trading day in buying mode"),
            ParamSpec::number("trailing_stop_percentage", "Trailing Stop (%)")
                .optional()
                .default_number(10.0)
                .bounds(0.1, 50.0)
                .help("Sell everything when profit drops this far below its high (default: 10)"),
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
        let stop_pct = params.number_or("trailing_stop_percentage", 10.0);

        let fetch_start = start
            .checked_sub_days(Days::new(LOOKBACK_DAYS))
            .unwrap_or(start);
        let series = data.fetch_prices(&ticker, fetch_start, end)?;

        let in_range = indices_in_range(&series, start, end);
        if in_range.is_empty() {
            return Err(LedgerError::NoData { ticker });
        }

        let macd = calculate_macd_default(&series);
        let ema = calculate_ema(&series, EMA_PERIOD);
        Ok(fold(&series, &in_range, &macd, &ema, daily, stop_pct))
    }
}

fn fold(
    series: &[PricePoint],
    in_range: &[usize],
    macd: &IndicatorSeries,
    ema: &IndicatorSeries,
    daily: f64,
    stop_pct: f64,
) -> Vec<LedgerRow> {
    let mut shares = 0.0;
    let mut cash = 0.0;
    let mut principal = 0.0;
    let mut peak_profit = 0.0;
    // Highest profit seen since the last sale reset; only meaningful after
    // the first sale, when it replaces peak_profit as the stop reference.
    let mut last_known_high = 0.0;
    let mut has_sold = false;
    let mut rows = Vec::with_capacity(in_range.len());

    for &i in in_range {
        let point = &series[i];

        let macd_above = macd.macd_at(i).is_some_and(|(line, sig)| line > sig);
        let above_ema = ema.simple_at(i).is_none_or(|e| point.close > e);
        let can_buy = macd_above && above_ema && point.close > 0.0;

        let (investment, bought) = if can_buy {
            let available = cash + daily;
            let bought = available / point.close;
            shares += bought;
            cash = 0.0;
            principal += daily;
            debug!(date = %point.date, available, bought, shares, "deploying");
            (available, bought)
        } else {
            (0.0, 0.0)
        };

        let profit = cash + shares * point.close - principal;
        if profit > peak_profit {
            peak_profit = profit;
            if has_sold && profit > last_known_high {
                last_known_high = profit;
            }
        }

        let reference = if has_sold { last_known_high } else { peak_profit };
        let stop_level = reference * (1.0 - stop_pct / 100.0);
        if reference > 0.0 && shares > 0.0 && profit < stop_level {
            debug!(date = %point.date, profit, reference, stop_level, "stop hit, selling all");
            cash += shares * point.close;
            shares = 0.0;
            last_known_high = profit;
            peak_profit = profit;
            has_sold = true;
        }

        let account = cash + shares * point.close;
        let label = if shares > 0.0 { BUYING } else { WAITING };

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

    fn make_macd(series: &[PricePoint], above: &[bool]) -> IndicatorSeries {
        IndicatorSeries {
            indicator_type: IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            values: series
                .iter()
                .zip(above)
                .map(|(p, &above)| IndicatorPoint {
                    date: p.date,
                    value: Some(IndicatorValue::Macd {
                        line: if above { 1.0 } else { -1.0 },
                        signal: 0.0,
                        histogram: if above { 1.0 } else { -1.0 },
                    }),
                })
                .collect(),
        }
    }

    fn undefined_ema(series: &[PricePoint]) -> IndicatorSeries {
        IndicatorSeries {
            indicator_type: IndicatorType::Ema(EMA_PERIOD),
            values: series
                .iter()
                .map(|p| IndicatorPoint {
                    date: p.date,
                    value: None,
                })
                .collect(),
        }
    }

    fn fixed_ema(series: &[PricePoint], level: f64) -> IndicatorSeries {
        IndicatorSeries {
            indicator_type: IndicatorType::Ema(EMA_PERIOD),
            values: series
                .iter()
                .map(|p| IndicatorPoint {
                    date: p.date,
                    value: Some(IndicatorValue::Simple(level)),
                })
                .collect(),
        }
    }

    fn all_indices(series: &[PricePoint]) -> Vec<usize> {
        (0..series.len()).collect()
    }

    #[test]
    fn buys_only_when_macd_above_and_close_above_ema() {
        let series = make_series(&[10.0, 10.0, 10.0, 10.0]);
        let macd = make_macd(&series, &[true, false, true, true]);
        // EMA at 11 on a $10 close blocks the buy even with MACD above
        let ema = fixed_ema(&series, 11.0);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 10.0);
        assert!(rows.iter().all(|r| r.investment.abs() < f64::EPSILON));

        let ema = fixed_ema(&series, 9.0);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 10.0);
        assert!((rows[0].investment - 100.0).abs() < 1e-9);
        assert!(rows[1].investment.abs() < f64::EPSILON); // macd below
        assert!((rows[2].investment - 100.0).abs() < 1e-9);
    }

    #[test]
    fn undefined_ema_does_not_block_buying() {
        let series = make_series(&[10.0, 10.0]);
        let macd = make_macd(&series, &[true, true]);
        let ema = undefined_ema(&series);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 10.0);
        assert!((rows[0].investment - 100.0).abs() < 1e-9);
    }

    #[test]
    fn profit_at_exact_stop_level_does_not_sell() {
        // Buy once at $1, then watch from the sidelines: profit peaks at 1200,
        // a 50% stop puts the level at exactly 600, and a day at exactly 600
        // must hold.
        let series = make_series(&[1.0, 13.0, 7.0]);
        let macd = make_macd(&series, &[true, false, false]);
        let ema = undefined_ema(&series);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 50.0);

        // day 1: 100 shares at $13 against $100 principal
        assert!((rows[1].profit_loss - 1200.0).abs() < 1e-9);
        // day 2: profit exactly 600, still holding
        assert!((rows[2].shares_cumulative - 100.0).abs() < 1e-9);
        assert_eq!(rows[2].extra.as_deref(), Some(BUYING));
    }

    #[test]
    fn profit_below_stop_level_sells_everything() {
        let series = make_series(&[1.0, 13.0, 6.75]);
        let macd = make_macd(&series, &[true, false, false]);
        let ema = undefined_ema(&series);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 50.0);

        // day 2: profit 575 < 600, everything liquidated to cash
        assert!(rows[2].shares_cumulative.abs() < f64::EPSILON);
        assert!((rows[2].account_value - 675.0).abs() < 1e-9);
        assert!((rows[2].profit_loss - 575.0).abs() < 1e-9);
        assert_eq!(rows[2].extra.as_deref(), Some(WAITING));
    }

    #[test]
    fn no_sell_without_positive_reference() {
        // Profit never goes positive, so the stop never arms even though the
        // drawdown from zero is large.
        let series = make_series(&[10.0, 5.0, 2.0]);
        let macd = make_macd(&series, &[true, false, false]);
        let ema = undefined_ema(&series);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 10.0);

        assert!((rows[2].shares_cumulative - 10.0).abs() < 1e-9);
        assert_eq!(rows[2].extra.as_deref(), Some(BUYING));
    }

    #[test]
    fn price_below_ema_pauses_buying_but_does_not_sell() {
        let series = make_series(&[10.0, 10.5, 10.5, 10.5]);
        let macd = make_macd(&series, &[true, true, true, true]);
        let ema = fixed_ema(&series, 10.2);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 10.0);

        // first day is below the EMA: no buy, no shares
        assert!(rows[0].investment.abs() < f64::EPSILON);
        // later days buy and the position is never sold on EMA alone
        assert!(rows[3].shares_cumulative > 0.0);
        assert_eq!(rows[3].extra.as_deref(), Some(BUYING));
    }

    #[test]
    fn cash_from_sale_is_redeployed_on_next_buy() {
        let series = make_series(&[1.0, 13.0, 6.75, 5.0]);
        // stop hits on day 2, day 3 is a buy day again
        let macd = make_macd(&series, &[true, false, false, true]);
        let ema = undefined_ema(&series);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 50.0);

        // day 3 deploys the $675 sale proceeds plus the $100 daily amount
        assert!((rows[3].investment - 775.0).abs() < 1e-9);
        assert!((rows[3].shares_bought - 155.0).abs() < 1e-9);
        // principal only grows by the daily amount, not the redeployed cash
        assert!((rows[3].principal_invested - 300.0).abs() < 1e-9);
    }

    #[test]
    fn reference_after_sale_is_the_sale_profit_until_exceeded() {
        // After selling at profit 575, the stop reference restarts from 575;
        // a later dip below 50% of 575 (287.5) while holding again must sell.
        let series = make_series(&[1.0, 13.0, 6.75, 5.0, 1.0]);
        let macd = make_macd(&series, &[true, false, false, true, false]);
        let ema = undefined_ema(&series);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 50.0);

        // day 4: 155 shares at $1 = 155, principal 300, profit -145 < 287.5
        assert!(rows[4].shares_cumulative.abs() < f64::EPSILON);
        assert_eq!(rows[4].extra.as_deref(), Some(WAITING));
    }

    #[test]
    fn zero_price_day_does_not_buy() {
        let series = make_series(&[0.0, 10.0]);
        let macd = make_macd(&series, &[true, true]);
        let ema = undefined_ema(&series);
        let rows = fold(&series, &all_indices(&series), &macd, &ema, 100.0, 10.0);

        assert!(rows[0].investment.abs() < f64::EPSILON);
        assert!(rows[0].principal_invested.abs() < f64::EPSILON);
        assert!((rows[1].investment - 100.0).abs() < 1e-9);
    }
}
