//! Shared fixtures for integration tests.

use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use stockledger::domain::error::LedgerError;
use stockledger::domain::price::PricePoint;
use stockledger::ports::data_port::PriceDataPort;

/// In-memory price source backed by per-ticker series.
pub struct MockDataPort {
    series: HashMap<String, Vec<PricePoint>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        MockDataPort {
            series: HashMap::new(),
        }
    }

    pub fn with_series(mut self, ticker: &str, series: Vec<PricePoint>) -> Self {
        self.series.insert(ticker.to_string(), series);
        self
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, LedgerError> {
        Ok(self
            .series
            .get(ticker)
            .map(|s| {
                s.iter()
                    .filter(|p| p.date >= start && p.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LedgerError> {
        Ok(self.series.get(ticker).and_then(|s| {
            match (s.first(), s.last()) {
                (Some(first), Some(last)) => Some((first.date, last.date, s.len())),
                _ => None,
            }
        }))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One point per calendar day from `start`, with closes supplied by `f`.
pub fn series_from_fn(
    ticker: &str,
    start: NaiveDate,
    days: usize,
    f: impl Fn(usize) -> f64,
) -> Vec<PricePoint> {
    (0..days)
        .map(|i| {
            let close = f(i);
            PricePoint {
                ticker: ticker.to_string(),
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 10_000,
            }
        })
        .collect()
}

pub fn flat_series(ticker: &str, start: NaiveDate, days: usize, close: f64) -> Vec<PricePoint> {
    series_from_fn(ticker, start, days, |_| close)
}

pub fn trend_series(
    ticker: &str,
    start: NaiveDate,
    days: usize,
    first: f64,
    step: f64,
) -> Vec<PricePoint> {
    series_from_fn(ticker, start, days, |i| first + step * i as f64)
}
