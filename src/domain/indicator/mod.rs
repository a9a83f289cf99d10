//! Technical indicator implementations.
//!
//! Indicator values are per-date and explicitly optional: a point is `None`
//! until enough history exists to compute it. Strategies must treat `None` as
//! "no signal", never as zero.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, calculate_macd_default};
pub use rsi::calculate_rsi;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, Copy)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Simple scalar value at `index`, if defined.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index)?.value? {
            IndicatorValue::Simple(v) => Some(v),
            _ => None,
        }
    }

    /// `(line, signal)` at `index`, if defined.
    pub fn macd_at(&self, index: usize) -> Option<(f64, f64)> {
        match self.values.get(index)?.value? {
            IndicatorValue::Macd { line, signal, .. } => Some((line, signal)),
            _ => None,
        }
    }

    /// Most recent defined simple value at or before `index`.
    pub fn latest_simple(&self, index: usize) -> Option<f64> {
        let end = (index + 1).min(self.values.len());
        self.values[..end]
            .iter()
            .rev()
            .find_map(|p| match p.value? {
                IndicatorValue::Simple(v) => Some(v),
                _ => None,
            })
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}
