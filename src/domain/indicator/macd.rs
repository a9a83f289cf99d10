//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD Line, seeded with the SMA of the
//! first `signal` defined line values
//! Histogram = MACD Line - Signal Line
//!
//! A point is defined once both the line and signal exist, i.e. from index
//! (slow - 1) + (signal - 1).

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    series: &[PricePoint],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: series
                .iter()
                .map(|p| IndicatorPoint {
                    date: p.date,
                    value: None,
                })
                .collect(),
        };
    }

    let ema_fast = ema_values(series, fast);
    let ema_slow = ema_values(series, slow);

    // Line exists wherever both EMAs do, which is from index slow-1 when
    // fast <= slow.
    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some(f.as_ref()? - s.as_ref()?))
        .collect();

    let k = 2.0 / (signal_period as f64 + 1.0);
    let mut signal_line: Vec<Option<f64>> = vec![None; series.len()];
    let line_start = macd_line.iter().position(|v| v.is_some());

    if let Some(start) = line_start {
        let seed_end = start + signal_period;
        if seed_end <= series.len() {
            let seed: f64 = macd_line[start..seed_end]
                .iter()
                .map(|v| v.unwrap_or(0.0))
                .sum::<f64>()
                / signal_period as f64;

            let mut signal_ema = seed;
            signal_line[seed_end - 1] = Some(signal_ema);
            for i in seed_end..series.len() {
                if let Some(line) = macd_line[i] {
                    signal_ema = line * k + signal_ema * (1.0 - k);
                    signal_line[i] = Some(signal_ema);
                }
            }
        }
    }

    let values = series
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorPoint {
            date: point.date,
            value: match (macd_line[i], signal_line[i]) {
                (Some(line), Some(signal)) => Some(IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                }),
                _ => None,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(series: &[PricePoint]) -> IndicatorSeries {
    calculate_macd(series, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
