//! RSI (Relative Strength Index) indicator.
//!
//! Wilder's smoothing for the average gain/loss:
//! - Seed: simple mean of gains/losses over the first n deltas
//! - Then: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)); if avg_loss == 0, RSI = 100.
//! The first n points are undefined (n price changes are needed for the seed).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub const DEFAULT_RSI_PERIOD: usize = 14;

pub fn calculate_rsi(series: &[PricePoint], period: usize) -> IndicatorSeries {
    let undefined = |p: &PricePoint| IndicatorPoint {
        date: p.date,
        value: None,
    };

    if period == 0 || series.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values: series.iter().map(undefined).collect(),
        };
    }

    let mut gains = Vec::with_capacity(series.len() - 1);
    let mut losses = Vec::with_capacity(series.len() - 1);
    for window in series.windows(2) {
        let change = window[1].close - window[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut values = Vec::with_capacity(series.len());
    values.push(undefined(&series[0]));

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, point) in series.iter().enumerate().skip(1) {
        let delta_idx = i - 1;

        if delta_idx < period - 1 {
            values.push(undefined(point));
            continue;
        }

        if delta_idx == period - 1 {
            avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
            avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[delta_idx]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[delta_idx]) / period as f64;
        }

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        values.push(IndicatorPoint {
            date: point.date,
            value: Some(IndicatorValue::Simple(rsi)),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
