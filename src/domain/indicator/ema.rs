//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). The first (n-1) points are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub fn calculate_ema(series: &[PricePoint], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values: series
            .iter()
            .zip(ema_values(series, period))
            .map(|(p, v)| IndicatorPoint {
                date: p.date,
                value: v.map(IndicatorValue::Simple),
            })
            .collect(),
    }
}

/// Raw EMA values aligned to the input series, `None` during warmup.
pub(crate) fn ema_values(series: &[PricePoint], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(series.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, point) in series.iter().enumerate() {
        if i < period - 1 {
            sum += point.close;
            values.push(None);
        } else if i == period - 1 {
            sum += point.close;
            ema = sum / period as f64;
            values.push(Some(ema));
        } else {
            ema = point.close * k + ema * (1.0 - k);
            values.push(Some(ema));
        }
    }

    values
}
