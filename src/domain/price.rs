//! Daily price bar representation.

use chrono::NaiveDate;

/// One trading day of OHLCV data for a single ticker. Immutable once built;
/// a price series is an ordered `Vec<PricePoint>` with strictly increasing
/// dates, trading days only.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Index of the point with the given date, if present. The series must be
/// sorted by date.
pub fn position_of(series: &[PricePoint], date: NaiveDate) -> Option<usize> {
    series.binary_search_by_key(&date, |p| p.date).ok()
}

/// Indices of all points with dates inside `[start, end]`.
pub fn indices_in_range(series: &[PricePoint], start: NaiveDate, end: NaiveDate) -> Vec<usize> {
    series
        .iter()
        .enumerate()
        .filter(|(_, p)| p.date >= start && p.date <= end)
        .map(|(i, _)| i)
        .collect()
}
