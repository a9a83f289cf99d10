//! Price data access port trait.

use crate::domain::error::LedgerError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

/// Synchronous, potentially blocking boundary to the price source. The engine
/// neither retries nor times out; an empty result for the requested window is
/// `Ok(vec![])` and the caller decides whether that is an error.
pub trait PriceDataPort {
    /// Ordered series (strictly increasing dates) for one ticker inside
    /// `[start, end]`.
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, LedgerError>;

    /// `(first date, last date, point count)` available for a ticker, if any.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LedgerError>;
}
