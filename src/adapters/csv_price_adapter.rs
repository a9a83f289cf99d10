//! CSV file price-data adapter.
//!
//! One file per ticker (`{TICKER}.csv`) under a base directory, with a
//! `date,open,high,low,close,volume` header and ISO dates.

use crate::domain::error::LedgerError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_all(&self, ticker: &str) -> Result<Vec<PricePoint>, LedgerError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| LedgerError::PriceSource {
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| LedgerError::PriceSource {
                ticker: ticker.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(ticker, &record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                LedgerError::PriceSource {
                    ticker: ticker.to_string(),
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            points.push(PricePoint {
                ticker: ticker.to_string(),
                date,
                open: number(ticker, &record, 1, "open")?,
                high: number(ticker, &record, 2, "high")?,
                low: number(ticker, &record, 3, "low")?,
                close: number(ticker, &record, 4, "close")?,
                volume: number::<i64>(ticker, &record, 5, "volume")?,
            });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

fn field<'r>(
    ticker: &str,
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, LedgerError> {
    record.get(index).ok_or_else(|| LedgerError::PriceSource {
        ticker: ticker.to_string(),
        reason: format!("missing {} column", name),
    })
}

fn number<T: std::str::FromStr>(
    ticker: &str,
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, LedgerError>
where
    T::Err: std::fmt::Display,
{
    field(ticker, record, index, name)?
        .parse()
        .map_err(|e| LedgerError::PriceSource {
            ticker: ticker.to_string(),
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, LedgerError> {
        let mut points = self.read_all(ticker)?;
        points.retain(|p| p.date >= start && p.date <= end);
        Ok(points)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LedgerError> {
        let points = self.read_all(ticker)?;
        Ok(match (points.first(), points.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, points.len())),
            _ => None,
        })
    }
}
