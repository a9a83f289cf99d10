//! CSV ledger export adapter.
//!
//! Writes the fixed ledger columns, plus the strategy's optional trailing
//! column, to a file or stdout. Dollar amounts are rounded to 2 decimal
//! places and share counts to 6; the core keeps full precision.

use crate::domain::error::LedgerError;
use crate::domain::ledger::{LedgerRow, LEDGER_COLUMNS};
use crate::ports::report_port::ReportPort;
use std::io::Write;
use std::path::PathBuf;

pub struct CsvLedgerAdapter {
    output: Option<PathBuf>,
}

impl CsvLedgerAdapter {
    /// Write to `output`, or to stdout when `None`.
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }

    fn write_to<W: Write>(
        writer: W,
        rows: &[LedgerRow],
        extra_header: Option<&str>,
    ) -> Result<(), LedgerError> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = LEDGER_COLUMNS.to_vec();
        if let Some(extra) = extra_header {
            header.push(extra);
        }
        wtr.write_record(&header).map_err(csv_error)?;

        for row in rows {
            let mut record = vec![
                row.date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", row.investment),
                format!("{:.6}", row.shares_bought),
                format!("{:.6}", row.shares_cumulative),
                format!("{:.2}", row.account_value),
                format!("{:.2}", row.profit_loss),
                format!("{:.2}", row.principal_invested),
            ];
            if extra_header.is_some() {
                record.push(row.extra.clone().unwrap_or_default());
            }
            wtr.write_record(&record).map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> LedgerError {
    LedgerError::Io(std::io::Error::other(e))
}

impl ReportPort for CsvLedgerAdapter {
    fn write_ledger(
        &self,
        rows: &[LedgerRow],
        extra_header: Option<&str>,
    ) -> Result<(), LedgerError> {
        match &self.output {
            Some(path) => {
                let file = std::fs::File::create(path)?;
                Self::write_to(file, rows, extra_header)
            }
            None => Self::write_to(std::io::stdout().lock(), rows, extra_header),
        }
    }
}
