//! Ledger export port trait.

use crate::domain::error::LedgerError;
use crate::domain::ledger::LedgerRow;

pub trait ReportPort {
    /// Write a complete ledger. `extra_header` names the optional trailing
    /// column when the strategy produces one (e.g. "Current Stock").
    fn write_ledger(
        &self,
        rows: &[LedgerRow],
        extra_header: Option<&str>,
    ) -> Result<(), LedgerError>;
}
