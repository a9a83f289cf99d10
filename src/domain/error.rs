//! Domain error types.

/// Top-level error type for stockledger.
///
/// Validation-family errors are raised before any computation begins; a
/// strategy never emits a partial ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("unknown strategy: {id}")]
    UnknownStrategy { id: String },

    #[error("missing required parameter '{parameter}'")]
    MissingParameter { parameter: String },

    #[error("invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    #[error("stock list cannot be empty")]
    EmptyStockList,

    #[error("no price data for {ticker} in the requested date range")]
    NoData { ticker: String },

    #[error("price source error for {ticker}: {reason}")]
    PriceSource { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&LedgerError> for std::process::ExitCode {
    fn from(err: &LedgerError) -> Self {
        let code: u8 = match err {
            LedgerError::Io(_) => 1,
            LedgerError::ConfigParse { .. }
            | LedgerError::ConfigMissing { .. }
            | LedgerError::ConfigInvalid { .. } => 2,
            LedgerError::PriceSource { .. } => 3,
            LedgerError::UnknownStrategy { .. }
            | LedgerError::MissingParameter { .. }
            | LedgerError::InvalidParameter { .. }
            | LedgerError::EmptyStockList => 4,
            LedgerError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
