use thiserror::Error;

#[derive(Error, Debug)]
pub enum IvrError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetRead(#[from] calamine::XlsxError),

    #[error("Spreadsheet write error: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Corrupt store at row {row}: {reason}")]
    CorruptStore { row: usize, reason: String },

    #[error("Call_ID {0} already exists")]
    DuplicateCallId(i64),

    #[error("Store task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// A payload that parsed but breaks a field constraint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between 0 and 1 inclusive, got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{field} is {len} characters long, the limit is {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}
