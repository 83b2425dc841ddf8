use thiserror::Error;

/// Failure taxonomy for the extraction/export pipeline.
///
/// The presentation layer renders every variant as one reported failure;
/// only logs distinguish a dead database from a malformed row.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("database connectivity failure: {0}")]
    Connectivity(#[from] sqlx::Error),

    #[error("unexpected data shape: {0}")]
    DataShape(String),

    #[error("xlsx serialization failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
