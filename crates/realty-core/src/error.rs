use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("expected column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
