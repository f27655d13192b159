use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Source file missing, unreadable, or not parseable as delimited text.
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Required column missing or entirely unparseable.
    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for DashboardError {
    fn from(err: polars::error::PolarsError) -> Self {
        DashboardError::Polars(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
