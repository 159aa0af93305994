use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("market data error: {0}")]
    Vantage(#[from] vantage::VantageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("terminal error: {0}")]
    Terminal(String),
}
