use thiserror::Error;

/// Main error type for the RiskDeck system
#[derive(Error, Debug)]
pub enum RdError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by market data providers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Data source not found: {0}")]
    SourceNotFound(String),

    #[error("Symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("No data returned for symbol {symbol}")]
    NoData { symbol: String },

    #[error("Data parsing error: {message}")]
    ParseError { message: String },

    #[error("Fetch for {symbol} timed out after {timeout_seconds} seconds")]
    Timeout { symbol: String, timeout_seconds: u64 },
}

/// Errors raised by the return calculator and the rolling statistics
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Invalid window size {window}: must be at least 2")]
    InvalidWindow { window: usize },

    #[error("Invalid probability {probability}: must lie strictly between 0 and 1")]
    InvalidProbability { probability: f64 },

    #[error("Invalid metrics configuration: {message}")]
    InvalidConfig { message: String },
}

impl MetricsError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        MetricsError::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type alias for RiskDeck operations
pub type RdResult<T> = Result<T, RdError>;

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::RdError::Config(format!($($arg)*))
    };
}

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::RdError::Internal(format!($($arg)*))
    };
}
