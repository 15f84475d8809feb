use thiserror::Error;

use crate::proof::capture::ProofValidationError;
use crate::telegram::bot_api::BotApiError;
use crate::telegram::webapp_auth::InitDataError;

/// Centralized error types for the application
///
/// Every fallible operation in the crate ends up here so the composition root
/// and the terminal host handle one type. Uses `thiserror` for automatic
/// conversion and display formatting.
///
/// # Example
///
/// ```no_run
/// use dvtrusted::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram Bot API errors (platform-rejected or network failure)
    #[error("Telegram error: {0}")]
    Telegram(#[from] BotApiError),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Proof file rejected by client-side validation
    #[error("Validation error: {0}")]
    Validation(#[from] ProofValidationError),

    /// Mini App init data could not be parsed or verified
    #[error("Init data error: {0}")]
    InitData(#[from] InitDataError),

    /// No platform identity and demo mode is disabled
    #[error("No Telegram user in launch context")]
    MissingIdentity,

    /// Account record expected but not found
    #[error("Account {0} not found")]
    AccountNotFound(String),

    /// Stored document does not match the account schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
