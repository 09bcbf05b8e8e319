use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Invalid Riot ID format: {0:?}. Use format: Name#TAG")]
    InvalidRiotId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl AppError {
    /// Failures caused by the Riot API itself or the transport to it.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::RateLimited | AppError::HttpError(_) | AppError::JsonError(_)
        )
    }
}
