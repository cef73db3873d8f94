#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("http request failed: {0}")]
    Http(reqwest::Error),
    #[error("telegram api error: {0}")]
    Telegram(String),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type ConverterResult<T> = std::result::Result<T, ConverterError>;

/// Request URLs carry the bot token and shortener API keys, so they never reach the error.
impl From<reqwest::Error> for ConverterError {
    fn from(e: reqwest::Error) -> Self {
        ConverterError::Http(e.without_url())
    }
}
