use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Failed to fetch content: {0}")]
    FetchError(String),

    #[error("URL is not an embeddable {platform} post: {url}")]
    InvalidPostUrl { platform: String, url: String },

    #[error("Embed markup rejected: {0}")]
    MarkupError(String),

    #[error("Embed load timed out: {0}")]
    TimeoutError(String),

    #[error("External service error: {service} - {message}")]
    ExternalServiceError { service: String, message: String },
}

impl EmbedError {
    pub fn log(&self) {
        match self {
            EmbedError::UrlParseError(e) => {
                warn!(error = %e, "URL parsing failed");
            }
            EmbedError::FetchError(e) => {
                error!(error = %e, "Content fetch failed");
            }
            EmbedError::InvalidPostUrl { platform, url } => {
                warn!(platform = %platform, url = %url, "URL does not match an embeddable post pattern");
            }
            EmbedError::MarkupError(e) => {
                warn!(error = %e, "Embed markup rejected");
            }
            EmbedError::TimeoutError(e) => {
                warn!(error = %e, "Embed load timed out");
            }
            EmbedError::ExternalServiceError { service, message } => {
                error!(
                    service = %service,
                    error = %message,
                    "External service error occurred"
                );
            }
        }
    }
}
