/*!
 * Error types for the weblingo application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Translation-quality problems (bad JSON, wrong ids, broken placeholders) are not
 * errors at this level: the translator folds them into retries and fallbacks.
 * Only transport failures and contract violations are represented here.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not finish within the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Stable short name of the error variant, used in failure reasons
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestFailed(_) => "RequestFailed",
            Self::ParseError(_) => "ParseError",
            Self::ApiError { .. } => "ApiError",
            Self::ConnectionError(_) => "ConnectionError",
            Self::RateLimitExceeded(_) => "RateLimitExceeded",
            Self::AuthenticationError(_) => "AuthenticationError",
            Self::Timeout(_) => "Timeout",
        }
    }
}

/// Errors that can escape a translation run
///
/// These indicate a broken contract between extraction and translation,
/// never a bad model answer.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// A translated id has no token map registered
    #[error("No token map registered for item '{0}'")]
    MissingTokenMap(String),

    /// A translated id does not belong to any part or attribute
    #[error("Translated item '{0}' has no owning part or attribute")]
    UnknownItem(String),

    /// The translation cache could not be opened or closed
    #[error("Translation cache error: {0}")]
    Cache(String),
}
