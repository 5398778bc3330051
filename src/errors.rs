/*!
 * Error types for the nounph application.
 *
 * Errors are layered: LLM transports fail with `ProviderError`, the oracle
 * wraps those together with payload problems in `OracleError`, and the
 * session controller reduces everything to a cloneable `SessionError` that it
 * stores in its error slots instead of returning it.
 */

use std::time::Duration;
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
}

impl ProviderError {
    /// Classify a non-success HTTP status
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Classify a reqwest send failure; the request URL is stripped from the message
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        let error = error.without_url();
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while asking the oracle to analyze or rewrite
#[derive(Error, Debug)]
pub enum OracleError {
    /// The underlying LLM transport failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The completion did not contain the expected JSON payload
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    /// The completion was empty
    #[error("Oracle returned an empty response")]
    EmptyResponse,

    /// The call did not settle in time
    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure recorded in a session's error slot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The request was rejected before contacting the oracle
    #[error("{0}")]
    Validation(String),

    /// The oracle call failed
    #[error("{0}")]
    Oracle(String),
}

impl SessionError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<OracleError> for SessionError {
    fn from(error: OracleError) -> Self {
        Self::Oracle(error.to_string())
    }
}
