/*!
 * Provider implementations for the LLM services backing the oracle.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API and compatible servers (LM Studio)
 * - Anthropic: Anthropic API integration
 * - Gemini: Google Generative Language API
 */

use async_trait::async_trait;
use log::error;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::time::Duration;

use reqwest::Client;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the oracle.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    ///
    /// # Arguments
    /// * `response` - The response from the provider
    ///
    /// # Returns
    /// * `String` - The extracted text
    fn extract_text(response: &Self::Response) -> String;
}

/// HTTP client with the given request timeout
pub(crate) fn http_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_default()
}

/// Check the status of `response` and return its body text
pub(crate) async fn read_success_body(
    response: reqwest::Response,
    provider_name: &str,
) -> Result<String, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("{} API error ({}): {}", provider_name, status, error_text);
        return Err(ProviderError::from_status(status.as_u16(), error_text));
    }

    response.text().await
        .map_err(|e| ProviderError::RequestFailed(format!("Failed to read {} response body: {}", provider_name, e)))
}

/// Check the status of `response` and decode its JSON body
pub(crate) async fn read_json_response<T: DeserializeOwned>(
    response: reqwest::Response,
    provider_name: &str,
) -> Result<T, ProviderError> {
    let body = read_success_body(response, provider_name).await?;

    serde_json::from_str::<T>(&body).map_err(|e| {
        error!("Failed to parse {} API response: {}. Raw response (first 500 chars): {}",
              provider_name, e, body.chars().take(500).collect::<String>());
        ProviderError::ParseError(format!("{} response: {}", provider_name, e))
    })
}

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;
