/*!
 * Oracle backed by an LLM provider.
 *
 * Each call renders a prompt, asks the configured provider for a JSON-only
 * completion and decodes it with `oracle::payload`.
 */

use async_trait::async_trait;
use log::{debug, info};
use std::time::Instant;

use super::payload::{parse_analysis, parse_rewrite};
use super::prompts::{Prompt, PromptTemplate};
use super::Oracle;
use crate::app_config::{Config, OracleCommonConfig, OracleConfig, OracleProvider};
use crate::errors::{OracleError, ProviderError};
use crate::nouns::{AnalysisResult, NounRecord, RewriteResult};
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::gemini::{Gemini, GeminiRequest};
use crate::providers::ollama::{ChatMessage, ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;

/// Provider implementation variants
#[derive(Debug)]
enum Backend {
    Ollama { client: Ollama },
    OpenAI { client: OpenAI },
    /// LM Studio local server (OpenAI-compatible, no JSON mode)
    LMStudio { client: OpenAI },
    Anthropic { client: Anthropic },
    Gemini { client: Gemini },
}

/// LLM-backed oracle
#[derive(Debug)]
pub struct LlmOracle {
    backend: Backend,
    provider: OracleProvider,
    model: String,
    common: OracleCommonConfig,
    prompts: PromptTemplate,
}

impl LlmOracle {
    /// Create an oracle for the active provider of `config`
    pub fn new(config: &OracleConfig, gloss_language: &str) -> Self {
        let model = config.get_model();
        let endpoint = config.get_endpoint();
        let api_key = config.get_api_key();
        let timeout_secs = config.get_timeout_secs();

        let backend = match config.provider {
            OracleProvider::Ollama => Backend::Ollama {
                client: Ollama::new(&endpoint, timeout_secs),
            },
            OracleProvider::OpenAI => Backend::OpenAI {
                client: OpenAI::new(api_key, endpoint, &model, timeout_secs),
            },
            OracleProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = if api_key.is_empty() { "lm-studio".to_string() } else { api_key };
                Backend::LMStudio {
                    client: OpenAI::new(api_key, endpoint, &model, timeout_secs),
                }
            }
            OracleProvider::Anthropic => Backend::Anthropic {
                client: Anthropic::new(api_key, endpoint, &model, timeout_secs),
            },
            OracleProvider::Gemini => Backend::Gemini {
                client: Gemini::new(api_key, endpoint, &model, timeout_secs),
            },
        };

        Self {
            backend,
            provider: config.provider.clone(),
            model,
            common: config.common.clone(),
            prompts: PromptTemplate::new(gloss_language),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.oracle, &config.gloss_language)
    }

    pub fn provider(&self) -> &OracleProvider {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one JSON-only completion and return its text
    async fn complete_text(&self, prompt: &Prompt, temperature: f32) -> Result<String, ProviderError> {
        let max_tokens = self.common.max_tokens;

        let text = match &self.backend {
            Backend::Ollama { client } => {
                let messages = vec![
                    ChatMessage { role: "system".to_string(), content: prompt.system.clone() },
                    ChatMessage { role: "user".to_string(), content: prompt.user.clone() },
                ];
                let request = ChatRequest::new(&self.model, messages)
                    .temperature(temperature)
                    .num_predict(max_tokens)
                    .format("json");
                Ollama::extract_text(&client.complete(request).await?)
            }
            Backend::OpenAI { client } | Backend::LMStudio { client } => {
                let mut request = OpenAIRequest::new(&self.model)
                    .add_message("system", &prompt.system)
                    .add_message("user", &prompt.user)
                    .temperature(temperature)
                    .max_tokens(max_tokens);
                if matches!(self.backend, Backend::OpenAI { .. }) {
                    request = request.json_mode();
                }
                OpenAI::extract_text(&client.complete(request).await?)
            }
            Backend::Anthropic { client } => {
                let request = AnthropicRequest::new(&self.model, max_tokens)
                    .system(&prompt.system)
                    .add_message("user", &prompt.user)
                    .temperature(temperature);
                Anthropic::extract_text(&client.complete(request).await?)
            }
            Backend::Gemini { client } => {
                let request = GeminiRequest::new(&prompt.user)
                    .system(&prompt.system)
                    .temperature(temperature)
                    .max_output_tokens(max_tokens)
                    .json_output();
                Gemini::extract_text(&client.complete(request).await?)
            }
        };

        Ok(text)
    }
}

#[async_trait]
impl Oracle for LlmOracle {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, OracleError> {
        info!("Analyzing {} chars with {} ({})", text.chars().count(), self.provider.display_name(), self.model);
        let start = Instant::now();

        let prompt = self.prompts.analysis(text);
        let completion = self.complete_text(&prompt, self.common.temperature).await?;
        let result = parse_analysis(&completion)?;

        debug!("Analysis returned {} nouns in {:.2?}", result.nouns.len(), start.elapsed());
        Ok(result)
    }

    async fn rewrite(
        &self,
        text: &str,
        current_nouns: &[NounRecord],
        target_score: f64,
    ) -> Result<RewriteResult, OracleError> {
        info!("Rewriting toward pH {} with {} ({})", target_score, self.provider.display_name(), self.model);
        let start = Instant::now();

        let prompt = self.prompts.rewrite(text, current_nouns, target_score);
        let completion = self.complete_text(&prompt, self.common.rewrite_temperature).await?;
        let result = parse_rewrite(&completion)?;

        debug!("Rewrite made {} changes in {:.2?}", result.changes.len(), start.elapsed());
        Ok(result)
    }

    async fn test_connection(&self) -> Result<(), OracleError> {
        let result = match &self.backend {
            Backend::Ollama { client } => client.test_connection().await,
            Backend::OpenAI { client } | Backend::LMStudio { client } => client.test_connection().await,
            Backend::Anthropic { client } => client.test_connection().await,
            Backend::Gemini { client } => client.test_connection().await,
        };
        result.map_err(OracleError::from)
    }
}
