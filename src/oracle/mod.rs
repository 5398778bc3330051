/*!
 * The oracle: the external service that translates, tags and rewrites.
 *
 * The session controller only sees the `Oracle` trait. `LlmOracle` realizes it
 * on top of one of the LLM providers; tests substitute `MockOracle` or their
 * own scripted implementations.
 *
 * - `payload`: decoding and validation of oracle completions
 * - `prompts`: prompt templates for both calls
 * - `llm`: the provider-backed implementation
 * - `mock`: canned responses for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::OracleError;
use crate::nouns::{AnalysisResult, NounRecord, RewriteResult};

/// Analysis and rewrite requests against the external oracle
#[async_trait]
pub trait Oracle: Send + Sync + Debug {
    /// Translate `text` into German and tag the nouns of the translation
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, OracleError>;

    /// Rewrite `text` so the genders of its translated nouns move toward `target_score`
    async fn rewrite(
        &self,
        text: &str,
        current_nouns: &[NounRecord],
        target_score: f64,
    ) -> Result<RewriteResult, OracleError>;

    /// Check that the oracle is reachable
    async fn test_connection(&self) -> Result<(), OracleError> {
        Ok(())
    }
}

pub mod llm;
pub mod mock;
pub mod payload;
pub mod prompts;

pub use llm::LlmOracle;
pub use mock::{MockBehavior, MockOracle};
pub use prompts::{Prompt, PromptTemplate};
