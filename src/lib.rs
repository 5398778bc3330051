/*!
 * # nounph - the pH of German nouns
 *
 * Translates text into German, tags every noun with its grammatical gender and
 * condenses the balance of masculine and feminine nouns into a "pH" between
 * 1 (all masculine) and 14 (all feminine), 7 being neutral. A text can then be
 * rewritten so that its translation moves toward a chosen pH.
 *
 * ## Features
 *
 * - Translation and gender tagging through an LLM oracle:
 *   - Google Gemini (default)
 *   - Ollama (local LLM)
 *   - OpenAI API and LM Studio
 *   - Anthropic API
 * - Deterministic gender score with neuter dampening
 * - Rewrites toward a target score that compose on earlier rewrites
 * - Terminal rendering of the gauge, noun lists and highlighted changes
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `nouns`: Noun records and oracle results
 * - `scoring`: The gender score and its presentation bands
 * - `oracle`: The analyze/rewrite contract and its LLM implementation:
 *   - `oracle::payload`: Lenient decoding of completions
 *   - `oracle::prompts`: Prompt templates
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::gemini`: Google Gemini API client
 * - `session`: Session state and the controller running operations
 * - `display`: Terminal rendering
 * - `repl`: Line commands of the interactive session
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod display;
pub mod errors;
pub mod nouns;
pub mod oracle;
pub mod providers;
pub mod repl;
pub mod scoring;
pub mod session;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{OracleError, ProviderError, SessionError};
pub use nouns::{AnalysisResult, CategorizedNouns, GenderMarker, NounRecord, RewriteChange, RewriteResult};
pub use oracle::{LlmOracle, Oracle};
pub use scoring::score;
pub use session::{OperationOutcome, SessionController, SessionState};
