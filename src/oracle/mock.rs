/*!
 * Mock oracle implementations for testing.
 *
 * This module provides a mock oracle that simulates different behaviors:
 * - `MockOracle::working()` - Always succeeds with a canned German analysis
 * - `MockOracle::malformed()` - Succeeds but includes unusable noun entries
 * - `MockOracle::failing()` - Always fails with an error
 * - `MockOracle::slow(ms)` - Succeeds after a delay
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::payload::{parse_analysis, parse_rewrite};
use super::Oracle;
use crate::errors::{OracleError, ProviderError};
use crate::nouns::{AnalysisResult, GenderMarker, NounRecord, RewriteChange, RewriteResult};

/// Behavior mode for the mock oracle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Succeeds, but the completion carries entries that must be dropped
    Malformed,
    /// Always fails with an error
    Failing,
    /// Simulates a slow oracle (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock oracle for testing session behavior
#[derive(Debug)]
pub struct MockOracle {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of analyze and rewrite calls received, shared between clones
    request_count: Arc<AtomicUsize>,
}

/// "Mein Vater fährt das Auto und meine Mutter spielt mit der Katze."
const CANNED_ANALYSIS: &str = r#"{
    "germanTranslation": "Mein Vater fährt das Auto und meine Mutter spielt mit der Katze.",
    "nouns": [
        {"germanWord": "Vater", "article": "der", "translation": "father"},
        {"germanWord": "Auto", "article": "das", "translation": "car"},
        {"germanWord": "Mutter", "article": "die", "translation": "mother"},
        {"germanWord": "Katze", "article": "die", "translation": "cat"}
    ]
}"#;

const MALFORMED_ANALYSIS: &str = r#"Sure! ```json
{
    "germanTranslation": "Das Kind liest ein Buch.",
    "nouns": [
        {"germanWord": "Kind", "article": "das", "translation": "child"},
        {"germanWord": "Buch", "article": "unknown", "translation": "book"},
        {"germanWord": "Seite", "article": "die"}
    ]
}
```"#;

const MALFORMED_REWRITE: &str = r#"{
    "rewrittenText": "The daughter reads a story.",
    "rewrittenGerman": "Die Tochter liest eine Geschichte.",
    "changes": [{"originalWord": "child", "rewrittenWord": "daughter"}, {"from": "book"}],
    "newNouns": [
        {"germanWord": "Tochter", "article": "die", "translation": "daughter"},
        {"germanWord": "Geschichte", "article": "plural", "translation": "story"}
    ]
}"#;

impl MockOracle {
    /// Create a new mock oracle with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock oracle that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock whose completions contain unusable entries
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create a failing mock oracle that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Canned rewrite: every masculine noun becomes a feminine one when the
    /// target is above neutral, and the other way round below it.
    fn canned_rewrite(text: &str, nouns: &[NounRecord], target_score: f64) -> RewriteResult {
        let (from, to) = if target_score >= 7.0 {
            (GenderMarker::Masculine, GenderMarker::Feminine)
        } else {
            (GenderMarker::Feminine, GenderMarker::Masculine)
        };

        let mut changes = Vec::new();
        let new_nouns = nouns.iter()
            .map(|noun| {
                if noun.gender != from {
                    return noun.clone();
                }
                let replacement = format!("{}-{}", noun.word, to.article());
                changes.push(RewriteChange::new(&noun.translation, format!("{} ({})", noun.translation, to.name())));
                NounRecord::new(replacement, to, &noun.translation)
            })
            .collect();

        RewriteResult {
            rewritten_text: format!("{} [rewritten toward {:.1}]", text, target_score),
            rewritten_translated_text: format!("[DE] {}", text),
            changes,
            nouns: new_nouns,
        }
    }

    async fn settle(&self) -> Result<(), OracleError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Failing => Err(OracleError::Provider(ProviderError::ApiError {
                message: "Simulated oracle failure".to_string(),
                status_code: 500,
            })),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(())
            }
            MockBehavior::Working | MockBehavior::Malformed => Ok(()),
        }
    }
}

impl Clone for MockOracle {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
        }
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn analyze(&self, _text: &str) -> Result<AnalysisResult, OracleError> {
        self.settle().await?;
        match self.behavior {
            MockBehavior::Malformed => parse_analysis(MALFORMED_ANALYSIS),
            _ => parse_analysis(CANNED_ANALYSIS),
        }
    }

    async fn rewrite(
        &self,
        text: &str,
        current_nouns: &[NounRecord],
        target_score: f64,
    ) -> Result<RewriteResult, OracleError> {
        self.settle().await?;
        match self.behavior {
            MockBehavior::Malformed => parse_rewrite(MALFORMED_REWRITE),
            _ => Ok(Self::canned_rewrite(text, current_nouns, target_score)),
        }
    }
}
