/*!
 * Scripted oracle for session tests
 *
 * Replies are queued per operation and returned in order. Every call is
 * recorded so tests can check what the controller sent, and that nothing was
 * sent at all when validation should have stopped it.
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nounph::errors::{OracleError, ProviderError};
use nounph::nouns::{AnalysisResult, NounRecord, RewriteResult};
use nounph::oracle::payload::{parse_analysis, parse_rewrite};
use nounph::oracle::Oracle;

/// What the oracle does for one call
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with this completion text
    Completion(String),
    /// Answer with this completion text after a delay
    Delayed(String, Duration),
    /// Fail with an API error carrying this message
    Fail(String),
    /// Never answer
    Hang,
}

/// A call received by the oracle
#[derive(Debug, Clone, PartialEq)]
pub enum OracleCall {
    Analyze {
        text: String,
    },
    Rewrite {
        text: String,
        nouns: Vec<NounRecord>,
        target_score: f64,
    },
}

#[derive(Debug, Default)]
struct Script {
    analyze: VecDeque<Reply>,
    rewrite: VecDeque<Reply>,
    calls: Vec<OracleCall>,
}

/// Oracle answering from queued replies; clones share the script
#[derive(Debug, Clone, Default)]
pub struct ScriptedOracle {
    script: Arc<Mutex<Script>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next analyze call
    pub fn on_analyze(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().analyze.push_back(reply);
        self
    }

    /// Queue a reply for the next rewrite call
    pub fn on_rewrite(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().rewrite.push_back(reply);
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<OracleCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    /// The last rewrite call, if any
    pub fn last_rewrite(&self) -> Option<OracleCall> {
        self.calls().into_iter().rev().find(|c| matches!(c, OracleCall::Rewrite { .. }))
    }

    async fn play(reply: Option<Reply>) -> Result<String, OracleError> {
        match reply {
            Some(Reply::Completion(text)) => Ok(text),
            Some(Reply::Delayed(text, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Reply::Fail(message)) => Err(OracleError::Provider(ProviderError::ApiError {
                status_code: 500,
                message,
            })),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(OracleError::Provider(ProviderError::RequestFailed(
                "no scripted reply".to_string(),
            ))),
        }
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, OracleError> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(OracleCall::Analyze { text: text.to_string() });
            script.analyze.pop_front()
        };
        let completion = Self::play(reply).await?;
        parse_analysis(&completion)
    }

    async fn rewrite(
        &self,
        text: &str,
        current_nouns: &[NounRecord],
        target_score: f64,
    ) -> Result<RewriteResult, OracleError> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(OracleCall::Rewrite {
                text: text.to_string(),
                nouns: current_nouns.to_vec(),
                target_score,
            });
            script.rewrite.pop_front()
        };
        let completion = Self::play(reply).await?;
        parse_rewrite(&completion)
    }
}
