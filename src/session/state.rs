/*!
 * Session state and the projections derived from it.
 *
 * `SessionState` is what the controller owns and what readers get a copy of.
 * Everything computed from the results (display nouns, gender groups, scores)
 * is a method evaluated on read, never a stored field.
 */

use crate::errors::SessionError;
use crate::nouns::{AnalysisResult, CategorizedNouns, NounRecord, RewriteResult};
use crate::scoring;

/// The two independent operation slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Analyze,
    Rewrite,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyze => write!(f, "analyze"),
            Self::Rewrite => write!(f, "rewrite"),
        }
    }
}

/// Lifecycle of one operation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// State of one interactive session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Current user input
    pub input_text: String,
    /// Last successful analysis
    pub analysis: Option<AnalysisResult>,
    /// Last successful rewrite of that analysis
    pub rewrite: Option<RewriteResult>,
    pub analyze_status: OperationStatus,
    pub rewrite_status: OperationStatus,
    pub analyze_error: Option<SessionError>,
    pub rewrite_error: Option<SessionError>,
    /// Target of the most recent rewrite request
    pub last_target_score: Option<f64>,
}

impl SessionState {
    pub fn status(&self, kind: OperationKind) -> OperationStatus {
        match kind {
            OperationKind::Analyze => self.analyze_status,
            OperationKind::Rewrite => self.rewrite_status,
        }
    }

    pub fn error(&self, kind: OperationKind) -> Option<&SessionError> {
        match kind {
            OperationKind::Analyze => self.analyze_error.as_ref(),
            OperationKind::Rewrite => self.rewrite_error.as_ref(),
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyze_status == OperationStatus::Running
    }

    pub fn is_rewriting(&self) -> bool {
        self.rewrite_status == OperationStatus::Running
    }

    /// Rewrite is offered once an analysis exists
    pub fn can_rewrite(&self) -> bool {
        self.analysis.is_some()
    }

    /// Rewritten nouns when a rewrite exists, else the analyzed ones
    pub fn nouns_for_display(&self) -> Option<&[NounRecord]> {
        self.rewrite.as_ref()
            .map(|r| r.nouns.as_slice())
            .or_else(|| self.analysis.as_ref().map(|a| a.nouns.as_slice()))
    }

    pub fn categorized_nouns(&self) -> CategorizedNouns {
        CategorizedNouns::from_nouns(self.nouns_for_display())
    }

    /// Score of the original analysis, unaffected by rewrites
    pub fn displayed_score(&self) -> Option<f64> {
        self.analysis.as_ref().and_then(|a| scoring::score(&a.nouns))
    }

    /// Score of the rewritten nouns
    pub fn rewrite_score(&self) -> Option<f64> {
        self.rewrite.as_ref().and_then(|r| scoring::score(&r.nouns))
    }

    /// Whether the displayed nouns come from a rewrite
    pub fn is_rewritten(&self) -> bool {
        self.rewrite.is_some()
    }
}
