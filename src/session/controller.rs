/*!
 * Session controller driving the analyze and rewrite operations.
 *
 * The controller owns the `SessionState` behind a mutex that is never held
 * across an oracle call. Failures are stored in the state's error slots; the
 * caller only receives an `OperationOutcome` saying what happened.
 */

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::SessionConfig;
use crate::errors::{OracleError, SessionError};
use crate::oracle::Oracle;

use super::state::{OperationKind, OperationStatus, SessionState};

/// Message stored when analyze is invoked on blank input
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter text to analyze.";

/// What an invocation did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The oracle answered and the result was stored
    Succeeded,
    /// The oracle call failed or timed out; the error slot is set
    Failed,
    /// Rejected by validation before contacting the oracle
    Rejected,
    /// The same operation is already running
    Busy,
    /// Nothing to do (rewrite without an analysis)
    Skipped,
    /// The rewrite settled after a newer analysis had started
    Discarded,
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    /// Bumped by every analysis that reaches the oracle
    generation: u64,
}

/// Resets a slot left Running when its future is dropped mid-call
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    kind: OperationKind,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(inner: &'a Mutex<Inner>, kind: OperationKind) -> Self {
        Self { inner, kind, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock();
        let slot = match self.kind {
            OperationKind::Analyze => &mut inner.state.analyze_status,
            OperationKind::Rewrite => &mut inner.state.rewrite_status,
        };
        if *slot == OperationStatus::Running {
            warn!("{} cancelled before the oracle answered", self.kind);
            *slot = OperationStatus::Idle;
        }
    }
}

/// Controller for one interactive session
#[derive(Debug)]
pub struct SessionController {
    oracle: Arc<dyn Oracle>,
    inner: Mutex<Inner>,
    timeout: Duration,
}

impl SessionController {
    /// Create a controller using the timeout from `config`
    pub fn new(oracle: Arc<dyn Oracle>, config: &SessionConfig) -> Self {
        Self::with_timeout(oracle, Duration::from_secs(config.operation_timeout_secs))
    }

    pub fn with_timeout(oracle: Arc<dyn Oracle>, timeout: Duration) -> Self {
        Self {
            oracle,
            inner: Mutex::new(Inner::default()),
            timeout,
        }
    }

    pub fn oracle(&self) -> &Arc<dyn Oracle> {
        &self.oracle
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the input text; results already shown are kept
    pub fn set_input(&self, text: impl Into<String>) {
        self.inner.lock().state.input_text = text.into();
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    /// Translate and tag the current input.
    pub async fn analyze(&self) -> OperationOutcome {
        let text = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;

            if inner.state.is_analyzing() {
                warn!("Analyze requested while one is already running");
                return OperationOutcome::Busy;
            }

            if inner.state.input_text.trim().is_empty() {
                debug!("Rejecting analyze on empty input");
                inner.state.analyze_error = Some(SessionError::Validation(EMPTY_INPUT_MESSAGE.to_string()));
                return OperationOutcome::Rejected;
            }

            inner.generation += 1;
            let state = &mut inner.state;
            state.analysis = None;
            state.rewrite = None;
            state.analyze_error = None;
            state.rewrite_error = None;
            if !state.is_rewriting() {
                state.rewrite_status = OperationStatus::Idle;
            }
            state.analyze_status = OperationStatus::Running;
            state.input_text.clone()
        };

        info!("Analyzing input ({} chars)", text.chars().count());
        let start = Instant::now();

        let in_flight = InFlight::new(&self.inner, OperationKind::Analyze);
        let result = self.bounded(self.oracle.analyze(&text)).await;
        in_flight.disarm();

        let mut inner = self.inner.lock();
        match result {
            Ok(analysis) => {
                info!("Analysis finished with {} nouns in {:.2?}", analysis.nouns.len(), start.elapsed());
                inner.state.analysis = Some(analysis);
                inner.state.analyze_status = OperationStatus::Succeeded;
                OperationOutcome::Succeeded
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                inner.state.analyze_error = Some(e.into());
                inner.state.analyze_status = OperationStatus::Failed;
                OperationOutcome::Failed
            }
        }
    }

    /// Rewrite the current input toward `target_score`.
    ///
    /// The nouns on display are sent along, so a second rewrite builds on the
    /// first one. Without an analysis this does nothing.
    pub async fn rewrite(&self, target_score: f64) -> OperationOutcome {
        let (text, nouns, generation) = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;

            if inner.state.is_rewriting() {
                warn!("Rewrite requested while one is already running");
                return OperationOutcome::Busy;
            }

            if !inner.state.can_rewrite() {
                debug!("Ignoring rewrite without an analysis");
                return OperationOutcome::Skipped;
            }

            let nouns = inner.state.nouns_for_display().map(<[_]>::to_vec).unwrap_or_default();
            let state = &mut inner.state;
            state.rewrite = None;
            state.rewrite_error = None;
            state.rewrite_status = OperationStatus::Running;
            state.last_target_score = Some(target_score);
            (state.input_text.clone(), nouns, inner.generation)
        };

        info!("Rewriting toward pH {:.1} with {} nouns", target_score, nouns.len());
        let start = Instant::now();

        let in_flight = InFlight::new(&self.inner, OperationKind::Rewrite);
        let result = self.bounded(self.oracle.rewrite(&text, &nouns, target_score)).await;
        in_flight.disarm();

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            info!("Discarding rewrite of a superseded analysis");
            inner.state.rewrite_status = OperationStatus::Idle;
            return OperationOutcome::Discarded;
        }

        match result {
            Ok(rewrite) => {
                info!("Rewrite finished with {} changes in {:.2?}", rewrite.changes.len(), start.elapsed());
                inner.state.rewrite = Some(rewrite);
                inner.state.rewrite_status = OperationStatus::Succeeded;
                OperationOutcome::Succeeded
            }
            Err(e) => {
                error!("Rewrite failed: {}", e);
                inner.state.rewrite_error = Some(e.into());
                inner.state.rewrite_status = OperationStatus::Failed;
                OperationOutcome::Failed
            }
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, OracleError>
    where
        F: Future<Output = Result<T, OracleError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(self.timeout)),
        }
    }
}
