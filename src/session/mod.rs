/*!
 * Interactive session management.
 *
 * This module provides:
 * - `SessionState`: the snapshot of input, results, statuses and errors
 * - `SessionController`: runs analyze and rewrite against an oracle
 */

pub mod controller;
pub mod state;

pub use controller::{OperationOutcome, SessionController, EMPTY_INPUT_MESSAGE};
pub use state::{OperationKind, OperationStatus, SessionState};
