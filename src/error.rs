//! Error types for registration, execution, and candidate failures.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error returned by fallible workloads.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced to the caller of [`Suite`](crate::Suite) operations.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// A candidate with this name is already registered.
    #[error("candidate `{name}` is already registered")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// The suite has already been run and cannot be reused.
    #[error("suite has already been run; construct a new suite to rerun")]
    AlreadyRun,

    /// `run` was called before any candidate was registered.
    #[error("suite has no candidates")]
    NoCandidates,

    /// The run configuration failed validation.
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),
}

/// Which candidate callable was executing when a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Per-batch setup hook.
    Setup,
    /// The timed work function.
    Invoke,
    /// Per-batch teardown hook.
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => write!(f, "setup"),
            Phase::Invoke => write!(f, "work function"),
            Phase::Teardown => write!(f, "teardown"),
        }
    }
}

/// How a candidate callable failed.
#[derive(Debug, Error)]
pub enum FailureKind {
    /// The callable returned an error.
    #[error("{0}")]
    Error(BoxError),

    /// The callable panicked.
    #[error("panicked: {0}")]
    Panic(String),
}

/// A candidate callable failed during sampling.
///
/// Carried by `on_candidate_failed` and summarized in reports as a
/// [`CandidateFailure`](crate::CandidateFailure).
#[derive(Debug, Error)]
#[error("{phase} failed: {kind}")]
pub struct WorkFailure {
    /// Where the failure happened.
    pub phase: Phase,
    /// The underlying error or panic message.
    #[source]
    pub kind: FailureKind,
}

impl WorkFailure {
    /// Failure from a returned error.
    pub fn error(phase: Phase, source: BoxError) -> Self {
        Self {
            phase,
            kind: FailureKind::Error(source),
        }
    }

    /// Failure from a caught panic payload.
    pub fn panic(phase: Phase, payload: Box<dyn Any + Send>) -> Self {
        Self {
            phase,
            kind: FailureKind::Panic(panic_message(payload.as_ref())),
        }
    }

    /// Whether the failure was a panic rather than a returned error.
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, FailureKind::Panic(_))
    }
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
