//! Controller-specific error types.
//!
//! This module defines the error taxonomy of the env-sync controller.
//! Everything except `MalformedPredicate` is recoverable: per-event failures
//! are logged by the watcher and never escalate to the process.

use thiserror::Error;

use kube::Error as KubeError;

/// Errors that can occur in the env-sync controller.
#[derive(Debug, Error)]
pub enum OperatorError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// The ConfigMap carries no target-addressing label. Routine, not
    /// exceptional: the watcher logs a warning and skips the event.
    #[error("No target label: {0}")]
    NoTargetLabel(String),

    /// A `key=value` predicate string without a `=`. Fatal at watcher
    /// configuration time.
    #[error("Malformed label predicate: {0}")]
    MalformedPredicate(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
