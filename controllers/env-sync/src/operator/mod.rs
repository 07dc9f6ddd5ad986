//! Reconciliation operators.
//!
//! Two symmetric directions trigger the same core algorithm:
//! [`ConfigMapOperator`] reacts to ConfigMap events and pushes env vars into
//! matching workloads; [`WorkloadOperator`] reacts to workload events and
//! pulls in the ConfigMaps that target them. Given identical label and data
//! state, both converge to identical container state.

mod config_map;
mod workload;


pub use config_map::ConfigMapOperator;
pub use workload::WorkloadOperator;

use async_trait::async_trait;

use crate::error::OperatorError;

/// Handles the watch-event lifecycle of one resource kind.
#[async_trait]
pub trait EnvVarOperator<K>: Send + Sync {
    /// A new object appeared (including synthetic adds on watch start).
    async fn on_added(&self, object: &K) -> Result<(), OperatorError>;

    /// An existing object changed.
    async fn on_modified(&self, object: &K) -> Result<(), OperatorError>;

    /// An object was deleted.
    async fn on_deleted(&self, object: &K) -> Result<(), OperatorError>;
}
