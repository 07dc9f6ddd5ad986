//! Direction B: workload events pull in matching ConfigMaps.
//!
//! When a workload appears or changes, every environment-variable ConfigMap
//! in the namespace that targets it is applied, so a workload created after
//! its configuration still converges to the same state as direction A.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use tracing::debug;
use workloads::{Workload, Workloads};

use crate::env::apply_to_workload;
use crate::error::OperatorError;
use crate::labels::{KIND_ENV_VARS, KIND_LABEL, TargetSpec, resolve_target};
use crate::operator::EnvVarOperator;

/// Checks whether any ConfigMaps carry environment variables for a workload
/// and applies them. One instance per workload kind.
pub struct WorkloadOperator<K> {
    config_maps: Api<ConfigMap>,
    workloads: Workloads<K>,
}

impl<K: Workload> WorkloadOperator<K> {
    /// Binds the operator to a namespace.
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            config_maps: Api::namespaced(client.clone(), namespace),
            workloads: Workloads::new(client, namespace),
        }
    }

    /// Applies every eligible ConfigMap that targets this workload, then
    /// replaces the workload if anything changed.
    async fn workload_upserted(&self, workload: &K) -> Result<(), OperatorError> {
        let params = ListParams::default().labels(&format!("{KIND_LABEL}={KIND_ENV_VARS}"));
        let config_maps = self.config_maps.list(&params).await?.items;

        let mut current = workload.clone();
        let mut changed = false;

        for config_map in &config_maps {
            if !configmap_targets_workload(config_map, &current) {
                continue;
            }
            debug!(
                "Applying ConfigMap {} to {} {}",
                config_map.name_any(),
                K::KIND,
                current.name_any()
            );
            let data = config_map.data.clone().unwrap_or_default();
            changed |= apply_to_workload(&mut current, &data, false);
        }

        if changed {
            self.workloads.replace(&current).await?;
        }
        Ok(())
    }
}

/// True iff the ConfigMap's resolved target addresses this workload, either
/// by name or by label selector. ConfigMaps without target labels address
/// nothing.
pub(crate) fn configmap_targets_workload<K: Workload>(config_map: &ConfigMap, workload: &K) -> bool {
    match resolve_target(config_map) {
        Some(TargetSpec::Name(name)) => workload.name_any() == name,
        Some(TargetSpec::Selector(selector)) => selector.matches(workload.labels()),
        None => false,
    }
}

#[async_trait]
impl<K: Workload> EnvVarOperator<K> for WorkloadOperator<K> {
    async fn on_added(&self, workload: &K) -> Result<(), OperatorError> {
        self.workload_upserted(workload).await
    }

    async fn on_modified(&self, workload: &K) -> Result<(), OperatorError> {
        self.workload_upserted(workload).await
    }

    /// Deleting a workload never needs to touch a ConfigMap.
    async fn on_deleted(&self, _workload: &K) -> Result<(), OperatorError> {
        Ok(())
    }
}
