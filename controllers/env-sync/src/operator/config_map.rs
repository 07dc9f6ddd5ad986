//! Direction A: ConfigMap events drive workload updates.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Client, ResourceExt};
use tracing::debug;
use workloads::{DeploymentConfig, Workload, Workloads};

use crate::env::apply_to_workload;
use crate::error::OperatorError;
use crate::labels::{TargetSpec, resolve_target};
use crate::operator::EnvVarOperator;

/// Takes the payload of a ConfigMap and sets environment variables in the
/// containers of the workloads its target labels address. Handles both
/// workload kinds through one generic path.
pub struct ConfigMapOperator {
    deployments: Workloads<Deployment>,
    deployment_configs: Workloads<DeploymentConfig>,
}

impl ConfigMapOperator {
    /// Binds the operator to a namespace.
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            deployments: Workloads::new(client.clone(), namespace),
            deployment_configs: Workloads::new(client, namespace),
        }
    }

    /// Keeps the env vars of every matching workload in sync with one
    /// ConfigMap, removing them instead when `remove` is set.
    async fn sync(&self, config_map: &ConfigMap, remove: bool) -> Result<(), OperatorError> {
        let Some(target) = resolve_target(config_map) else {
            return Err(OperatorError::NoTargetLabel(format!(
                "Ignoring ConfigMap {} as it has no label identifying a target workload",
                config_map.name_any()
            )));
        };

        let data = config_map.data.clone().unwrap_or_default();

        sync_kind(&self.deployments, &target, &data, remove).await?;
        sync_kind(&self.deployment_configs, &target, &data, remove).await?;
        Ok(())
    }
}

/// Fetches the workloads addressed by `target` and reconciles each one,
/// replacing only those that changed. A name target that resolves to no
/// object is skipped silently.
async fn sync_kind<K: Workload>(
    accessor: &Workloads<K>,
    target: &TargetSpec,
    data: &BTreeMap<String, String>,
    remove: bool,
) -> Result<(), OperatorError> {
    let workloads = match target {
        TargetSpec::Selector(selector) => {
            accessor
                .list_by_label(&selector.key, &selector.value)
                .await?
        }
        TargetSpec::Name(name) => accessor.get_by_name(name).await?.into_iter().collect(),
    };

    for mut workload in workloads {
        if apply_to_workload(&mut workload, data, remove) {
            accessor.replace(&workload).await?;
        } else {
            debug!("{} {} already in sync", K::KIND, workload.name_any());
        }
    }
    Ok(())
}

#[async_trait]
impl EnvVarOperator<ConfigMap> for ConfigMapOperator {
    async fn on_added(&self, config_map: &ConfigMap) -> Result<(), OperatorError> {
        self.sync(config_map, false).await
    }

    /// Re-applies the full current data as an upsert. Keys dropped since a
    /// prior revision stay applied: the event does not carry the old data,
    /// so only deletion of the ConfigMap purges previously applied entries.
    async fn on_modified(&self, config_map: &ConfigMap) -> Result<(), OperatorError> {
        self.sync(config_map, false).await
    }

    async fn on_deleted(&self, config_map: &ConfigMap) -> Result<(), OperatorError> {
        self.sync(config_map, true).await
    }
}
