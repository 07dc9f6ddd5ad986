//! Main controller implementation.
//!
//! This module contains the `Controller` struct that builds the Kubernetes
//! client, wires the operators to their watchers, and runs the three
//! watcher tasks until shutdown: ConfigMaps (direction A), Deployments and
//! DeploymentConfigs (direction B).

use std::time::Duration;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use workloads::DeploymentConfig;

use crate::error::OperatorError;
use crate::labels::LabelPredicate;
use crate::operator::{ConfigMapOperator, WorkloadOperator};
use crate::watcher::EventWatcher;

/// Grace period granted to watcher tasks on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Main controller for environment-variable synchronization.
pub struct Controller {
    config_map_watcher: JoinHandle<Result<(), OperatorError>>,
    deployment_watcher: JoinHandle<Result<(), OperatorError>>,
    deployment_config_watcher: JoinHandle<Result<(), OperatorError>>,
    shutdown: CancellationToken,
}

impl Controller {
    /// Creates a new controller instance watching one namespace.
    ///
    /// `config_map_predicate` is the `key=value` label filter for ConfigMap
    /// events; a malformed predicate fails startup.
    pub async fn new(namespace: String, config_map_predicate: &str) -> Result<Self, OperatorError> {
        info!("Initializing env-sync controller");

        let predicate = LabelPredicate::parse(config_map_predicate)?;

        // One client for the whole process, injected into every component
        let client = Client::try_default().await?;

        let config_map_api: Api<ConfigMap> = Api::namespaced(client.clone(), &namespace);
        let deployment_api: Api<Deployment> = Api::namespaced(client.clone(), &namespace);
        let deployment_config_api: Api<DeploymentConfig> =
            Api::namespaced(client.clone(), &namespace);

        let shutdown = CancellationToken::new();

        let config_map_watcher = {
            let watcher = EventWatcher::new(
                config_map_api,
                ConfigMapOperator::new(client.clone(), &namespace),
                Some(predicate),
                "ConfigMap",
            );
            let shutdown = shutdown.clone();
            tokio::spawn(async move { watcher.run(shutdown).await })
        };

        let deployment_watcher = {
            let watcher = EventWatcher::new(
                deployment_api,
                WorkloadOperator::<Deployment>::new(client.clone(), &namespace),
                None,
                "Deployment",
            );
            let shutdown = shutdown.clone();
            tokio::spawn(async move { watcher.run(shutdown).await })
        };

        let deployment_config_watcher = {
            let watcher = EventWatcher::new(
                deployment_config_api,
                WorkloadOperator::<DeploymentConfig>::new(client, &namespace),
                None,
                "DeploymentConfig",
            );
            let shutdown = shutdown.clone();
            tokio::spawn(async move { watcher.run(shutdown).await })
        };

        Ok(Self {
            config_map_watcher,
            deployment_watcher,
            deployment_config_watcher,
            shutdown,
        })
    }

    /// Runs the controller until a watcher exits or SIGINT arrives.
    pub async fn run(mut self) -> Result<(), OperatorError> {
        info!("env-sync controller running");

        // Watchers run until shutdown; one exiting on its own is fatal
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
            }
            result = &mut self.config_map_watcher => {
                result.map_err(|e| OperatorError::Watch(format!("ConfigMap watcher panicked: {e}")))?
                    .map_err(|e| OperatorError::Watch(format!("ConfigMap watcher error: {e}")))?;
                return Ok(());
            }
            result = &mut self.deployment_watcher => {
                result.map_err(|e| OperatorError::Watch(format!("Deployment watcher panicked: {e}")))?
                    .map_err(|e| OperatorError::Watch(format!("Deployment watcher error: {e}")))?;
                return Ok(());
            }
            result = &mut self.deployment_config_watcher => {
                result.map_err(|e| OperatorError::Watch(format!("DeploymentConfig watcher panicked: {e}")))?
                    .map_err(|e| OperatorError::Watch(format!("DeploymentConfig watcher error: {e}")))?;
                return Ok(());
            }
        }

        // Cooperative shutdown: signal the watchers, then wait out a bounded
        // grace period before giving up on them
        self.shutdown.cancel();
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            let _ = (&mut self.config_map_watcher).await;
            let _ = (&mut self.deployment_watcher).await;
            let _ = (&mut self.deployment_config_watcher).await;
        })
        .await;
        if drained.is_err() {
            warn!("Watchers did not stop within {SHUTDOWN_GRACE:?}");
        }

        Ok(())
    }
}
