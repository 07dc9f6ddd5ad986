//! env-sync controller
//!
//! Keeps environment variables declared in labeled ConfigMaps synchronized
//! into the containers of target workloads:
//! - ConfigMap events push sanitized key/value data into the Deployments and
//!   DeploymentConfigs their labels address
//! - Workload events pull in the ConfigMaps that target them, so workloads
//!   created after their configuration converge to the same state
//!
//! Driven entirely by watch events; no polling, no state beyond the cluster.

mod backoff;
mod controller;
mod env;
mod error;
mod labels;
mod operator;
mod watcher;

#[cfg(test)]
mod test_utils;

use anyhow::Result;
use controller::Controller;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting env-sync controller");

    // Load configuration from environment variables
    let namespace =
        std::env::var("WATCH_NAMESPACE").unwrap_or_else(|_| "default".to_string());
    let predicate = std::env::var("CONFIGMAP_PREDICATE")
        .unwrap_or_else(|_| format!("{}={}", labels::KIND_LABEL, labels::KIND_ENV_VARS));

    info!("Configuration:");
    info!("  Namespace: {namespace}");
    info!("  ConfigMap predicate: {predicate}");

    // Initialize and run controller
    let controller = Controller::new(namespace, &predicate).await?;
    controller.run().await?;

    Ok(())
}
