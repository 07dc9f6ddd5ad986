//! Test utilities for unit testing the reconciliation paths.
//!
//! Helpers for building ConfigMaps, workloads and containers in the shapes
//! the cluster would deliver them.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{ConfigMap, Container, EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use workloads::{DeploymentConfig, DeploymentConfigSpec};

pub fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

/// Container with the given name; an empty `env` slice becomes `None`, the
/// shape a freshly created pod spec has.
pub fn create_test_container(name: &str, env: &[(&str, &str)]) -> Container {
    Container {
        name: name.to_string(),
        env: if env.is_empty() {
            None
        } else {
            Some(
                env.iter()
                    .map(|(name, value)| EnvVar {
                        name: (*name).to_string(),
                        value: Some((*value).to_string()),
                        value_from: None,
                    })
                    .collect(),
            )
        },
        ..Default::default()
    }
}

pub fn create_test_configmap(
    name: &str,
    namespace: &str,
    labels: &[(&str, &str)],
    data: &[(&str, &str)],
) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(string_map(labels)),
            ..Default::default()
        },
        data: Some(string_map(data)),
        ..Default::default()
    }
}

pub fn create_test_deployment(
    name: &str,
    namespace: &str,
    labels: &[(&str, &str)],
    containers: Vec<Container>,
) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(string_map(labels)),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            template: PodTemplateSpec {
                spec: Some(PodSpec {
                    containers,
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn create_test_deployment_config(
    name: &str,
    namespace: &str,
    labels: &[(&str, &str)],
    containers: Vec<Container>,
) -> DeploymentConfig {
    let mut dc = DeploymentConfig::new(
        name,
        DeploymentConfigSpec {
            replicas: Some(1),
            selector: None,
            template: Some(PodTemplateSpec {
                spec: Some(PodSpec {
                    containers,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            extra: BTreeMap::new(),
        },
    );
    dc.metadata.namespace = Some(namespace.to_string());
    dc.metadata.labels = Some(string_map(labels));
    dc
}

/// The `(name, value)` pairs of a container's env list, in order.
pub fn env_pairs(container: &Container) -> Vec<(String, String)> {
    container
        .env
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|entry| {
            (
                entry.name.clone(),
                entry.value.clone().unwrap_or_default(),
            )
        })
        .collect()
}
