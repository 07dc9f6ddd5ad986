//! OpenShift DeploymentConfig type.
//!
//! `apps.openshift.io/v1` is not shipped with `k8s-openapi`, so the type is
//! declared here. Only the fields the controllers act on are modeled; every
//! other spec field round-trips through `extra` so a full-object replace
//! cannot drop server-side state such as strategy or triggers.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Spec of an `apps.openshift.io/v1` DeploymentConfig.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize)]
#[kube(
    group = "apps.openshift.io",
    version = "v1",
    kind = "DeploymentConfig",
    namespaced,
    schema = "disabled",
    status = "DeploymentConfigStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    /// Desired replica count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Pod selector. A plain label map on DeploymentConfigs, unlike the
    /// `LabelSelector` used by `apps/v1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<BTreeMap<String, String>>,

    /// Pod template holding the containers the controllers rewrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,

    /// Unmodeled spec fields (strategy, triggers, ...) preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Server-managed status, carried opaquely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentConfigStatus(pub Value);
