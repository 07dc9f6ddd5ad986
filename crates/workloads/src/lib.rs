//! Workload access for EVops controllers.
//!
//! Unifies the two workload kinds that can receive environment variables -
//! `apps/v1` Deployments and OpenShift DeploymentConfigs - behind a single
//! trait plus a thin accessor over `kube::Api`, so the controllers have one
//! code path instead of one per kind.

pub mod deployment_config;

pub use deployment_config::{DeploymentConfig, DeploymentConfigSpec, DeploymentConfigStatus};

use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Container;
use kube::api::{ListParams, PostParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// A namespaced workload kind whose pod template carries containers.
pub trait Workload:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + std::fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Kind name used in log lines.
    const KIND: &'static str;

    /// Containers of the pod template, if the object carries one.
    fn containers(&self) -> Option<&[Container]>;

    /// Mutable containers of the pod template, if the object carries one.
    fn containers_mut(&mut self) -> Option<&mut Vec<Container>>;
}

impl Workload for Deployment {
    const KIND: &'static str = "Deployment";

    fn containers(&self) -> Option<&[Container]> {
        self.spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|pod| pod.containers.as_slice())
    }

    fn containers_mut(&mut self) -> Option<&mut Vec<Container>> {
        self.spec
            .as_mut()
            .and_then(|spec| spec.template.spec.as_mut())
            .map(|pod| &mut pod.containers)
    }
}

impl Workload for DeploymentConfig {
    const KIND: &'static str = "DeploymentConfig";

    fn containers(&self) -> Option<&[Container]> {
        self.spec
            .template
            .as_ref()
            .and_then(|template| template.spec.as_ref())
            .map(|pod| pod.containers.as_slice())
    }

    fn containers_mut(&mut self) -> Option<&mut Vec<Container>> {
        self.spec
            .template
            .as_mut()
            .and_then(|template| template.spec.as_mut())
            .map(|pod| &mut pod.containers)
    }
}

/// Typed access to one workload kind in one namespace.
///
/// The `kube::Client` is injected at construction so tests and callers
/// control its lifetime; nothing here builds an ambient client.
#[derive(Clone)]
pub struct Workloads<K> {
    api: Api<K>,
}

impl<K: Workload> Workloads<K> {
    /// Binds the accessor to a namespace.
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }

    /// Lists workloads carrying the `key=value` label.
    pub async fn list_by_label(&self, key: &str, value: &str) -> Result<Vec<K>, kube::Error> {
        let params = ListParams::default().labels(&format!("{key}={value}"));
        Ok(self.api.list(&params).await?.items)
    }

    /// Fetches a workload by name; a missing object is `None`, not an error.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<K>, kube::Error> {
        self.api.get_opt(name).await
    }

    /// Replaces the full object, carrying the fetched resourceVersion.
    ///
    /// No retry and no merge patch. A 409 means a concurrent writer won the
    /// race; the update is dropped and the next event re-converges. Last
    /// writer wins.
    pub async fn replace(&self, workload: &K) -> Result<(), kube::Error> {
        let name = workload.name_any();
        match self
            .api
            .replace(&name, &PostParams::default(), workload)
            .await
        {
            Ok(_) => {
                debug!("Replaced {} {}", K::KIND, name);
                Ok(())
            }
            Err(kube::Error::Api(response)) if response.code == 409 => {
                warn!(
                    "Replace conflict on {} {}, dropping update (last writer wins)",
                    K::KIND,
                    name
                );
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}
