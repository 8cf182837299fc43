use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{DeleteParams, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use tracing::info;

use crate::error::{ReaperError, Result};
use crate::types::{NamespaceTarget, PodSnapshot};

type ClusterResult<T> = std::result::Result<T, kube::Error>;

/// Where the cluster client takes its credentials from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Service account token and CA mounted into the pod.
    InCluster,
    /// Current context of a kubeconfig file.
    Kubeconfig(PathBuf),
}

/// The two cluster operations the reaper needs.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list_pods(&self, namespace: &NamespaceTarget) -> ClusterResult<Vec<PodSnapshot>>;

    async fn delete_pod(&self, namespace: &str, name: &str) -> ClusterResult<()>;
}

pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn connect(source: &CredentialSource) -> Result<Self> {
        let config = load_client_config(source).await?;
        let client = Client::try_from(config).map_err(ReaperError::Client)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_pods(&self, namespace: &NamespaceTarget) -> ClusterResult<Vec<PodSnapshot>> {
        let (pod_api, fallback_namespace): (Api<Pod>, Option<&str>) = match namespace {
            NamespaceTarget::All => (Api::all(self.client.clone()), None),
            NamespaceTarget::Named(ns) => {
                (Api::namespaced(self.client.clone(), ns), Some(ns.as_str()))
            }
        };
        let pods = pod_api.list(&ListParams::default()).await?.items;
        Ok(pods
            .iter()
            .filter_map(|pod| pod_snapshot(pod, fallback_namespace))
            .collect())
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> ClusterResult<()> {
        let pod_api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        pod_api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}

pub async fn load_client_config(source: &CredentialSource) -> Result<Config> {
    match source {
        CredentialSource::InCluster => {
            info!("Loading kubeconfig from in cluster config");
            Config::incluster().map_err(ReaperError::InCluster)
        }
        CredentialSource::Kubeconfig(path) => {
            info!("Loading kubeconfig from {}", path.display());
            let kubeconfig_error = |source| ReaperError::Kubeconfig {
                path: path.clone(),
                source,
            };
            let kubeconfig = Kubeconfig::read_from(path).map_err(kubeconfig_error)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(kubeconfig_error)
        }
    }
}

/// Pods without a name are skipped. A missing namespace falls back to the one that was
/// listed, and a missing creation timestamp counts as "created now".
pub fn pod_snapshot(pod: &Pod, fallback_namespace: Option<&str>) -> Option<PodSnapshot> {
    let name = pod.metadata.name.clone()?;
    let namespace = pod
        .metadata
        .namespace
        .clone()
        .or_else(|| fallback_namespace.map(str::to_string))
        .unwrap_or_default();

    Some(PodSnapshot {
        namespace,
        name,
        annotations: pod.metadata.annotations.clone().unwrap_or_default(),
        creation_timestamp: pod
            .metadata
            .creation_timestamp
            .as_ref()
            .map(|t| t.0)
            .unwrap_or_else(Utc::now),
        status_reason: pod
            .status
            .as_ref()
            .and_then(|s| s.reason.clone())
            .unwrap_or_default(),
    })
}
