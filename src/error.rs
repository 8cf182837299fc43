use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReaperError>;

/// Conditions that stop the reaper. Malformed annotations and unparsable optional
/// settings are not represented here: they fall back to defaults and are only logged.
#[derive(Debug, Error)]
pub enum ReaperError {
    #[error("{0} var not set")]
    MissingVar(&'static str),

    #[error("{name} var incorrectly set: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error("no namespace specified")]
    NoNamespace,

    #[error("no kubeconfig path available: pass --kubeconfig or set HOME")]
    NoKubeconfigPath,

    #[error("failed to load in-cluster config")]
    InCluster(#[source] kube::config::InClusterError),

    #[error("failed to load kubeconfig from {}", .path.display())]
    Kubeconfig {
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    #[error("failed to create cluster client")]
    Client(#[source] kube::Error),

    #[error("failed to list pods in {namespace}")]
    ListPods {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to delete pod {namespace}/{name}")]
    DeletePod {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
}
