use std::path::PathBuf;

use clap::Parser;

/// Deletes pods that outlived their `pod.kubernetes.io/lifetime` annotation, and
/// optionally evicted pods. Everything else is configured through the environment.
#[derive(Clone, Debug, Default, Parser)]
#[command(name = "pod-reaper", version)]
pub struct Args {
    /// Absolute path to the kubeconfig file, used when REMOTE_EXEC=false.
    /// Defaults to $HOME/.kube/config.
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,
}
