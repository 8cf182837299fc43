use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::ensure_namespaces;
use crate::error::{ReaperError, Result};
use crate::kubernetes::ClusterClient;
use crate::policy::{self, Decision, DeletionBudget, LifetimeStatus, LIFETIME_ANNOTATION};
use crate::report::PassReport;
use crate::types::{NamespaceTarget, PodSnapshot, RunConfig, RunResult};

/// Sweeps the configured namespaces, one pass at a time.
pub struct Reaper<C> {
    client: C,
    config: RunConfig,
}

impl<C: ClusterClient> Reaper<C> {
    pub fn new(client: C, config: RunConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run passes until single-pass mode finishes one, a pass fails, or `shutdown`
    /// flips to `true` while sleeping between passes.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            self.run_pass().await?;

            if self.config.run_once {
                info!("Single pass finished, exiting");
                return Ok(());
            }

            let interval = self.config.poll_interval;
            info!("Now sleeping for {} seconds", interval.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                requested = async { shutdown.wait_for(|stop| *stop).await.is_ok() } => {
                    if requested {
                        info!("Shutdown requested, stopping reaper");
                        return Ok(());
                    }
                    // Sender is gone, so no signal can arrive any more.
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    /// One sweep over every configured namespace. The lifetime deletion budget is
    /// shared by all namespaces of the pass and starts fresh on the next one.
    pub async fn run_pass(&self) -> Result<PassReport> {
        ensure_namespaces(&self.config)?;

        let mut budget = DeletionBudget::new(self.config.max_deletions_per_run);
        let mut report = PassReport::new();
        for namespace in &self.config.namespaces {
            let result = self.reap_namespace(namespace, &mut budget).await?;
            report.add_namespace_result(result);
        }

        let summary = report.summary();
        info!(
            checked = summary.pods_checked,
            killed_for_lifetime = summary.killed_for_lifetime,
            killed_for_eviction = summary.killed_for_eviction,
            skipped_by_cap = summary.skipped_by_cap,
            "Pass complete"
        );
        Ok(report)
    }

    async fn reap_namespace(
        &self,
        namespace: &NamespaceTarget,
        budget: &mut DeletionBudget,
    ) -> Result<RunResult> {
        let pods = self
            .client
            .list_pods(namespace)
            .await
            .map_err(|source| ReaperError::ListPods {
                namespace: namespace.to_string(),
                source,
            })?;

        info!("Checking {} pods in namespace {}", pods.len(), namespace);
        let mut result = RunResult::new(namespace);
        result.pods_checked = pods.len();

        for pod in &pods {
            let evaluation = policy::evaluate(pod, self.config.reap_evicted, Utc::now());
            log_lifetime(pod, &evaluation.lifetime);

            match evaluation.decide(budget) {
                Decision::DeleteForLifetime => {
                    info!("pod {} : pod is past its lifetime and will be killed.", pod.name);
                    self.delete(pod).await?;
                    budget.consume();
                    result.killed_for_lifetime += 1;
                }
                Decision::DeleteForEviction => {
                    debug!("pod {} : pod is evicted and needs to be deleted", pod.name);
                    self.delete(pod).await?;
                    result.killed_for_eviction += 1;
                }
                Decision::Keep => {
                    if evaluation.is_expired() {
                        info!(
                            "pod {} : past its lifetime but max {} pods already killed this run",
                            pod.name,
                            budget.limit()
                        );
                        result.skipped_by_cap += 1;
                    }
                }
            }
        }

        info!(
            "Killed {} Old/Evicted Pods in namespace {}.",
            result.pods_killed(),
            namespace
        );
        Ok(result)
    }

    async fn delete(&self, pod: &PodSnapshot) -> Result<()> {
        self.client
            .delete_pod(&pod.namespace, &pod.name)
            .await
            .map_err(|source| ReaperError::DeletePod {
                namespace: pod.namespace.clone(),
                name: pod.name.clone(),
                source,
            })?;
        info!("pod {} : pod killed.", pod.name);
        Ok(())
    }
}

fn log_lifetime(pod: &PodSnapshot, status: &LifetimeStatus) {
    match status {
        LifetimeStatus::Unannotated => {}
        LifetimeStatus::Invalid { value } => {
            debug!(
                "pod {} : provided value {:?} for {} is incorrect",
                pod.name, value, LIFETIME_ANNOTATION
            );
        }
        LifetimeStatus::Alive { lifetime, age } | LifetimeStatus::Expired { lifetime, age } => {
            debug!(
                "pod {} : lifetime {}s, age {}s (created {})",
                pod.name,
                lifetime.num_seconds(),
                age.num_seconds(),
                pod.creation_timestamp
            );
        }
    }
}
