use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub namespaces: Vec<NamespaceTarget>,
    pub max_deletions_per_run: u32,
    pub reap_evicted: bool,
    pub run_once: bool,
    pub poll_interval: Duration,
    /// In-cluster credentials when true, local kubeconfig otherwise.
    pub remote: bool,
}

/// A namespace to sweep. `All` lists pods cluster-wide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamespaceTarget {
    All,
    Named(String),
}

impl NamespaceTarget {
    pub fn named<S: Into<String>>(name: S) -> Self {
        NamespaceTarget::Named(name.into())
    }
}

impl fmt::Display for NamespaceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceTarget::All => f.write_str("all namespaces"),
            NamespaceTarget::Named(name) => f.write_str(name),
        }
    }
}

/// The parts of a pod the deletion policy looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSnapshot {
    pub namespace: String,
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub creation_timestamp: DateTime<Utc>,
    pub status_reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub namespace: String,
    pub pods_checked: usize,
    pub killed_for_lifetime: usize,
    pub killed_for_eviction: usize,
    /// Expired pods left alone because the per-pass cap was already spent.
    pub skipped_by_cap: usize,
}

impl RunResult {
    pub fn new(namespace: &NamespaceTarget) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    pub fn pods_killed(&self) -> usize {
        self.killed_for_lifetime + self.killed_for_eviction
    }
}
