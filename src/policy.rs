use chrono::{DateTime, Duration, Utc};

use crate::parsing::parse_duration;
use crate::types::PodSnapshot;

pub const LIFETIME_ANNOTATION: &str = "pod.kubernetes.io/lifetime";

/// Matched as a substring of the pod status reason.
pub const EVICTED_REASON: &str = "Evicted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    DeleteForLifetime,
    DeleteForEviction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifetimeStatus {
    Unannotated,
    /// Annotation present but not a positive duration.
    Invalid { value: String },
    Alive { lifetime: Duration, age: Duration },
    Expired { lifetime: Duration, age: Duration },
}

/// Per-pass allowance of lifetime deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionBudget {
    limit: u32,
    used: u32,
}

impl DeletionBudget {
    pub fn new(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    pub fn consume(&mut self) {
        self.used = self.used.saturating_add(1);
    }
}

/// Both criteria evaluated for one pod, before the cap is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub lifetime: LifetimeStatus,
    pub evicted: bool,
}

impl Evaluation {
    pub fn is_expired(&self) -> bool {
        matches!(self.lifetime, LifetimeStatus::Expired { .. })
    }

    /// Lifetime deletion wins while the budget lasts; an evicted pod is removed either way.
    pub fn decide(&self, budget: &DeletionBudget) -> Decision {
        if self.is_expired() && !budget.is_exhausted() {
            Decision::DeleteForLifetime
        } else if self.evicted {
            Decision::DeleteForEviction
        } else {
            Decision::Keep
        }
    }
}

pub fn lifetime_status(pod: &PodSnapshot, now: DateTime<Utc>) -> LifetimeStatus {
    let Some(value) = pod.annotations.get(LIFETIME_ANNOTATION) else {
        return LifetimeStatus::Unannotated;
    };

    let lifetime = match parse_duration(value) {
        Ok(lifetime) if lifetime > Duration::zero() => lifetime,
        _ => {
            return LifetimeStatus::Invalid {
                value: value.clone(),
            }
        }
    };

    let age = now - pod.creation_timestamp;
    if age > lifetime {
        LifetimeStatus::Expired { lifetime, age }
    } else {
        LifetimeStatus::Alive { lifetime, age }
    }
}

pub fn is_evicted(pod: &PodSnapshot) -> bool {
    pod.status_reason.contains(EVICTED_REASON)
}

pub fn evaluate(pod: &PodSnapshot, reap_evicted: bool, now: DateTime<Utc>) -> Evaluation {
    Evaluation {
        lifetime: lifetime_status(pod, now),
        evicted: reap_evicted && is_evicted(pod),
    }
}

pub fn should_delete(
    pod: &PodSnapshot,
    reap_evicted: bool,
    now: DateTime<Utc>,
    budget: &DeletionBudget,
) -> Decision {
    evaluate(pod, reap_evicted, now).decide(budget)
}
