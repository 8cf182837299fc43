// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod kubernetes;
pub mod parsing;
pub mod policy;
pub mod reaper;
pub mod report;
pub mod types;

// Re-export commonly used items
pub use cli::Args;
pub use config::{
    credential_source, ensure_namespaces, load_config, load_config_with_env, EnvironmentProvider,
    MockEnvironment, SystemEnvironment,
};
pub use error::{ReaperError, Result};
pub use kubernetes::{ClusterClient, CredentialSource, KubeClusterClient};
pub use parsing::{parse_bool, parse_duration};
pub use policy::{evaluate, should_delete, Decision, DeletionBudget, LIFETIME_ANNOTATION};
pub use reaper::Reaper;
pub use report::{PassReport, ReportSummary};
pub use types::*;
