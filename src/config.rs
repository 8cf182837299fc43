use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ReaperError, Result};
use crate::kubernetes::CredentialSource;
use crate::parsing::parse_bool;
use crate::types::{NamespaceTarget, RunConfig};

pub const REMOTE_EXEC: &str = "REMOTE_EXEC";
pub const MAX_REAPER_COUNT_PER_RUN: &str = "MAX_REAPER_COUNT_PER_RUN";
pub const REAP_EVICTED_PODS: &str = "REAP_EVICTED_PODS";
pub const CRON_JOB: &str = "CRON_JOB";
pub const REAPER_INTERVAL_IN_SEC: &str = "REAPER_INTERVAL_IN_SEC";
pub const REAPER_NAMESPACES: &str = "REAPER_NAMESPACES";

pub const DEFAULT_MAX_DELETIONS_PER_RUN: u32 = 30;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

const ALL_NAMESPACES_TOKEN: &str = "all";

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<RunConfig> {
    load_config_with_env(&SystemEnvironment)
}

/// Resolve the run configuration. Only `REMOTE_EXEC` is mandatory here; an empty
/// namespace list is accepted and rejected by [`ensure_namespaces`].
pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<RunConfig> {
    let namespaces = parse_namespaces(&env.get_var(REAPER_NAMESPACES).unwrap_or_default());

    let remote = match env.get_var(REMOTE_EXEC) {
        Some(value) => parse_bool(&value).ok_or(ReaperError::InvalidVar {
            name: REMOTE_EXEC,
            value,
        })?,
        None => return Err(ReaperError::MissingVar(REMOTE_EXEC)),
    };

    // Zero or a negative count switches lifetime deletions off for every pass.
    let max_deletions_per_run = env
        .get_var(MAX_REAPER_COUNT_PER_RUN)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|n| n.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(DEFAULT_MAX_DELETIONS_PER_RUN);

    let reap_evicted = bool_or_false(env, REAP_EVICTED_PODS);
    let run_once = bool_or_false(env, CRON_JOB);

    // Zero would turn the loop into a busy spin against the API server.
    let poll_interval = env
        .get_var(REAPER_INTERVAL_IN_SEC)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL);

    Ok(RunConfig {
        namespaces,
        max_deletions_per_run,
        reap_evicted,
        run_once,
        poll_interval,
        remote,
    })
}

/// Fails with `NoNamespace` when there is nothing to sweep.
pub fn ensure_namespaces(cfg: &RunConfig) -> Result<()> {
    if cfg.namespaces.is_empty() {
        return Err(ReaperError::NoNamespace);
    }
    Ok(())
}

fn bool_or_false<E: EnvironmentProvider>(env: &E, key: &str) -> bool {
    env.get_var(key).and_then(|v| parse_bool(&v)).unwrap_or(false)
}

/// Split a comma-separated namespace list. A lone `all` (any case) selects every namespace.
pub fn parse_namespaces(raw: &str) -> Vec<NamespaceTarget> {
    let names: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    match names.as_slice() {
        [single] if single.eq_ignore_ascii_case(ALL_NAMESPACES_TOKEN) => vec![NamespaceTarget::All],
        _ => names.into_iter().map(NamespaceTarget::named).collect(),
    }
}

/// `$HOME/.kube/config`, falling back to `%USERPROFILE%` on Windows.
pub fn default_kubeconfig_path<E: EnvironmentProvider>(env: &E) -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|key| env.get_var(key))
        .find(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".kube").join("config"))
}

/// Pick where cluster credentials come from. An explicit kubeconfig path wins over the
/// home-directory default and is ignored when running in-cluster.
pub fn credential_source<E: EnvironmentProvider>(
    cfg: &RunConfig,
    kubeconfig: Option<PathBuf>,
    env: &E,
) -> Result<CredentialSource> {
    if cfg.remote {
        return Ok(CredentialSource::InCluster);
    }
    kubeconfig
        .or_else(|| default_kubeconfig_path(env))
        .map(CredentialSource::Kubeconfig)
        .ok_or(ReaperError::NoKubeconfigPath)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env() -> MockEnvironment {
        MockEnvironment::new()
            .with_var(REMOTE_EXEC, "true")
            .with_var(REAPER_NAMESPACES, "default")
    }

    #[test]
    fn test_config_loading_with_env() {
        let env = MockEnvironment::new()
            .with_var(REMOTE_EXEC, "false")
            .with_var(REAPER_NAMESPACES, "default,kube-system,monitoring")
            .with_var(MAX_REAPER_COUNT_PER_RUN, "5")
            .with_var(REAP_EVICTED_PODS, "true")
            .with_var(CRON_JOB, "1")
            .with_var(REAPER_INTERVAL_IN_SEC, "300");

        let config = load_config_with_env(&env).unwrap();

        assert_eq!(
            config.namespaces,
            vec![
                NamespaceTarget::named("default"),
                NamespaceTarget::named("kube-system"),
                NamespaceTarget::named("monitoring"),
            ]
        );
        assert_eq!(config.max_deletions_per_run, 5);
        assert!(config.reap_evicted);
        assert!(config.run_once);
        assert_eq!(config.poll_interval, Duration::from_secs(300));
        assert!(!config.remote);
    }

    #[test]
    fn test_config_loading_defaults() {
        let config = load_config_with_env(&base_env()).unwrap();

        assert_eq!(config.namespaces, vec![NamespaceTarget::named("default")]);
        assert_eq!(config.max_deletions_per_run, 30); // default
        assert!(!config.reap_evicted); // default
        assert!(!config.run_once); // default
        assert_eq!(config.poll_interval, Duration::from_secs(60)); // default
        assert!(config.remote);
    }

    #[test]
    fn test_remote_exec_is_required() {
        let env = MockEnvironment::new().with_var(REAPER_NAMESPACES, "default");

        let result = load_config_with_env(&env);
        assert!(matches!(result, Err(ReaperError::MissingVar(REMOTE_EXEC))));
        assert!(result.unwrap_err().to_string().contains("REMOTE_EXEC"));
    }

    #[test]
    fn test_remote_exec_must_be_boolean() {
        let env = base_env().with_var(REMOTE_EXEC, "yes");

        let result = load_config_with_env(&env);
        assert!(matches!(
            result,
            Err(ReaperError::InvalidVar { name: REMOTE_EXEC, ref value }) if value == "yes"
        ));
    }

    #[test]
    fn test_missing_namespaces_is_not_a_config_error() {
        let env = MockEnvironment::new().with_var(REMOTE_EXEC, "true");

        let config = load_config_with_env(&env).unwrap();
        assert!(config.namespaces.is_empty());
    }

    #[test]
    fn test_namespace_parsing() {
        assert_eq!(parse_namespaces("all"), vec![NamespaceTarget::All]);
        assert_eq!(parse_namespaces("ALL"), vec![NamespaceTarget::All]);
        assert_eq!(parse_namespaces(" All "), vec![NamespaceTarget::All]);
        assert_eq!(
            parse_namespaces("ns1,ns2"),
            vec![NamespaceTarget::named("ns1"), NamespaceTarget::named("ns2")]
        );
        assert_eq!(
            parse_namespaces(" ns1 , ns2 ,  ns3  ,"),
            vec![
                NamespaceTarget::named("ns1"),
                NamespaceTarget::named("ns2"),
                NamespaceTarget::named("ns3"),
            ]
        );
        assert!(parse_namespaces("").is_empty());
        assert!(parse_namespaces(" , , ,").is_empty());

        // "all" only means every namespace when it stands alone
        assert_eq!(
            parse_namespaces("all,default"),
            vec![NamespaceTarget::named("all"), NamespaceTarget::named("default")]
        );
    }

    #[test]
    fn test_boolean_parsing_falls_back_to_false() {
        for val in ["yes", "on", "", "enabled"] {
            let env = base_env()
                .with_var(REAP_EVICTED_PODS, val)
                .with_var(CRON_JOB, val);

            let config = load_config_with_env(&env).unwrap();
            assert!(!config.reap_evicted, "Failed for value: {}", val);
            assert!(!config.run_once, "Failed for value: {}", val);
        }

        for val in ["1", "t", "T", "TRUE", "true", "True"] {
            let env = base_env().with_var(REAP_EVICTED_PODS, val);

            let config = load_config_with_env(&env).unwrap();
            assert!(config.reap_evicted, "Failed for value: {}", val);
        }
    }

    #[test]
    fn test_numeric_parsing_with_invalid_values() {
        let env = base_env()
            .with_var(MAX_REAPER_COUNT_PER_RUN, "lots")
            .with_var(REAPER_INTERVAL_IN_SEC, "soon");

        let config = load_config_with_env(&env).unwrap();
        assert_eq!(config.max_deletions_per_run, 30); // default fallback
        assert_eq!(config.poll_interval, Duration::from_secs(60)); // default fallback

        let env = base_env().with_var(REAPER_INTERVAL_IN_SEC, "-10");

        let config = load_config_with_env(&env).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_or_negative_cap_disables_lifetime_deletions() {
        for val in ["0", "-3", " 0 "] {
            let env = base_env().with_var(MAX_REAPER_COUNT_PER_RUN, val);

            let config = load_config_with_env(&env).unwrap();
            assert_eq!(config.max_deletions_per_run, 0, "Failed for value: {:?}", val);
        }
    }

    #[test]
    fn test_zero_poll_interval_is_clamped_to_default() {
        let env = base_env().with_var(REAPER_INTERVAL_IN_SEC, "0");

        let config = load_config_with_env(&env).unwrap();
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_ensure_namespaces() {
        let env = MockEnvironment::new().with_var(REMOTE_EXEC, "false");
        let config = load_config_with_env(&env).unwrap();
        assert!(matches!(ensure_namespaces(&config), Err(ReaperError::NoNamespace)));

        let config = load_config_with_env(&base_env()).unwrap();
        assert!(ensure_namespaces(&config).is_ok());
    }

    #[test]
    fn test_default_kubeconfig_path() {
        let env = MockEnvironment::new().with_var("HOME", "/home/reaper");
        assert_eq!(
            default_kubeconfig_path(&env),
            Some(PathBuf::from("/home/reaper/.kube/config"))
        );

        let env = MockEnvironment::new()
            .with_var("HOME", "")
            .with_var("USERPROFILE", "/users/reaper");
        assert_eq!(
            default_kubeconfig_path(&env),
            Some(PathBuf::from("/users/reaper").join(".kube").join("config"))
        );

        assert_eq!(default_kubeconfig_path(&MockEnvironment::new()), None);
    }

    #[test]
    fn test_credential_source_selection() {
        let home = MockEnvironment::new().with_var("HOME", "/home/reaper");

        let remote = load_config_with_env(&base_env()).unwrap();
        assert_eq!(
            credential_source(&remote, Some(PathBuf::from("/tmp/ignored")), &home).unwrap(),
            CredentialSource::InCluster
        );

        let local = load_config_with_env(&base_env().with_var(REMOTE_EXEC, "false")).unwrap();
        assert_eq!(
            credential_source(&local, None, &home).unwrap(),
            CredentialSource::Kubeconfig(PathBuf::from("/home/reaper/.kube/config"))
        );
        assert_eq!(
            credential_source(&local, Some(PathBuf::from("/etc/kube.yaml")), &home).unwrap(),
            CredentialSource::Kubeconfig(PathBuf::from("/etc/kube.yaml"))
        );
        assert!(matches!(
            credential_source(&local, None, &MockEnvironment::new()),
            Err(ReaperError::NoKubeconfigPath)
        ));
    }
}
