//! Environment-provided defaults for the CLI.
//!
//! Flags always win over the environment; the environment wins over the
//! built-in schema checker configuration.

use std::path::PathBuf;

/// Cache directory for downloaded schemas.
pub const CACHE_DIR_VAR: &str = "KUBECHECK_CACHE_DIR";
/// Kubernetes version to validate against.
pub const KUBERNETES_VERSION_VAR: &str = "KUBECHECK_KUBERNETES_VERSION";
/// Comma-separated schema locations.
pub const SCHEMA_LOCATIONS_VAR: &str = "KUBECHECK_SCHEMA_LOCATIONS";

/// Defaults read from the environment. Unset variables stay `None`/empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub cache_dir: Option<PathBuf>,
    pub kubernetes_version: Option<String>,
    pub schema_locations: Vec<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `KUBECHECK_CACHE_DIR`
    /// - `KUBECHECK_KUBERNETES_VERSION`
    /// - `KUBECHECK_SCHEMA_LOCATIONS` (comma-separated)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<Option<String>, ConfigError>,
    {
        let cache_dir = non_empty(CACHE_DIR_VAR, lookup(CACHE_DIR_VAR)?)?.map(PathBuf::from);
        let kubernetes_version = non_empty(KUBERNETES_VERSION_VAR, lookup(KUBERNETES_VERSION_VAR)?)?;

        let schema_locations = match lookup(SCHEMA_LOCATIONS_VAR)? {
            Some(raw) => {
                let locations: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if locations.is_empty() {
                    return Err(ConfigError::Empty(SCHEMA_LOCATIONS_VAR));
                }
                locations
            }
            None => Vec::new(),
        };

        Ok(Self {
            cache_dir,
            kubernetes_version,
            schema_locations,
        })
    }
}

fn env_var(var: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(var)),
    }
}

fn non_empty(var: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(var)),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is set but empty")]
    Empty(&'static str),
    #[error("{0} is not valid unicode")]
    NotUnicode(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&'static str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<&str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        CliConfig::from_lookup(|k| Ok(vars.get(k).cloned()))
    }

    #[test]
    fn unset_environment_is_default() {
        assert_eq!(load(&[]).unwrap(), CliConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = load(&[
            (CACHE_DIR_VAR, "/var/cache/kubecheck"),
            (KUBERNETES_VERSION_VAR, " 1.29.1 "),
            (SCHEMA_LOCATIONS_VAR, "default, /srv/schemas ,"),
        ])
        .unwrap();
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("/var/cache/kubecheck")));
        assert_eq!(cfg.kubernetes_version.as_deref(), Some("1.29.1"));
        assert_eq!(cfg.schema_locations, vec!["default", "/srv/schemas"]);
    }

    #[test]
    fn empty_values_are_rejected() {
        assert!(matches!(
            load(&[(KUBERNETES_VERSION_VAR, "  ")]),
            Err(ConfigError::Empty(KUBERNETES_VERSION_VAR))
        ));
        assert!(matches!(
            load(&[(SCHEMA_LOCATIONS_VAR, ",,")]),
            Err(ConfigError::Empty(SCHEMA_LOCATIONS_VAR))
        ));
    }

    #[test]
    fn env_var_absent_is_none() {
        assert!(env_var("KUBECHECK_TEST_NONEXISTENT_5821").unwrap().is_none());
    }

    #[test]
    fn env_var_reads_process_environment() {
        std::env::set_var("KUBECHECK_TEST_ENV_VAR_CFG", "x");
        let value = env_var("KUBECHECK_TEST_ENV_VAR_CFG");
        std::env::remove_var("KUBECHECK_TEST_ENV_VAR_CFG");
        assert_eq!(value.unwrap().as_deref(), Some("x"));
    }
}
