// SPDX-License-Identifier: MIT

//! Closed configuration record (§6/§9): built-in defaults, overlaid by an
//! optional TOML file, overlaid by `BUGFIX_*` environment variables.
//! Unknown keys at either layer are a hard startup error — a loose option
//! bag with silently-ignored typos is exactly what this format refuses to
//! be.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("parsing config file {path}: {source}")]
    Toml { path: String, #[source] source: toml::de::Error },

    #[error("unknown environment variable {0}")]
    UnknownEnvVar(String),

    #[error("invalid value for environment variable {key}: {value:?}")]
    InvalidEnvValue { key: String, value: String },
}

/// The full set of settings the daemon understands (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_url: String,
    pub reproducer_timeout_ms: u64,
    pub fixer_timeout_ms: u64,
    pub worker_pool_size: usize,
    pub poll_interval_ms: u64,
    pub pr_remote: String,
    pub pr_base: String,
    pub skip_preflight: bool,
    pub sandbox_root: std::path::PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let engine = bf_engine::EngineConfig::default();
        Self {
            store_url: "bugfix.wal".to_string(),
            reproducer_timeout_ms: engine.reproducer_timeout_ms,
            fixer_timeout_ms: engine.fixer_timeout_ms,
            worker_pool_size: engine.worker_pool_size,
            poll_interval_ms: engine.poll_interval_ms,
            pr_remote: engine.pr_remote,
            pr_base: engine.pr_base,
            skip_preflight: engine.skip_preflight,
            sandbox_root: std::path::PathBuf::from("sandboxes"),
        }
    }
}

impl Config {
    pub fn engine_config(&self) -> bf_engine::EngineConfig {
        bf_engine::EngineConfig {
            reproducer_timeout_ms: self.reproducer_timeout_ms,
            fixer_timeout_ms: self.fixer_timeout_ms,
            worker_pool_size: self.worker_pool_size,
            poll_interval_ms: self.poll_interval_ms,
            pr_remote: self.pr_remote.clone(),
            pr_base: self.pr_base.clone(),
            skip_preflight: self.skip_preflight,
        }
    }

    /// Load defaults, overlay `config_path` if given, then overlay
    /// `BUGFIX_*` environment variables. Each layer strictly wins over
    /// the last.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = config_path {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::Read { path: path.display().to_string(), source: e })?;
            let file: TomlConfig = toml::from_str(&contents)
                .map_err(|e| ConfigError::Toml { path: path.display().to_string(), source: e })?;
            file.apply_to(&mut config);
        }
        apply_env(&mut config)?;
        Ok(config)
    }
}

/// Mirrors [`Config`] but every field is optional, so `deny_unknown_fields`
/// is the only thing standing between a typo'd key and silent data loss.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct TomlConfig {
    turso_url: Option<String>,
    reproducer_timeout_ms: Option<u64>,
    fixer_timeout_ms: Option<u64>,
    worker_pool_size: Option<usize>,
    poll_interval_ms: Option<u64>,
    pr_remote: Option<String>,
    pr_base: Option<String>,
    skip_preflight: Option<bool>,
    sandbox_root: Option<String>,
}

impl TomlConfig {
    fn apply_to(self, config: &mut Config) {
        if let Some(v) = self.turso_url {
            config.store_url = v;
        }
        if let Some(v) = self.reproducer_timeout_ms {
            config.reproducer_timeout_ms = v;
        }
        if let Some(v) = self.fixer_timeout_ms {
            config.fixer_timeout_ms = v;
        }
        if let Some(v) = self.worker_pool_size {
            config.worker_pool_size = v;
        }
        if let Some(v) = self.poll_interval_ms {
            config.poll_interval_ms = v;
        }
        if let Some(v) = self.pr_remote {
            config.pr_remote = v;
        }
        if let Some(v) = self.pr_base {
            config.pr_base = v;
        }
        if let Some(v) = self.skip_preflight {
            config.skip_preflight = v;
        }
        if let Some(v) = self.sandbox_root {
            config.sandbox_root = std::path::PathBuf::from(v);
        }
    }
}

const KNOWN_ENV_KEYS: &[&str] = &[
    "BUGFIX_TURSO_URL",
    "BUGFIX_REPRODUCER_TIMEOUT_MS",
    "BUGFIX_FIXER_TIMEOUT_MS",
    "BUGFIX_WORKER_POOL_SIZE",
    "BUGFIX_POLL_INTERVAL_MS",
    "BUGFIX_PR_REMOTE",
    "BUGFIX_PR_BASE",
    "BUGFIX_SKIP_PREFLIGHT",
    "BUGFIX_SANDBOX_ROOT",
];

fn apply_env(config: &mut Config) -> Result<(), ConfigError> {
    for (key, value) in std::env::vars() {
        if !key.starts_with("BUGFIX_") {
            continue;
        }
        if !KNOWN_ENV_KEYS.contains(&key.as_str()) {
            return Err(ConfigError::UnknownEnvVar(key));
        }
        let parse_u64 = |v: &str| {
            v.parse::<u64>().map_err(|_| ConfigError::InvalidEnvValue { key: key.clone(), value: v.to_string() })
        };
        let parse_bool = |v: &str| {
            v.parse::<bool>().map_err(|_| ConfigError::InvalidEnvValue { key: key.clone(), value: v.to_string() })
        };
        match key.as_str() {
            "BUGFIX_TURSO_URL" => config.store_url = value,
            "BUGFIX_REPRODUCER_TIMEOUT_MS" => config.reproducer_timeout_ms = parse_u64(&value)?,
            "BUGFIX_FIXER_TIMEOUT_MS" => config.fixer_timeout_ms = parse_u64(&value)?,
            "BUGFIX_WORKER_POOL_SIZE" => {
                config.worker_pool_size = parse_u64(&value)? as usize;
            }
            "BUGFIX_POLL_INTERVAL_MS" => config.poll_interval_ms = parse_u64(&value)?,
            "BUGFIX_PR_REMOTE" => config.pr_remote = value,
            "BUGFIX_PR_BASE" => config.pr_base = value,
            "BUGFIX_SKIP_PREFLIGHT" => config.skip_preflight = parse_bool(&value)?,
            "BUGFIX_SANDBOX_ROOT" => config.sandbox_root = std::path::PathBuf::from(value),
            _ => unreachable!("filtered by KNOWN_ENV_KEYS above"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_engine_config_defaults() {
        let config = Config::default();
        let engine = bf_engine::EngineConfig::default();
        assert_eq!(config.reproducer_timeout_ms, engine.reproducer_timeout_ms);
        assert_eq!(config.worker_pool_size, engine.worker_pool_size);
        assert_eq!(config.pr_remote, engine.pr_remote);
    }

    #[test]
    fn toml_file_overlays_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workerPoolSize = 8\nprBase = \"develop\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.worker_pool_size, 8);
        assert_eq!(config.pr_base, "develop");
        assert_eq!(config.reproducer_timeout_ms, Config::default().reproducer_timeout_ms);
    }

    #[test]
    fn unknown_toml_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "totallyMadeUpKey = 1").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();

        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    #[serial_test::serial(bugfix_env)]
    fn known_env_var_overlays_toml_and_defaults() {
        std::env::set_var("BUGFIX_PR_REMOTE", "upstream");
        let result = Config::load(None);
        std::env::remove_var("BUGFIX_PR_REMOTE");

        assert_eq!(result.unwrap().pr_remote, "upstream");
    }

    #[test]
    #[serial_test::serial(bugfix_env)]
    fn unknown_env_var_is_rejected() {
        std::env::set_var("BUGFIX_NOT_A_REAL_SETTING", "1");
        let result = Config::load(None);
        std::env::remove_var("BUGFIX_NOT_A_REAL_SETTING");

        assert!(matches!(result.unwrap_err(), ConfigError::UnknownEnvVar(_)));
    }
}
