//! Configuration management for the limiter.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, TokenbucketError};
use crate::ratelimit::Interval;

/// Prefix for environment variable overrides, e.g. `TOKENBUCKET_CAPACITY`.
pub const ENV_PREFIX: &str = "TOKENBUCKET";

/// Limits applied to every bucket of one limiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum tokens per bucket
    #[serde(default = "default_capacity")]
    pub capacity: u64,

    /// Tokens replenished per interval
    #[serde(default = "default_tokens_per_interval")]
    pub tokens_per_interval: u64,

    /// Named refill interval
    #[serde(default)]
    pub interval: Interval,

    /// Interval length in seconds; takes precedence over `interval` when set
    #[serde(default)]
    pub interval_seconds: Option<u64>,

    /// Resource used when the caller does not name one
    #[serde(default = "default_resource")]
    pub default_resource: String,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            tokens_per_interval: default_tokens_per_interval(),
            interval: Interval::default(),
            interval_seconds: None,
            default_resource: default_resource(),
        }
    }
}

fn default_capacity() -> u64 {
    10
}

fn default_tokens_per_interval() -> u64 {
    10
}

fn default_resource() -> String {
    crate::ratelimit::DEFAULT_RESOURCE.to_string()
}

impl LimiterConfig {
    /// Effective interval length in seconds.
    pub fn interval_secs(&self) -> u64 {
        self.interval_seconds.unwrap_or_else(|| self.interval.as_secs())
    }

    /// Derived refill rate in tokens per second.
    pub fn refill_rate_per_second(&self) -> f64 {
        self.tokens_per_interval as f64 / self.interval_secs() as f64
    }

    /// Check that every limit is positive.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(TokenbucketError::Config("capacity must be positive".to_string()));
        }
        if self.tokens_per_interval == 0 {
            return Err(TokenbucketError::Config(
                "tokens_per_interval must be positive".to_string(),
            ));
        }
        if self.interval_secs() == 0 {
            return Err(TokenbucketError::Config("interval must be positive".to_string()));
        }
        if self.default_resource.is_empty() {
            return Err(TokenbucketError::Config("default_resource must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: LimiterConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TokenbucketError::Config(format!("Failed to parse limiter config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading limiter configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from an optional YAML file, then apply
    /// `TOKENBUCKET_*` environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading limiter configuration");
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let config: LimiterConfig = builder
            .add_source(::config::Environment::with_prefix(env_prefix).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| TokenbucketError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LimiterConfig::default();
        assert_eq!(config.capacity, 10);
        assert_eq!(config.interval_secs(), 1);
        assert_eq!(config.default_resource, "global");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_named_interval() {
        let yaml = r#"
capacity: 100
tokens_per_interval: 600
interval: minute
"#;
        let config = LimiterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.interval, Interval::Minute);
        assert_eq!(config.refill_rate_per_second(), 10.0);
    }

    #[test]
    fn test_interval_seconds_overrides_named() {
        let yaml = r#"
capacity: 5
tokens_per_interval: 3
interval: hour
interval_seconds: 2
"#;
        let config = LimiterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.interval_secs(), 2);
        assert_eq!(config.refill_rate_per_second(), 1.5);
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(matches!(
            LimiterConfig::from_yaml("capacity: 0"),
            Err(TokenbucketError::Config(_))
        ));
        assert!(LimiterConfig::from_yaml("tokens_per_interval: 0").is_err());
        assert!(LimiterConfig::from_yaml("interval_seconds: 0").is_err());
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        assert!(LimiterConfig::from_yaml("capacity: [1, 2").is_err());
        assert!(LimiterConfig::from_yaml("interval: fortnight").is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = LimiterConfig::from_file("/nonexistent/tokenbucket.yaml").unwrap_err();
        assert!(matches!(err, TokenbucketError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "tokenbucket-config-{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "capacity: 25\ntokens_per_interval: 5\ninterval: minute\n")
            .unwrap();

        let config = LimiterConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.capacity, 25);
        assert_eq!(config.tokens_per_interval, 5);
        assert_eq!(config.interval, Interval::Minute);
    }

    #[test]
    fn test_load_env_overrides_file() {
        let prefix = "TOKENBUCKET_OVERRIDE_TEST";
        let path = std::env::temp_dir().join(format!(
            "tokenbucket-override-{}.yaml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "capacity: 25\ntokens_per_interval: 3\ndefault_resource: search\n",
        )
        .unwrap();
        std::env::set_var(format!("{}_CAPACITY", prefix), "7");
        std::env::set_var(format!("{}_DEFAULT_RESOURCE", prefix), "api");

        let config = LimiterConfig::load_with_prefix(Some(&path), prefix);
        std::env::remove_var(format!("{}_CAPACITY", prefix));
        std::env::remove_var(format!("{}_DEFAULT_RESOURCE", prefix));
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.capacity, 7);
        assert_eq!(config.tokens_per_interval, 3);
        assert_eq!(config.default_resource, "api");
    }

    #[test]
    fn test_load_env_only_is_validated() {
        let prefix = "TOKENBUCKET_ZERO_TEST";
        std::env::set_var(format!("{}_CAPACITY", prefix), "0");

        let result = LimiterConfig::load_with_prefix(None, prefix);
        std::env::remove_var(format!("{}_CAPACITY", prefix));

        assert!(matches!(result, Err(TokenbucketError::Config(_))));
    }
}
