// src/config/config.rs
use crate::types::RejectPolicy;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Main configuration structure for the mining application
///
/// Contains all settings needed to configure mining operations:
/// worker count, poll cadence, reject recovery policy and the mining
/// mode (pool or solo).
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Number of worker threads to use for mining
    /// (0 = number of logical cores)
    #[serde(default)]
    pub worker_threads: usize,

    /// Seconds between get-work polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Recovery policy after a rejected share: `reseed` or `wait-fresh`
    #[serde(default)]
    pub reject_policy: RejectPolicy,

    /// Mining mode configuration (pool or solo)
    pub mode: MiningMode,
}

/// Enum representing different mining modes
///
/// Determines whether shares go to a pool (asynchronous, detached
/// submissions) or straight to a node (synchronous solo submissions).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiningMode {
    /// Pool mining configuration
    Pool(EndpointConfig),

    /// Solo mining against a node
    Solo(EndpointConfig),
}

/// Connection settings for one coordinator endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Coordinator URL, e.g. "http://127.0.0.1:8543"
    pub url: String,
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(MinerError)` - If the file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_str)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// The number of workers to actually spawn
    pub fn effective_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }

    /// The coordinator endpoint for the configured mode
    pub fn endpoint(&self) -> &EndpointConfig {
        match &self.mode {
            MiningMode::Pool(ep) | MiningMode::Solo(ep) => ep,
        }
    }

    /// Whether submissions run synchronously against the work source
    pub fn solo(&self) -> bool {
        matches!(self.mode, MiningMode::Solo(_))
    }

    fn validate(&self) -> Result<(), MinerError> {
        let url = &self.endpoint().url;
        Url::parse(url)
            .map_err(|e| MinerError::ConfigError(format!("Invalid URL '{}': {}", url, e)))?;
        if self.poll_interval_secs == 0 {
            return Err(MinerError::ConfigError(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Generates a configuration template string
    ///
    /// # Arguments
    /// * `pool` - Include pool mining configuration template
    /// * `solo` - Include solo mining configuration template
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template(pool: bool, solo: bool) -> String {
        let mut template = String::new();
        template.push_str("# Aqua Miner Configuration\n\n");
        template.push_str("# Number of worker threads (0 = auto-detect)\n");
        template.push_str("worker_threads = 0\n");
        template.push_str("# Seconds between work polls\n");
        template.push_str("poll_interval_secs = 5\n");
        template.push_str("# After a rejected share: \"reseed\" resumes immediately with a\n");
        template.push_str("# fresh nonce, \"wait-fresh\" also waits for the next successful\n");
        template.push_str("# work fetch\n");
        template.push_str("reject_policy = \"reseed\"\n\n");

        if pool {
            template.push_str("# Pool mining configuration\n");
            template.push_str("[mode.pool]\n");
            template.push_str("url = \"http://pool.example.com:8888/\"\n");
        }

        if solo {
            template.push_str("\n# Solo mining configuration\n");
            template.push_str("[mode.solo]\n");
            template.push_str("url = \"http://127.0.0.1:8543\"\n");
        }

        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips_through_the_parser() {
        let config: Config = toml::from_str(&Config::generate_template(true, false)).unwrap();
        assert!(!config.solo());
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.reject_policy, RejectPolicy::Reseed);
        config.validate().unwrap();
    }

    #[test]
    fn solo_mode_parses() {
        let config: Config = toml::from_str(
            "worker_threads = 2\nreject_policy = \"wait-fresh\"\n[mode.solo]\nurl = \"http://127.0.0.1:8543\"\n",
        )
        .unwrap();
        assert!(config.solo());
        assert_eq!(config.effective_threads(), 2);
        assert_eq!(config.reject_policy, RejectPolicy::WaitFresh);
    }

    #[test]
    fn invalid_url_is_rejected() {
        let config: Config =
            toml::from_str("[mode.pool]\nurl = \"not a url\"\n").unwrap();
        assert!(config.validate().is_err());
    }
}
