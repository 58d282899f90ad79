use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::errors::SetupError;
use crate::retry::RetryPolicy;

/// Main configuration for arc-setup.
///
/// Sources, in order of precedence: `ARC_SETUP_*` environment variables
/// (nested keys separated by `__`), an optional `arc-setup.toml`, then the
/// defaults below. Nothing in the core reads process-wide constants.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SetupConfig {
    pub relay: RelayConfig,
    pub github: GitHubFilesConfig,
    pub output: OutputConfig,
    pub retry: RetrySettings,
    /// Ceiling on the "press enter when done" wait, in seconds. Unset means
    /// wait until the operator answers or interrupts.
    pub ack_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay service base URL. When unset it is derived from the codespace
    /// preview URL (`CODESPACE_NAME`), matching the devcontainer layout the
    /// wizard normally runs in.
    pub base_url: Option<String>,
    /// Webhook callback URL handed to GitHub in the manifest.
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubFilesConfig {
    pub host_file: String,
    pub orgs_file: String,
}

impl Default for GitHubFilesConfig {
    fn default() -> Self {
        Self {
            host_file: "data/github_host.txt".to_string(),
            orgs_file: "data/github_orgs.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub result_file: String,
    pub key_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_file: "data/arc-setup.json".to_string(),
            key_file: "data/app.pem".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

impl SetupConfig {
    pub fn load() -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::with_name("arc-setup").required(false))
            .add_source(Environment::with_prefix("ARC_SETUP").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn relay_base_url(&self) -> Result<String, SetupError> {
        if let Some(url) = &self.relay.base_url {
            return Ok(url.trim_end_matches('/').to_string());
        }
        Ok(format!("{}/gamf", codespace_preview_url()?))
    }

    pub fn webhook_url(&self) -> Result<String, SetupError> {
        if let Some(url) = &self.relay.webhook_url {
            return Ok(url.clone());
        }
        Ok(format!("{}/webhook", codespace_preview_url()?))
    }

    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_secs.map(Duration::from_secs)
    }
}

fn codespace_preview_url() -> Result<String, SetupError> {
    let name = std::env::var("CODESPACE_NAME")
        .ok()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            SetupError::InputValidation(
                "relay URL is not configured: set relay.base_url (or ARC_SETUP_RELAY__BASE_URL), \
                 or run inside a codespace so CODESPACE_NAME is available"
                    .to_string(),
            )
        })?;
    Ok(format!("https://{name}-80.githubpreview.dev"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_devcontainer_layout() {
        let config = SetupConfig::default();
        assert_eq!(config.github.host_file, "data/github_host.txt");
        assert_eq!(config.github.orgs_file, "data/github_orgs.json");
        assert_eq!(config.output.result_file, "data/arc-setup.json");
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.ack_timeout_secs, None);
    }

    #[test]
    fn retry_settings_map_onto_a_policy() {
        let policy = RetrySettings::default().policy();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
        assert!(policy.jitter);
    }

    #[test]
    fn explicit_relay_urls_take_precedence() {
        let config = SetupConfig {
            relay: RelayConfig {
                base_url: Some("https://relay.example.test/gamf/".to_string()),
                webhook_url: Some("https://relay.example.test/webhook".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(
            config.relay_base_url().unwrap(),
            "https://relay.example.test/gamf"
        );
        assert_eq!(
            config.webhook_url().unwrap(),
            "https://relay.example.test/webhook"
        );
    }
}
