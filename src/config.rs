//! Configuration management for OBS Tally
//!
//! Merges an optional YAML file with command-line overrides into a single
//! immutable configuration value handed to the engine at startup.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub obs: ObsConfig,
    /// GPIO pin to source assignments
    #[serde(default)]
    pub assigns: Vec<Assignment>,
    /// Absorb connection failures and retry forever
    #[serde(default)]
    pub daemon: bool,
}

/// OBS WebSocket configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObsConfig {
    #[serde(default = "default_obs_host")]
    pub host: String,
    #[serde(default = "default_obs_port")]
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            host: default_obs_host(),
            port: default_obs_port(),
            password: None,
        }
    }
}

/// A single GPIO-pin-to-source assignment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Assignment {
    pub pin: u8,
    pub source: String,
}

impl Assignment {
    /// Parse a `PIN=SOURCE_NAME` assignment as given on the command line.
    ///
    /// The source name runs to the end of the string, so names containing
    /// `=` survive.
    pub fn parse(spec: &str) -> Result<Self> {
        let Some((pin, source)) = spec.split_once('=') else {
            bail!("invalid assignment '{}': expected PIN=SOURCE_NAME", spec);
        };
        let pin = pin
            .trim()
            .parse::<u8>()
            .with_context(|| format!("invalid GPIO pin in assignment '{}'", spec))?;
        if source.is_empty() {
            bail!("invalid assignment '{}': source name is empty", spec);
        }
        Ok(Self {
            pin,
            source: source.to_string(),
        })
    }
}

impl AppConfig {
    /// Load configuration from file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        Ok(config)
    }

    /// Override the obs-websocket endpoint from a `HOST:PORT` string.
    ///
    /// A bare host keeps the default port; an empty host before the colon
    /// keeps the default host.
    pub fn apply_endpoint(&mut self, spec: &str) -> Result<()> {
        match spec.split_once(':') {
            Some((host, port)) => {
                if !host.is_empty() {
                    self.obs.host = host.to_string();
                }
                self.obs.port = port
                    .parse()
                    .with_context(|| format!("invalid port in '{}'", spec))?;
            }
            None => {
                if !spec.is_empty() {
                    self.obs.host = spec.to_string();
                }
            }
        }
        Ok(())
    }

    /// Append command-line assignments after any file-provided ones.
    pub fn apply_assigns(&mut self, specs: &[String]) -> Result<()> {
        for spec in specs {
            self.assigns.push(Assignment::parse(spec)?);
        }
        Ok(())
    }
}

// Default value functions
fn default_obs_host() -> String {
    "localhost".to_string()
}
fn default_obs_port() -> u16 {
    4455
}
