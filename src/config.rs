//! Configuration Management
//!
//! Handles persistent configuration storage for jmxdump.

use crate::mbean::serializer::DEFAULT_MAX_DEPTH;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Agent URL used when nothing else is configured
pub const DEFAULT_URL: &str = "http://localhost:8778/jolokia/";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_URL: &str = "JMXDUMP_URL";
const ENV_USER: &str = "JMXDUMP_USER";
const ENV_PASSWORD: &str = "JMXDUMP_PASSWORD";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Jolokia agent URL
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Session default domain, dumped when no domain is given
    #[serde(default)]
    pub default_domain: Option<String>,
    /// Nesting bound for attribute values
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Resources fetched at once
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jmxdump").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Cannot read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective agent URL (CLI > env > config > default)
    pub fn effective_url(&self, cli: Option<&str>) -> String {
        first_set(&[cli, env_var(ENV_URL).as_deref(), self.url.as_deref()])
            .unwrap_or(DEFAULT_URL)
            .to_string()
    }

    /// Get effective user (CLI > env > config)
    pub fn effective_user(&self, cli: Option<&str>) -> Option<String> {
        first_set(&[cli, env_var(ENV_USER).as_deref(), self.user.as_deref()]).map(str::to_string)
    }

    /// Get effective password (CLI > env > config)
    pub fn effective_password(&self, cli: Option<&str>) -> Option<String> {
        first_set(&[cli, env_var(ENV_PASSWORD).as_deref(), self.password.as_deref()])
            .map(str::to_string)
    }

    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.filter(|d| *d > 0).unwrap_or(DEFAULT_MAX_DEPTH)
    }

    pub fn effective_concurrency(&self, cli: Option<usize>) -> usize {
        cli.or(self.concurrency).unwrap_or(1).max(1)
    }

    pub fn effective_timeout_secs(&self, cli: Option<u64>) -> u64 {
        cli.or(self.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Set the session default domain and save
    pub fn set_default_domain(&mut self, domain: &str) -> Result<()> {
        self.default_domain = Some(domain.to_string());
        self.save()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// First non-blank value in precedence order
fn first_set<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .map(str::trim)
        .find(|s| !s.is_empty())
}
