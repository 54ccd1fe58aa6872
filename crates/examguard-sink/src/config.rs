//! Configuration loading for the CLI and sinks.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examguard_core::guard::GuardPolicy;
use examguard_core::monitor::IntegrityPolicy;
use examguard_core::session::SessionConfig;

/// Where finished submissions go.
///
/// Note: Custom Debug impl masks the API token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Base URL of the quiz platform API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl std::fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Top-level examguard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamguardConfig {
    #[serde(default)]
    pub sink: SinkConfig,
    /// Output directory for session reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Tab-switch violation policy.
    #[serde(default)]
    pub integrity: IntegrityPolicy,
    /// Screenshot deterrence policy.
    #[serde(default)]
    pub guard: GuardPolicy,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./examguard-results")
}

impl Default for ExamguardConfig {
    fn default() -> Self {
        Self {
            sink: SinkConfig::default(),
            output_dir: default_output_dir(),
            integrity: IntegrityPolicy::default(),
            guard: GuardPolicy::default(),
        }
    }
}

impl ExamguardConfig {
    /// Session-level policies, ready to hand to a `Session`.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            integrity: self.integrity.clone(),
            guard: self.guard.clone(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examguard.toml` in the current directory
/// 2. `~/.config/examguard/config.toml`
///
/// Environment variable override: `EXAMGUARD_API_TOKEN`.
pub fn load_config() -> Result<ExamguardConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamguardConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examguard.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamguardConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamguardConfig::default(),
    };

    // Apply env var overrides
    if let Ok(token) = std::env::var("EXAMGUARD_API_TOKEN") {
        config.sink.api_token = Some(token);
    }

    config.sink.base_url = resolve_env_vars(&config.sink.base_url);
    config.sink.api_token = config.sink.api_token.as_ref().map(|t| resolve_env_vars(t));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examguard"))
}
