//! Client configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level edukit configuration.
///
/// Note: Custom Debug impl masks the API token to prevent accidental
/// exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct EdukitConfig {
    /// Base URL of the persistence service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for the persistence service, if it requires one.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Pass threshold in percent, consumed by reporting only.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u8,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory the CLI writes reports into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl std::fmt::Debug for EdukitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdukitConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("pass_threshold", &self.pass_threshold)
            .field("timeout_secs", &self.timeout_secs)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_pass_threshold() -> u8 {
    edukit_core::statistics::DEFAULT_PASS_THRESHOLD
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./edukit-results")
}

impl Default for EdukitConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            pass_threshold: default_pass_threshold(),
            timeout_secs: default_timeout_secs(),
            output_dir: default_output_dir(),
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
/// 1. `edukit.toml` in the current directory
/// 2. `~/.config/edukit/config.toml`
///
/// Environment variable overrides: `EDUKIT_BASE_URL`, `EDUKIT_API_TOKEN`.
pub fn load_config() -> Result<EdukitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EdukitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("edukit.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<EdukitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EdukitConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("EDUKIT_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(token) = std::env::var("EDUKIT_API_TOKEN") {
        config.api_token = Some(token);
    }

    // Resolve env vars referenced from the file
    config.base_url = resolve_env_vars(&config.base_url);
    config.api_token = config.api_token.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("edukit"))
}
