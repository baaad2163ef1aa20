//! Layered application configuration.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::DisplayOptions;
use crate::providers::gemini::DEFAULT_BASE_URL;
use crate::session::{SessionSettings, DEFAULT_MODEL};
use crate::Error;

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "quadratic-tutor.toml";

/// Prefix for environment overrides, e.g. `TUTOR_MODEL`.
pub const ENV_PREFIX: &str = "TUTOR_";

/// Everything the tutor reads from config files and the environment.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub show_readability: bool,
    pub show_graph: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 120,
            temperature: None,
            max_output_tokens: None,
            show_readability: true,
            show_graph: true,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("show_readability", &self.show_readability)
            .field("show_graph", &self.show_graph)
            .finish()
    }
}

impl AppConfig {
    /// Reject values no session could work with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.model.trim().is_empty() {
            return Err(Error::config("model must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::config(format!(
                    "temperature must be between 0 and 2, got {temperature}"
                )));
            }
        }
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            show_readability: self.show_readability,
            show_graph: self.show_graph,
        }
    }
}

/// Discovers and merges configuration sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with this priority (highest first):
    ///
    /// 1. `TUTOR_*` environment variables
    /// 2. explicit `--config` path
    /// 3. `./quadratic-tutor.toml`
    /// 4. `$XDG_CONFIG_HOME/quadratic-tutor/config.toml`
    /// 5. built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<AppConfig, Error> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        let project_path = PathBuf::from(PROJECT_CONFIG_FILE);
        if project_path.exists() {
            figment = figment.merge(Toml::file(&project_path));
        }

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Error::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        Self::finish(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Defaults plus environment only (for `--no-config`).
    pub fn load_without_files() -> Result<AppConfig, Error> {
        Self::finish(
            Figment::new()
                .merge(Serialized::defaults(AppConfig::default()))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn finish(figment: Figment) -> Result<AppConfig, Error> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/quadratic-tutor/config.toml` or the platform equivalent.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("quadratic-tutor").join("config.toml"))
    }

    /// Describe which config files exist, in priority order.
    pub fn describe_sources(explicit: Option<&Path>) -> String {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];
        lines.push(format!("  [ENV  ] {ENV_PREFIX}* environment variables"));

        if let Some(path) = explicit {
            lines.push(format!("  {} Explicit: {}", marker(path), path.display()));
        }

        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        lines.push(format!("  {} Project: {}", marker(&project), project.display()));

        if let Some(path) = Self::global_config_path() {
            lines.push(format!("  {} Global:  {}", marker(&path), path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines.join("\n")
    }
}

fn marker(path: &Path) -> &'static str {
    if path.exists() {
        "[FOUND]"
    } else {
        "[     ]"
    }
}
