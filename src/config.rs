use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File}; // Use the config crate
use directories_next::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Where the drafting backend lives and how long to wait for it
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    /// Per-request timeout; `0` waits forever.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// Top-level application configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Loads configuration from files and environment variables.
    ///
    /// Later sources override earlier ones:
    /// 1. built-in defaults
    /// 2. `<user config dir>/draft-desk/config.toml` (optional)
    /// 3. `config.toml` in the working directory (optional)
    /// 4. Environment variables prefixed with `DRAFT_DESK_`, `__` between
    ///    levels (e.g. `DRAFT_DESK_BACKEND__BASE_URL`)
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;
        if let Some(path) = user_config_path() {
            log::debug!("Looking for user config at {}", path.display());
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("DRAFT_DESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("backend.base_url", DEFAULT_BASE_URL)?
            .set_default("backend.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)
    }
}

fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "draft-desk").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> AppConfig {
        AppConfig::defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply_without_file() {
        let config = from_toml("");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.backend.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn file_overrides_defaults() {
        let config = from_toml(
            r#"
            [backend]
            base_url = "https://drafts.example.com/api"
            timeout_secs = 0
            "#,
        );
        assert_eq!(config.backend.base_url, "https://drafts.example.com/api");
        assert_eq!(config.backend.timeout(), None);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = from_toml("[backend]\ntimeout_secs = 5\n");
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.backend.timeout_secs, 5);
    }

    #[test]
    fn missing_timeout_without_builder_defaults_is_thirty_seconds() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(
                "[backend]\nbase_url = \"http://localhost:8080/\"\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8080/");
        assert_eq!(config.backend.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.backend.timeout(), Some(Duration::from_secs(30)));
    }
}
