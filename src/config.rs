use crate::app::ports::AuthUser;
use crate::error::{ClaError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stage: String,
    pub port: u16,
    pub local_mode: bool,
    /// Hosts allowed to make cross-origin requests outside local mode
    pub allowed_origins: Vec<String>,
    pub api_gateway_url: String,
    pub log_dir: PathBuf,
    pub scan_page_size: usize,
    /// JSON snapshot of the in-memory store, loaded at start and saved on exit
    pub data_file: Option<PathBuf>,
    pub calculate_metrics_on_start: bool,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token to identity
    pub tokens: HashMap<String, AuthUser>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stage: "dev".to_string(),
            port: 8080,
            local_mode: false,
            allowed_origins: Vec::new(),
            api_gateway_url: "https://api-gw.dev.platform.linuxfoundation.org".to_string(),
            log_dir: PathBuf::from("logs"),
            scan_page_size: 100,
            data_file: None,
            calculate_metrics_on_start: false,
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Load `path` if it exists (defaults otherwise), then apply environment
    /// overrides. A `.env` file is read into the environment first.
    pub fn load(path: &Path) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ClaError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            Self::from_toml(&content)?
        } else {
            debug!("config file {} not found, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay values from `lookup`, which is the process environment outside tests
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(stage) = lookup("STAGE") {
            self.stage = stage;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ClaError::Config(format!("invalid PORT value '{port}'")))?;
        }
        if let Some(local) = lookup("LOCAL_MODE") {
            self.local_mode = matches!(local.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(url) = lookup("API_GATEWAY_URL") {
            self.api_gateway_url = url;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("DATA_FILE") {
            self.data_file = Some(PathBuf::from(file));
        }
        if self.stage.trim().is_empty() {
            return Err(ClaError::Config("stage must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_with_tokens() {
        let config = Config::from_toml(
            r#"
            stage = "staging"
            port = 9000
            allowed_origins = ["project.lfx.dev"]

            [auth.tokens.abc123]
            lf_username = "jdoe"
            lf_email = "jdoe@example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.stage, "staging");
        assert_eq!(config.port, 9000);
        assert_eq!(config.scan_page_size, 100);
        assert_eq!(config.auth.tokens["abc123"].lf_username, "jdoe");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = [
            ("STAGE", "prod"),
            ("PORT", "7070"),
            ("LOCAL_MODE", "true"),
            ("ALLOWED_ORIGINS", "a.example.org, localhost ,"),
        ]
        .into_iter()
        .collect();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.stage, "prod");
        assert_eq!(config.port, 7070);
        assert!(config.local_mode);
        assert_eq!(config.allowed_origins, vec!["a.example.org", "localhost"]);
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ClaError::Config(_)));
    }
}
