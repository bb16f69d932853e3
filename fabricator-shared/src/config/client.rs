use crate::models::Credentials;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{env, fmt, fs, path::PathBuf, time::Duration};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors produced while loading the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File named on the command line.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The YAML file did not parse.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yml::Error),
    /// The JSON file did not parse.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The extension is neither yaml nor json.
    #[error("unsupported configuration format for {0}. Use 'yaml' or 'json'.")]
    UnsupportedFormat(PathBuf),
    /// An environment override could not be parsed.
    #[error("invalid {key} value: {message}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Parse failure.
        message: String,
    },
    /// One or more settings failed validation.
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// The main configuration structure for the Fabricator client
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend API, with a trailing slash
    pub api_base_url: Url,

    /// Identifier of the fallback service account used for automatic login
    pub fallback_username: String,

    /// Secret of the fallback service account
    pub fallback_password: String,

    /// Scheme prefixed to the access token in the `Authorization` header
    pub auth_scheme: String,

    /// Delay before a scheduled reload fires, in milliseconds
    pub reload_delay_ms: u64,

    /// Per-request timeout applied by the HTTP transport, in seconds
    pub request_timeout_secs: u64,

    /// Logging level
    pub log_level: String,

    /// File holding the persisted token and initialization marker
    pub state_path: PathBuf,
}

impl ClientConfig {
    /// Generates a default configuration.
    ///
    /// # Panics
    /// Never; the default base URL is a valid literal.
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: default_base_url(),
            fallback_username: "fabricator".to_string(),
            fallback_password: String::new(),
            auth_scheme: "Bearer".to_string(),
            reload_delay_ms: 2000,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
            state_path: default_state_path(),
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// File values replace defaults; environment variables only apply to
    /// values still at their default; `base_url_override` wins over both.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, an
    /// environment value is malformed, or the result fails [`Self::validate`].
    pub fn load_config(
        config_path: Option<PathBuf>,
        base_url_override: Option<Url>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::with_defaults();
        let mut config = defaults.clone();

        if let Some(path) = config_path {
            debug!(path = %path.display(), "loading client configuration file");
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            config = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => serde_yml::from_str(&content)?,
                Some("json") => serde_json::from_str(&content)?,
                _ => return Err(ConfigError::UnsupportedFormat(path)),
            };
        }

        if config.api_base_url == defaults.api_base_url {
            if let Ok(value) = env::var("FABRICATOR_API_BASE_URL") {
                config.api_base_url =
                    Url::parse(&value).map_err(|err| ConfigError::InvalidValue {
                        key: "FABRICATOR_API_BASE_URL",
                        message: err.to_string(),
                    })?;
            }
        }
        if config.fallback_username == defaults.fallback_username {
            if let Ok(value) = env::var("FABRICATOR_USERNAME") {
                config.fallback_username = value;
            }
        }
        if config.fallback_password == defaults.fallback_password {
            if let Ok(value) = env::var("FABRICATOR_PASSWORD") {
                config.fallback_password = value;
            }
        }
        if config.auth_scheme == defaults.auth_scheme {
            if let Ok(value) = env::var("FABRICATOR_AUTH_SCHEME") {
                config.auth_scheme = value;
            }
        }
        if config.reload_delay_ms == defaults.reload_delay_ms {
            if let Ok(value) = env::var("FABRICATOR_RELOAD_DELAY_MS") {
                config.reload_delay_ms = parse_number("FABRICATOR_RELOAD_DELAY_MS", &value)?;
            }
        }
        if config.request_timeout_secs == defaults.request_timeout_secs {
            if let Ok(value) = env::var("FABRICATOR_REQUEST_TIMEOUT_SECS") {
                config.request_timeout_secs =
                    parse_number("FABRICATOR_REQUEST_TIMEOUT_SECS", &value)?;
            }
        }
        if config.log_level == defaults.log_level {
            if let Ok(value) = env::var("FABRICATOR_LOG_LEVEL") {
                config.log_level = value;
            }
        }
        if config.state_path == defaults.state_path {
            if let Ok(value) = env::var("FABRICATOR_STATE_PATH") {
                config.state_path = PathBuf::from(value);
            }
        }

        if let Some(url) = base_url_override {
            config.api_base_url = url;
        }

        config.api_base_url = with_trailing_slash(config.api_base_url);
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate the complete configuration, collecting every problem.
    ///
    /// # Errors
    /// Returns the list of problems found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !matches!(self.api_base_url.scheme(), "http" | "https") {
            errors.push(format!(
                "API base URL must use http or https: {}",
                self.api_base_url
            ));
        }
        if self.fallback_username.trim().is_empty() {
            errors.push("Fallback username must not be empty.".to_string());
        }
        if self.auth_scheme.trim().is_empty() {
            errors.push("Authorization scheme must not be empty.".to_string());
        }
        if self.reload_delay_ms == 0 {
            errors.push("Reload delay must be greater than 0.".to_string());
        }
        if self.request_timeout_secs == 0 {
            errors.push("Request timeout must be greater than 0.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Credentials of the fallback service account.
    #[must_use]
    pub fn fallback_credentials(&self) -> Credentials {
        Credentials::new(&self.fallback_username, &self.fallback_password)
    }

    /// `reload_delay_ms` as a duration.
    #[must_use]
    pub const fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    /// `request_timeout_secs` as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("fallback_username", &self.fallback_username)
            .field("fallback_password", &"<redacted>")
            .field("auth_scheme", &self.auth_scheme)
            .field("reload_delay_ms", &self.reload_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .field("state_path", &self.state_path)
            .finish()
    }
}

fn default_base_url() -> Url {
    Url::parse("http://localhost:8000/").unwrap_or_else(|_| unreachable!("static URL parses"))
}

fn default_state_path() -> PathBuf {
    BaseDirs::new().map_or_else(
        || PathBuf::from("./fabricator-state.json"),
        |dirs| dirs.config_dir().join("fabricator").join("state.json"),
    )
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        message: format!("expected a non-negative number, got {value:?}"),
    })
}

/// Relative joins drop the last path segment unless it ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn cleanup_env_vars() {
        unsafe {
            for key in [
                "FABRICATOR_API_BASE_URL",
                "FABRICATOR_USERNAME",
                "FABRICATOR_PASSWORD",
                "FABRICATOR_AUTH_SCHEME",
                "FABRICATOR_RELOAD_DELAY_MS",
                "FABRICATOR_REQUEST_TIMEOUT_SECS",
                "FABRICATOR_LOG_LEVEL",
                "FABRICATOR_STATE_PATH",
            ] {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_config_with_defaults() {
        let config = ClientConfig::with_defaults();

        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.fallback_username, "fabricator");
        assert_eq!(config.auth_scheme, "Bearer");
        assert_eq!(config.reload_delay(), Duration::from_secs(2));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_config_without_file_uses_defaults() {
        cleanup_env_vars();
        let config = ClientConfig::load_config(None, None).unwrap();
        assert_eq!(config, ClientConfig::with_defaults());
    }

    #[test]
    #[serial]
    fn test_load_config_from_yaml() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        let mut file_config = ClientConfig::with_defaults();
        file_config.api_base_url = Url::parse("https://shop.example.com/backend").unwrap();
        file_config.fallback_username = "svc".to_string();
        file_config.fallback_password = "pw".to_string();
        file_config.reload_delay_ms = 500;
        fs::write(&path, serde_yml::to_string(&file_config).unwrap()).unwrap();

        let config = ClientConfig::load_config(Some(path), None).unwrap();

        assert_eq!(
            config.api_base_url.as_str(),
            "https://shop.example.com/backend/"
        );
        assert_eq!(config.fallback_credentials(), Credentials::new("svc", "pw"));
        assert_eq!(config.reload_delay_ms, 500);
    }

    #[test]
    #[serial]
    fn test_load_config_from_json() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let mut file_config = ClientConfig::with_defaults();
        file_config.auth_scheme = "JWT".to_string();
        fs::write(&path, serde_json::to_string_pretty(&file_config).unwrap()).unwrap();

        let config = ClientConfig::load_config(Some(path), None).unwrap();
        assert_eq!(config.auth_scheme, "JWT");
    }

    #[test]
    #[serial]
    fn test_load_config_unsupported_format() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "reload_delay_ms = 1").unwrap();

        let result = ClientConfig::load_config(Some(path), None);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file() {
        cleanup_env_vars();
        let result = ClientConfig::load_config(Some(PathBuf::from("/nonexistent/c.yaml")), None);
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        cleanup_env_vars();
        unsafe {
            std::env::set_var("FABRICATOR_API_BASE_URL", "http://api.internal:9000");
            std::env::set_var("FABRICATOR_USERNAME", "svc");
            std::env::set_var("FABRICATOR_PASSWORD", "pw");
            std::env::set_var("FABRICATOR_RELOAD_DELAY_MS", "250");
            std::env::set_var("FABRICATOR_STATE_PATH", "/tmp/fabricator-state.json");
        }

        let config = ClientConfig::load_config(None, None).unwrap();
        cleanup_env_vars();

        assert_eq!(config.api_base_url.as_str(), "http://api.internal:9000/");
        assert_eq!(config.fallback_credentials(), Credentials::new("svc", "pw"));
        assert_eq!(config.reload_delay_ms, 250);
        assert_eq!(
            config.state_path,
            PathBuf::from("/tmp/fabricator-state.json")
        );
    }

    #[test]
    #[serial]
    fn test_env_invalid_number() {
        cleanup_env_vars();
        unsafe {
            std::env::set_var("FABRICATOR_REQUEST_TIMEOUT_SECS", "soon");
        }

        let result = ClientConfig::load_config(None, None);
        cleanup_env_vars();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "FABRICATOR_REQUEST_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    #[serial]
    fn test_override_wins_over_env() {
        cleanup_env_vars();
        unsafe {
            std::env::set_var("FABRICATOR_API_BASE_URL", "http://from-env:1/");
        }

        let override_url = Url::parse("http://from-flag:2/api").unwrap();
        let config = ClientConfig::load_config(None, Some(override_url)).unwrap();
        cleanup_env_vars();

        assert_eq!(config.api_base_url.as_str(), "http://from-flag:2/api/");
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = ClientConfig::with_defaults();
        config.api_base_url = Url::parse("ftp://files.example.com/").unwrap();
        config.fallback_username = "  ".to_string();
        config.reload_delay_ms = 0;
        config.request_timeout_secs = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = ClientConfig::with_defaults();
        config.fallback_password = "top-secret".to_string();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("fabricator"));
    }
}
