//! Configuration management for Travorama.
//!
//! Loads configuration from ${TRAVORAMA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "TRAVORAMA_API_BASE_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Travorama configuration and data directories.
    //!
    //! TRAVORAMA_HOME resolution order:
    //! 1. TRAVORAMA_HOME environment variable (if set)
    //! 2. ~/.config/travorama (default)
    //! 3. ./.travorama when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Travorama home directory.
    pub fn travorama_home() -> PathBuf {
        if let Ok(home) = std::env::var("TRAVORAMA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".travorama"),
            |h| h.join(".config").join("travorama"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        travorama_home().join("config.toml")
    }

    /// Returns the path to the persisted session flag.
    pub fn session_path() -> PathBuf {
        travorama_home().join("session.json")
    }

    /// Returns the directory that holds rolling log files.
    pub fn logs_dir() -> PathBuf {
        travorama_home().join("logs")
    }
}

/// Authentication API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the authentication API
    pub base_url: String,
    /// Request timeout in seconds (0 disables)
    pub timeout_secs: u32,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.travorama.com";
    pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

    /// Returns the request timeout, or None if disabled.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.timeout_secs)))
        }
    }

    /// Resolves the base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved URL is malformed.
    pub fn resolve_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var(BASE_URL_ENV) {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        let trimmed = self.base_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }

        Ok(Self::DEFAULT_BASE_URL.to_string())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    Ok(())
}

/// Login screen settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Calling code sent with phone-number identifiers.
    pub country_code: String,
    /// Target of the "Forgot password?" action.
    pub forgot_password_url: String,
}

impl LoginConfig {
    pub const DEFAULT_COUNTRY_CODE: &'static str = "62";
    pub const DEFAULT_FORGOT_PASSWORD_URL: &'static str =
        "https://www.travorama.com/forgot-password";

    /// Checks that `country_code` is a non-empty run of digits.
    ///
    /// # Errors
    /// Returns an error naming the offending value.
    pub fn validate(&self) -> Result<()> {
        let code = self.country_code.as_str();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!(
                "login.country_code must be a calling code of digits only, got {code:?}"
            );
        }
        Ok(())
    }
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            country_code: Self::DEFAULT_COUNTRY_CODE.to_string(),
            forgot_password_url: Self::DEFAULT_FORGOT_PASSWORD_URL.to_string(),
        }
    }
}

/// Push notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Register for push notifications after login.
    pub enabled: bool,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level used when TRAVORAMA_LOG is unset
    pub log_level: String,

    /// Authentication API settings
    pub api: ApiConfig,

    /// Login screen settings
    pub login: LoginConfig,

    /// Push notification settings
    pub push: PushConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            api: ApiConfig::default(),
            login: LoginConfig::default(),
            push: PushConfig::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_LOG_LEVEL: &'static str = "info";

    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?;
            config
                .login
                .validate()
                .with_context(|| format!("Invalid config in {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default config to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.login.country_code, "62");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.push.enabled);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "[api]\ntimeout_secs = 5\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.base_url, ApiConfig::DEFAULT_BASE_URL);
        assert_eq!(config.login.country_code, "62");
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "[api\nbroken").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.log_level, defaults.log_level);
        assert_eq!(config.api.base_url, defaults.api.base_url);
        assert_eq!(config.api.timeout_secs, defaults.api.timeout_secs);
        assert_eq!(config.login.country_code, defaults.login.country_code);
        assert_eq!(
            config.login.forgot_password_url,
            defaults.login.forgot_password_url
        );
        assert_eq!(config.push.enabled, defaults.push.enabled);
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("country_code = \"62\""));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "# existing").unwrap();

        let result = Config::init(&config_path);
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# existing");
    }

    #[test]
    fn test_timeout_zero_disables() {
        let api = ApiConfig {
            timeout_secs: 0,
            ..ApiConfig::default()
        };
        assert_eq!(api.timeout(), None);
        assert_eq!(
            ApiConfig::default().timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_resolve_base_url_rejects_garbage() {
        let api = ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        // Only meaningful when the env override is absent.
        if std::env::var(BASE_URL_ENV).is_err() {
            assert!(api.resolve_base_url().is_err());
        }
    }

    #[test]
    fn test_resolve_base_url_strips_trailing_slash() {
        let api = ApiConfig {
            base_url: "http://127.0.0.1:9999/".to_string(),
            ..ApiConfig::default()
        };
        if std::env::var(BASE_URL_ENV).is_err() {
            assert_eq!(api.resolve_base_url().unwrap(), "http://127.0.0.1:9999");
        }
    }

    #[test]
    fn test_load_rejects_bad_country_code() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        for bad in ["", "+62", "6 2", "id"] {
            fs::write(&path, format!("[login]\ncountry_code = {bad:?}\n")).unwrap();
            let err = Config::load_from(&path).unwrap_err();
            assert!(
                format!("{err:#}").contains("country_code"),
                "unexpected error for {bad:?}: {err:#}"
            );
        }

        fs::write(&path, "[login]\ncountry_code = \"65\"\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().login.country_code, "65");
    }
}
