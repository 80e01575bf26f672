use super::toml_config::TomlConfig;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const API_BASE_URL_ENV: &str = "API_BASE_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/data-import";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const MAX_PAGE_SIZE: u32 = 500;

/// 命令列可覆寫的值，`None` 表示未指定
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub page_size: Option<u32>,
}

/// 合併後的執行設定
///
/// 後端來源的優先順序：命令列 > `API_BASE_URL` > TOML `[api].base_url` > 預設值。
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub timeout: Duration,
    pub page_size: u32,
    pub refresh_interval: Duration,
    pub search_debounce: Duration,
    pub headers: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&SettingsOverrides::default(), None, None)
    }
}

impl Settings {
    pub fn resolve(
        overrides: &SettingsOverrides,
        env_base_url: Option<String>,
        file: Option<&TomlConfig>,
    ) -> Self {
        let file_api = file.map(|f| &f.api);
        let file_console = file.map(|f| &f.console);

        let api_base_url = overrides
            .api_base_url
            .clone()
            .or_else(|| env_base_url.filter(|url| !url.trim().is_empty()))
            .or_else(|| file_api.and_then(|api| api.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let timeout_seconds = overrides
            .timeout_seconds
            .or_else(|| file_api.and_then(|api| api.timeout_seconds))
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let page_size = overrides
            .page_size
            .or_else(|| file_console.and_then(|c| c.page_size))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let refresh_seconds = file_console
            .and_then(|c| c.refresh_interval_seconds)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECONDS);

        let debounce_ms = file_console
            .and_then(|c| c.search_debounce_ms)
            .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS);

        Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_seconds),
            page_size,
            refresh_interval: Duration::from_secs(refresh_seconds),
            search_debounce: Duration::from_millis(debounce_ms),
            headers: file.map(TomlConfig::headers).unwrap_or_default(),
        }
    }

    /// 讀取環境變數與選用的 TOML 檔後合併
    pub fn load(overrides: &SettingsOverrides, config_file: Option<&Path>) -> Result<Self> {
        let file = match config_file {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Some(file)
            }
            None => None,
        };
        let env_base_url = std::env::var(API_BASE_URL_ENV).ok();

        let settings = Self::resolve(overrides, env_base_url, file.as_ref());
        settings.validate()?;
        Ok(settings)
    }
}

impl ConfigProvider for Settings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    fn search_debounce(&self) -> Duration {
        self.search_debounce
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        validate_positive_number("timeout_seconds", self.timeout.as_secs(), 1)?;
        validate_range("page_size", self.page_size, 1, MAX_PAGE_SIZE)?;
        validate_positive_number(
            "console.refresh_interval_seconds",
            self.refresh_interval.as_secs(),
            1,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::{ApiConfig, ConsoleConfig};
    use crate::utils::error::MigrationError;

    fn file_with_url(url: &str) -> TomlConfig {
        TomlConfig {
            api: ApiConfig {
                base_url: Some(url.to_string()),
                ..Default::default()
            },
            console: ConsoleConfig {
                page_size: Some(50),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.refresh_interval, Duration::from_secs(30));
        assert_eq!(settings.search_debounce, Duration::from_millis(500));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_base_url_precedence() {
        let file = file_with_url("http://from-file:8080");
        let env = Some("http://from-env:8080".to_string());
        let cli = SettingsOverrides {
            api_base_url: Some("http://from-cli:8080".to_string()),
            ..Default::default()
        };

        let settings = Settings::resolve(&cli, env.clone(), Some(&file));
        assert_eq!(settings.api_base_url, "http://from-cli:8080");

        let settings = Settings::resolve(&SettingsOverrides::default(), env, Some(&file));
        assert_eq!(settings.api_base_url, "http://from-env:8080");

        let settings = Settings::resolve(&SettingsOverrides::default(), None, Some(&file));
        assert_eq!(settings.api_base_url, "http://from-file:8080");
        assert_eq!(settings.page_size, 50);
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let settings = Settings::resolve(&SettingsOverrides::default(), Some("  ".to_string()), None);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_page_size_out_of_range() {
        let overrides = SettingsOverrides {
            page_size: Some(0),
            ..Default::default()
        };
        let err = Settings::resolve(&overrides, None, None).validate().unwrap_err();
        assert!(matches!(
            err,
            MigrationError::InvalidConfigValueError { ref field, .. } if field == "page_size"
        ));
    }

    #[test]
    fn test_non_http_origin_is_rejected() {
        let overrides = SettingsOverrides {
            api_base_url: Some("ftp://backend".to_string()),
            ..Default::default()
        };
        assert!(Settings::resolve(&overrides, None, None).validate().is_err());
    }
}
