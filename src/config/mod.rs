use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::grid::SortDirection;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub grid: GridConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub enable_request_logging: bool,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// What a list screen does with its page index when filters, search or sort
/// change. Screens in the field disagree, so it is a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterResetPolicy {
    /// Query the new filters at the current page
    #[default]
    Keep,
    /// Jump back to page 0
    ResetToFirstPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub default_page_size: u32,
    pub page_size_options: Vec<u32>,
    pub filter_reset: FilterResetPolicy,
    pub default_sort_by: String,
    pub default_sort_dir: SortDirection,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_page_size: 5,
            page_size_options: vec![5, 10, 25],
            filter_reset: FilterResetPolicy::Keep,
            default_sort_by: "id".to_string(),
            default_sort_dir: SortDirection::Asc,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("SCM_BASE_API_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = env::var("SCM_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("SCM_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Grid overrides
        if let Ok(v) = env::var("SCM_GRID_PAGE_SIZE") {
            self.grid.default_page_size = v.parse().ok().filter(|n| *n > 0).unwrap_or(self.grid.default_page_size);
        }
        if let Ok(v) = env::var("SCM_GRID_PAGE_SIZE_OPTIONS") {
            let options: Vec<u32> = v.split(',').filter_map(|s| s.trim().parse().ok()).filter(|n| *n > 0).collect();
            if !options.is_empty() {
                self.grid.page_size_options = options;
            }
        }
        if let Ok(v) = env::var("SCM_GRID_FILTER_RESET") {
            self.grid.filter_reset = match v.as_str() {
                "reset" | "reset_to_first_page" | "first" => FilterResetPolicy::ResetToFirstPage,
                "keep" => FilterResetPolicy::Keep,
                _ => self.grid.filter_reset,
            };
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                request_timeout_secs: 30,
                enable_request_logging: true,
            },
            grid: GridConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging-api.example.com".to_string(),
                request_timeout_secs: 15,
                enable_request_logging: true,
            },
            grid: GridConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.example.com".to_string(),
                request_timeout_secs: 10,
                enable_request_logging: false,
            },
            grid: GridConfig {
                default_page_size: 10,
                ..GridConfig::default()
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.grid.default_page_size, 5);
        assert_eq!(config.grid.page_size_options, vec![5, 10, 25]);
        assert_eq!(config.grid.filter_reset, FilterResetPolicy::Keep);
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.grid.default_page_size, 10);
        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
        assert!(!config.api.enable_request_logging);
    }
}
