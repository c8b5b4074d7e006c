use crate::config::api_base::{ApiBase, BaseUrlSources, Environment};
use crate::domain::model::{DEFAULT_HORIZON_YEARS, MAX_HORIZON_YEARS};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SimError};
use crate::utils::validation::{validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "plusvalia.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    #[serde(default)]
    pub proxy: bool,
    #[serde(default)]
    pub environment: Environment,
    /// Origin that serves `/api` when the base is relative (proxy or production).
    pub origin: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_horizon")]
    pub default_horizon: i32,
    #[serde(default = "default_true")]
    pub alert_on_error: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_horizon: default_horizon(),
            alert_on_error: true,
        }
    }
}

fn default_horizon() -> i32 {
    DEFAULT_HORIZON_YEARS
}

fn default_true() -> bool {
    true
}

/// Command-line values layered on top of the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base: Option<String>,
}

impl SimulatorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SimError::InvalidConfigValue {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Missing files fall back to defaults; unreadable or malformed ones are errors.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        tracing::debug!("Loading configuration from {}", path.display());
        Self::from_file(&path)
    }

    /// 替換環境變數 (例如 ${API_HOST})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| SimError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn base_url_sources(&self, overrides: &ConfigOverrides) -> BaseUrlSources {
        BaseUrlSources {
            cli_override: overrides.api_base.clone(),
            configured: self.api.base_url.clone(),
            proxy: self.api.proxy,
            environment: self.api.environment,
        }
    }

    /// Validates and resolves the base URL against the process environment.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
        self.validate()?;
        let base = ApiBase::from_process_env(&self.base_url_sources(overrides));
        self.resolve_with_base(base)
    }

    pub fn resolve_with_base(&self, base: ApiBase) -> Result<ResolvedConfig> {
        let api_base_url = base.to_absolute(self.api.origin.as_deref())?;
        Ok(ResolvedConfig {
            api_base_url,
            base,
            timeout: self.api.timeout_seconds.map(Duration::from_secs),
            default_horizon: self.simulation.default_horizon,
            alert_on_error: self.simulation.alert_on_error,
        })
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_template())?;
        Ok(())
    }

    pub fn default_template() -> &'static str {
        r#"[api]
# base_url = "http://localhost:8000"
proxy = false
environment = "development"
# origin = "http://localhost:5173"
# timeout_seconds = 30

[simulation]
default_horizon = 5
alert_on_error = true
"#
    }
}

impl Validate for SimulatorConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = self.api.base_url.as_deref().filter(|u| !u.is_empty()) {
            validate_url("api.base_url", base_url)?;
        }
        if let Some(origin) = self.api.origin.as_deref() {
            validate_url("api.origin", origin)?;
        }
        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 600)?;
        }
        validate_range(
            "simulation.default_horizon",
            self.simulation.default_horizon,
            1,
            MAX_HORIZON_YEARS,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    pub base: ApiBase,
    pub timeout: Option<Duration>,
    pub default_horizon: i32,
    pub alert_on_error: bool,
}

impl ResolvedConfig {
    /// Resolved configuration pointing at an absolute base, used by tests and embedders.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            api_base_url: base_url.trim_end_matches('/').to_string(),
            base: ApiBase::Absolute(base_url),
            timeout: None,
            default_horizon: DEFAULT_HORIZON_YEARS,
            alert_on_error: true,
        }
    }
}

impl ConfigProvider for ResolvedConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn default_horizon(&self) -> i32 {
        self.default_horizon
    }

    fn alert_on_error(&self) -> bool {
        self.alert_on_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[api]
base_url = "https://plusvalia.example.com"
timeout_seconds = 15

[simulation]
default_horizon = 7
alert_on_error = false
"#;

        let config = SimulatorConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://plusvalia.example.com")
        );
        assert_eq!(config.simulation.default_horizon, 7);
        assert!(!config.simulation.alert_on_error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SimulatorConfig::from_toml_str("").unwrap();
        assert_eq!(config.simulation.default_horizon, 5);
        assert!(config.simulation.alert_on_error);
        assert_eq!(config.api.environment, Environment::Development);
        assert!(!config.api.proxy);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PLUSVALIA_TEST_ORIGIN", "https://front.example.com");

        let toml_content = r#"
[api]
proxy = true
origin = "${PLUSVALIA_TEST_ORIGIN}"
"#;

        let config = SimulatorConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.api.origin.as_deref(),
            Some("https://front.example.com")
        );

        std::env::remove_var("PLUSVALIA_TEST_ORIGIN");
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let bad_url = SimulatorConfig::from_toml_str(
            r#"
[api]
base_url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(bad_url.validate().is_err());

        let bad_horizon = SimulatorConfig::from_toml_str(
            r#"
[simulation]
default_horizon = 12
"#,
        )
        .unwrap();
        assert!(bad_horizon.validate().is_err());
    }

    #[test]
    fn test_resolve_relative_base_with_origin() {
        let config = SimulatorConfig::from_toml_str(
            r#"
[api]
proxy = true
origin = "http://localhost:5173"
"#,
        )
        .unwrap();

        let resolved = config.resolve_with_base(ApiBase::Relative).unwrap();
        assert_eq!(resolved.api_base_url(), "http://localhost:5173");
        assert_eq!(resolved.base, ApiBase::Relative);
    }

    #[test]
    fn test_config_from_file_and_missing_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(SimulatorConfig::default_template().as_bytes())
            .unwrap();

        let config = SimulatorConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.simulation.default_horizon, 5);

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let config = SimulatorConfig::load(Some(missing.as_path())).unwrap();
        assert!(config.api.base_url.is_none());
    }

    #[test]
    fn test_write_template_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("plusvalia.toml");
        SimulatorConfig::write_template(&path).unwrap();
        let config = SimulatorConfig::from_file(&path).unwrap();
        assert!(config.validate().is_ok());
    }
}
