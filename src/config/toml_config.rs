use crate::config::{
    normalize_api_key, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_OUTPUT_FILENAME,
    DEFAULT_OUTPUT_PATH, DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::selector::SelectionCriteria;
use crate::core::ConfigProvider;
use crate::utils::error::{PickerError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub selection: SelectionCriteria,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub temperature: Option<f32>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_seconds: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_output_filename")]
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_output_filename(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PickerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PickerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PickerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("oracle.endpoint", &self.oracle.endpoint)?;
        validation::validate_non_empty_string("oracle.model", &self.oracle.model)?;
        validation::validate_positive_number("oracle.timeout_seconds", self.timeout_seconds(), 1)?;
        validation::validate_range("oracle.temperature", self.temperature(), 0.0, 2.0)?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_non_empty_string("output.filename", &self.output.filename)?;

        if let Some(location) = &self.selection.location {
            validation::validate_non_empty_string("selection.location", location)?;
        }

        Ok(())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.oracle.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn temperature(&self) -> f32 {
        self.oracle.temperature.unwrap_or(0.0)
    }

    pub fn selection_criteria(&self) -> SelectionCriteria {
        self.selection.clone()
    }
}

impl ConfigProvider for TomlConfig {
    fn oracle_endpoint(&self) -> &str {
        &self.oracle.endpoint
    }

    fn oracle_model(&self) -> &str {
        &self.oracle.model
    }

    fn api_key(&self) -> Option<&str> {
        normalize_api_key(self.oracle.api_key.as_deref())
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds()
    }

    fn temperature(&self) -> f32 {
        self.temperature()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
