use crate::config::{
    normalize_api_key, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_OUTPUT_FILENAME, DEFAULT_OUTPUT_PATH,
};
use crate::core::resolver::extract_explicit_area_code;
use crate::core::selector::SelectionCriteria;
use crate::core::{ConfigProvider, Storage};
use crate::domain::model::Capability;
use crate::utils::error::{PickerError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "areacode-picker")]
#[command(about = "Resolve the best area code for a set of ZIP codes and pick a phone number")]
pub struct CliConfig {
    #[arg(long, help = "ZIP codes: comma/space/newline separated or a JSON array")]
    pub zip_codes: Option<String>,

    #[arg(long, help = "Explicit area code, skips the ZIP code lookup")]
    pub area_code: Option<String>,

    #[arg(long, help = "JSON file with the phone number listing (row texts or records)")]
    pub candidates: Option<String>,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, help = "Oracle API key, defaults to $OPENAI_API_KEY")]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "0")]
    pub temperature: f32,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILENAME)]
    pub output_filename: String,

    #[arg(long, help = "Prefer numbers whose locality contains this text")]
    pub location: Option<String>,

    #[arg(long, help = "Prefer numbers with this capability (voice, sms, mms)")]
    pub capability: Option<Capability>,

    #[arg(long, help = "Pick the cheapest number within the chosen tier")]
    pub lowest_price: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// `--api-key` wins, otherwise `OPENAI_API_KEY`
    pub fn with_env_api_key(mut self) -> Self {
        if normalize_api_key(self.api_key.as_deref()).is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        self
    }

    pub fn selection_criteria(&self) -> SelectionCriteria {
        SelectionCriteria {
            location: self.location.clone(),
            capability: self.capability,
            lowest_price: self.lowest_price,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn oracle_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn oracle_model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Option<&str> {
        normalize_api_key(self.api_key.as_deref())
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_non_empty_string("model", &self.model)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        validation::validate_range("temperature", self.temperature, 0.0, 2.0)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("output_filename", &self.output_filename)?;

        if let Some(candidates) = &self.candidates {
            validation::validate_file_extension("candidates", candidates, &["json"])?;
        }

        if let Some(area_code) = &self.area_code {
            if extract_explicit_area_code(area_code).is_none() {
                return Err(PickerError::InvalidConfigValueError {
                    field: "area_code".to_string(),
                    value: area_code.clone(),
                    reason: "No 3-digit area code found".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_path.join(candidate)
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}
