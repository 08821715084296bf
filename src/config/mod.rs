#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_OUTPUT_FILENAME: &str = "selected_phone_number.json";

/// Blank keys and unresolved `${VAR}` placeholders count as missing.
pub fn normalize_api_key(key: Option<&str>) -> Option<&str> {
    let key = key?.trim();
    if key.is_empty() || (key.starts_with("${") && key.ends_with('}')) {
        None
    } else {
        Some(key)
    }
}
