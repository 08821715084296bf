use crate::domain::model::{PostalCode, PostalCodeSet};
use regex::Regex;
use std::sync::OnceLock;

/// Raw postal code input as it arrives from CRM fields or the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeInput {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for PostalCodeInput {
    fn from(value: &str) -> Self {
        PostalCodeInput::Text(value.to_string())
    }
}

impl From<String> for PostalCodeInput {
    fn from(value: String) -> Self {
        PostalCodeInput::Text(value)
    }
}

impl From<Vec<String>> for PostalCodeInput {
    fn from(value: Vec<String>) -> Self {
        PostalCodeInput::List(value)
    }
}

impl From<&[&str]> for PostalCodeInput {
    fn from(value: &[&str]) -> Self {
        PostalCodeInput::List(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PostalCodeInput {
    fn from(value: [&str; N]) -> Self {
        PostalCodeInput::List(value.iter().map(|s| s.to_string()).collect())
    }
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s;|]+").expect("separator regex"))
}

fn digit_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ASCII only: `\d` would also accept other Unicode digits
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("digit run regex"))
}

pub struct PostalCodeParser;

impl PostalCodeParser {
    /// Normalizes any supported input into a set of postal codes. Never fails;
    /// unusable input yields an empty set.
    pub fn parse(input: impl Into<PostalCodeInput>) -> PostalCodeSet {
        let codes = match input.into() {
            PostalCodeInput::List(items) => Self::parse_items(items),
            PostalCodeInput::Text(text) => match Self::parse_structured(&text) {
                Some(items) => Self::parse_items(items),
                None => Self::parse_free_text(&text),
            },
        };

        tracing::debug!("Parsed {} postal code(s)", codes.len());
        codes
    }

    /// JSON 陣列格式，例如 `["75034", 75024]`；物件或巢狀陣列元素以原文交給 digit run 擷取
    fn parse_structured(text: &str) -> Option<Vec<String>> {
        let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
        let items = value.as_array()?;

        Some(
            items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        )
    }

    fn parse_items(items: Vec<String>) -> PostalCodeSet {
        let mut codes = PostalCodeSet::new();
        for item in items {
            let trimmed = item.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.parse::<PostalCode>() {
                Ok(code) => {
                    codes.insert(code);
                }
                Err(_) => codes.extend(Self::extract_runs(trimmed)),
            }
        }
        codes
    }

    fn parse_free_text(text: &str) -> PostalCodeSet {
        let normalized = separator_regex().replace_all(text, ",");

        normalized
            .split(',')
            .filter(|chunk| !chunk.is_empty())
            .flat_map(Self::extract_runs)
            .collect()
    }

    /// Every maximal digit run of exactly five digits.
    fn extract_runs(chunk: &str) -> Vec<PostalCode> {
        digit_run_regex()
            .find_iter(chunk)
            .filter(|m| m.as_str().len() == 5)
            .filter_map(|m| m.as_str().parse().ok())
            .collect()
    }
}
