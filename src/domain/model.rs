use crate::utils::error::PickerError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// 5 位數郵遞區號，保留前導 0
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PostalCode {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 5 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(PickerError::InvalidPostalCode {
                value: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PostalCode> for String {
    fn from(value: PostalCode) -> Self {
        value.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 3 位數電話區碼
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AreaCode(String);

impl AreaCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AreaCode {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(PickerError::InvalidAreaCode {
                value: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for AreaCode {
    type Error = PickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AreaCode> for String {
    fn from(value: AreaCode) -> Self {
        value.0
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type PostalCodeSet = BTreeSet<PostalCode>;

/// Postal code to primary area code(s). Iteration order follows the (sorted)
/// input set, which is the insertion order the resolver uses.
pub type PostalAreaCodeMap = BTreeMap<PostalCode, Vec<AreaCode>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub all_area_codes: PostalAreaCodeMap,
    pub common_area_codes: Vec<AreaCode>,
    pub best_area_code: Option<AreaCode>,
}

impl ResolutionResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Voice,
    Sms,
    Mms,
}

impl FromStr for Capability {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "voice" => Ok(Capability::Voice),
            "sms" => Ok(Capability::Sms),
            "mms" => Ok(Capability::Mms),
            other => Err(PickerError::InvalidConfigValueError {
                field: "capability".to_string(),
                value: other.to_string(),
                reason: "Expected one of: voice, sms, mms".to_string(),
            }),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Voice => "voice",
            Capability::Sms => "sms",
            Capability::Mms => "mms",
        };
        f.write_str(name)
    }
}

/// One row of a freshly fetched phone-number listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneCandidate {
    pub phone_number: String,
    #[serde(default = "unknown")]
    pub locality: String,
    #[serde(default = "unknown")]
    pub price: String,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
    #[serde(default)]
    pub is_existing_assigned: bool,
    pub row_position: usize,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl PhoneCandidate {
    pub fn new(phone_number: impl Into<String>, row_position: usize) -> Self {
        Self {
            phone_number: phone_number.into(),
            locality: unknown(),
            price: unknown(),
            capabilities: BTreeSet::new(),
            is_existing_assigned: false,
            row_position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionReason {
    MatchedAreaCode,
    FirstAvailableFallback,
    /// The list was empty, or held only numbers that are already assigned.
    NoCandidates,
    /// Purchasable rows existed but none carried an extractable phone number.
    AllCandidatesInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionOutcome {
    pub selected: Option<PhoneCandidate>,
    pub reason: SelectionReason,
}

impl SelectionOutcome {
    pub fn none(reason: SelectionReason) -> Self {
        Self {
            selected: None,
            reason,
        }
    }

    pub fn is_area_code_match(&self) -> bool {
        self.reason == SelectionReason::MatchedAreaCode
    }
}

/// 交給購買流程並存檔的選號紀錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedNumberRecord {
    pub phone_number: String,
    pub location: String,
    pub price: String,
    pub capabilities: Vec<Capability>,
    pub area_code: Option<AreaCode>,
    pub reason: SelectionReason,
    pub timestamp: String,
}

impl SelectedNumberRecord {
    pub fn from_outcome(outcome: &SelectionOutcome, area_code: Option<&AreaCode>) -> Option<Self> {
        let candidate = outcome.selected.as_ref()?;
        Some(Self {
            phone_number: candidate.phone_number.clone(),
            location: candidate.locality.clone(),
            price: candidate.price.clone(),
            capabilities: candidate.capabilities.iter().copied().collect(),
            area_code: area_code.cloned(),
            reason: outcome.reason,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}
