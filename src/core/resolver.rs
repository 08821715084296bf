use crate::core::oracle_client::AreaCodeOracleClient;
use crate::core::postal_code::{PostalCodeInput, PostalCodeParser};
use crate::domain::model::{AreaCode, PostalAreaCodeMap, PostalCodeSet, ResolutionResult};
use crate::domain::ports::AreaCodeOracle;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetSource {
    /// 來自 CRM 欄位或命令列的指定區碼
    Explicit,
    Resolved,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetPlan {
    pub target: Option<AreaCode>,
    pub source: TargetSource,
    pub resolution: Option<ResolutionResult>,
}

fn explicit_area_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{3}").expect("explicit area code regex"))
}

pub struct AreaCodeResolver<O: AreaCodeOracle> {
    client: AreaCodeOracleClient<O>,
}

impl<O: AreaCodeOracle> AreaCodeResolver<O> {
    pub fn new(client: AreaCodeOracleClient<O>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AreaCodeOracleClient<O> {
        &self.client
    }

    pub async fn resolve(&self, postal_codes: &PostalCodeSet) -> ResolutionResult {
        if postal_codes.is_empty() {
            return ResolutionResult::empty();
        }

        let batch = if postal_codes.len() > 1 {
            self.client.lookup_batch(postal_codes).await
        } else {
            PostalAreaCodeMap::new()
        };

        let mut all_area_codes = PostalAreaCodeMap::new();
        for postal_code in postal_codes {
            let codes = match batch.get(postal_code) {
                Some(codes) => codes.clone(),
                None => self.client.lookup_one(postal_code).await,
            };
            all_area_codes.insert(postal_code.clone(), codes);
        }

        let common_area_codes = common_area_codes(&all_area_codes);
        let best_area_code = best_area_code(&all_area_codes, &common_area_codes);

        tracing::info!(
            "Resolved {} ZIP code(s): common {:?}, best {:?}",
            postal_codes.len(),
            common_area_codes,
            best_area_code
        );

        ResolutionResult {
            all_area_codes,
            common_area_codes,
            best_area_code,
        }
    }

    /// An explicit area code wins without any lookup; otherwise the postal
    /// codes are resolved and the best area code becomes the target.
    pub async fn plan_target(
        &self,
        explicit: Option<&str>,
        postal_input: impl Into<PostalCodeInput>,
    ) -> TargetPlan {
        if let Some(code) = explicit.and_then(extract_explicit_area_code) {
            tracing::info!("Using explicit area code {}", code);
            return TargetPlan {
                target: Some(code),
                source: TargetSource::Explicit,
                resolution: None,
            };
        }

        let postal_codes = PostalCodeParser::parse(postal_input);
        if postal_codes.is_empty() {
            tracing::warn!("⚠️ No valid ZIP codes to resolve, any area code will do");
            return TargetPlan {
                target: None,
                source: TargetSource::None,
                resolution: None,
            };
        }

        let resolution = self.resolve(&postal_codes).await;
        let source = if resolution.best_area_code.is_some() {
            TargetSource::Resolved
        } else {
            TargetSource::None
        };

        TargetPlan {
            target: resolution.best_area_code.clone(),
            source,
            resolution: Some(resolution),
        }
    }
}

/// 第一組 3 位數字，例如 "Area code: 972" 或 "(972)"
pub fn extract_explicit_area_code(text: &str) -> Option<AreaCode> {
    explicit_area_code_regex()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Area codes shared by every postal code, ascending. Empty as soon as one
/// postal code has none.
pub fn common_area_codes(all_area_codes: &PostalAreaCodeMap) -> Vec<AreaCode> {
    let mut sets = all_area_codes
        .values()
        .map(|codes| codes.iter().cloned().collect::<BTreeSet<_>>());

    let Some(first) = sets.next() else {
        return Vec::new();
    };

    sets.fold(first, |acc, set| acc.intersection(&set).cloned().collect())
        .into_iter()
        .collect()
}

pub fn best_area_code(
    all_area_codes: &PostalAreaCodeMap,
    common_area_codes: &[AreaCode],
) -> Option<AreaCode> {
    if let Some(smallest) = common_area_codes.first() {
        return Some(smallest.clone());
    }

    all_area_codes
        .values()
        .find_map(|codes| codes.first())
        .cloned()
}
