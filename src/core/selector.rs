use crate::domain::model::{AreaCode, Capability, PhoneCandidate, SelectionOutcome, SelectionReason};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::OnceLock;

fn phone_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\+1[\s-]*\(?([0-9]{3})\)?[\s-]*([0-9]{3})[\s-]*([0-9]{4})\b")
            .expect("phone number regex")
    })
}

fn price_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9][0-9,]*(?:\.[0-9]+)?").expect("price regex"))
}

/// Area code of a `+1 XXX-XXX-XXXX` style number, if the text holds one.
pub fn extract_area_code(phone_number: &str) -> Option<AreaCode> {
    phone_number_regex()
        .captures(phone_number)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Numeric value of a price like `$1.15` or `$1,000.00`; `None` for "Unknown" and friends.
pub fn parse_price(price: &str) -> Option<f64> {
    price_regex()
        .find(price)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
}

/// 額外篩選條件，預設全空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capability: Option<Capability>,
    #[serde(default)]
    pub lowest_price: bool,
}

impl SelectionCriteria {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.capability.is_none() && !self.lowest_price
    }
}

struct Eligible<'a> {
    candidate: &'a PhoneCandidate,
    area_code: AreaCode,
}

/// Chooses one number out of a freshly fetched listing. Pure: the same
/// candidates and target always produce the same outcome.
#[derive(Debug, Clone, Default)]
pub struct CandidateSelector {
    criteria: SelectionCriteria,
}

impl CandidateSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criteria(criteria: SelectionCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    pub fn select(
        &self,
        candidates: &[PhoneCandidate],
        target_area_code: Option<&AreaCode>,
    ) -> SelectionOutcome {
        // 已指派的號碼不算候選
        let purchasable: Vec<&PhoneCandidate> = candidates
            .iter()
            .filter(|c| !c.is_existing_assigned)
            .collect();

        if purchasable.is_empty() {
            tracing::warn!("⚠️ No purchasable phone numbers in listing");
            return SelectionOutcome::none(SelectionReason::NoCandidates);
        }

        let mut eligible: Vec<Eligible<'_>> = Vec::with_capacity(purchasable.len());
        for candidate in purchasable {
            match extract_area_code(&candidate.phone_number) {
                Some(area_code) => eligible.push(Eligible {
                    candidate,
                    area_code,
                }),
                None => tracing::debug!(
                    "Skipping row {}: no phone number in '{}'",
                    candidate.row_position,
                    candidate.phone_number
                ),
            }
        }

        if eligible.is_empty() {
            tracing::warn!("⚠️ Every listed row was malformed");
            return SelectionOutcome::none(SelectionReason::AllCandidatesInvalid);
        }

        let eligible = self.apply_filters(eligible);

        if let Some(target) = target_area_code {
            let matched: Vec<&Eligible<'_>> =
                eligible.iter().filter(|e| &e.area_code == target).collect();
            if let Some(choice) = self.pick(&matched) {
                tracing::info!(
                    "✅ Selected {} matching area code {}",
                    choice.phone_number,
                    target
                );
                return SelectionOutcome {
                    selected: Some(choice.clone()),
                    reason: SelectionReason::MatchedAreaCode,
                };
            }
            tracing::warn!(
                "⚠️ No listed number has area code {}, falling back to first available",
                target
            );
        }

        let all: Vec<&Eligible<'_>> = eligible.iter().collect();
        match self.pick(&all) {
            Some(choice) => {
                tracing::info!("Selected first available number {}", choice.phone_number);
                SelectionOutcome {
                    selected: Some(choice.clone()),
                    reason: SelectionReason::FirstAvailableFallback,
                }
            }
            None => SelectionOutcome::none(SelectionReason::AllCandidatesInvalid),
        }
    }

    /// Location and capability filters narrow the list only when something
    /// survives them.
    fn apply_filters<'a>(&self, eligible: Vec<Eligible<'a>>) -> Vec<Eligible<'a>> {
        let mut eligible = eligible;

        if let Some(location) = &self.criteria.location {
            let needle = location.to_lowercase();
            if eligible
                .iter()
                .any(|e| e.candidate.locality.to_lowercase().contains(&needle))
            {
                eligible.retain(|e| e.candidate.locality.to_lowercase().contains(&needle));
                tracing::debug!("Filtered to {} numbers in '{}'", eligible.len(), location);
            }
        }

        if let Some(capability) = self.criteria.capability {
            if eligible
                .iter()
                .any(|e| e.candidate.capabilities.contains(&capability))
            {
                eligible.retain(|e| e.candidate.capabilities.contains(&capability));
                tracing::debug!("Filtered to {} numbers with {}", eligible.len(), capability);
            }
        }

        eligible
    }

    fn pick<'a>(&self, tier: &[&Eligible<'a>]) -> Option<&'a PhoneCandidate> {
        let best = if self.criteria.lowest_price {
            tier.iter().min_by(|a, b| compare_price_then_row(a.candidate, b.candidate))
        } else {
            tier.iter().min_by_key(|e| e.candidate.row_position)
        };
        best.map(|e| e.candidate)
    }
}

fn compare_price_then_row(a: &PhoneCandidate, b: &PhoneCandidate) -> Ordering {
    let by_price = match (parse_price(&a.price), parse_price(&b.price)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_price.then(a.row_position.cmp(&b.row_position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(code: &str) -> AreaCode {
        code.parse().unwrap()
    }

    fn candidate(phone: &str, row: usize) -> PhoneCandidate {
        PhoneCandidate::new(phone, row)
    }

    fn two_rows() -> Vec<PhoneCandidate> {
        vec![candidate("+1 469-555-0001", 0), candidate("+1 972-555-0002", 1)]
    }

    #[test]
    fn test_empty_list() {
        let outcome = CandidateSelector::new().select(&[], Some(&area("972")));
        assert_eq!(outcome.reason, SelectionReason::NoCandidates);
        assert!(outcome.selected.is_none());
    }

    #[test]
    fn test_matching_area_code_wins_over_row_order() {
        let outcome = CandidateSelector::new().select(&two_rows(), Some(&area("972")));
        assert_eq!(outcome.reason, SelectionReason::MatchedAreaCode);
        assert_eq!(outcome.selected.unwrap().row_position, 1);
    }

    #[test]
    fn test_no_match_falls_back_to_top_row() {
        let outcome = CandidateSelector::new().select(&two_rows(), Some(&area("214")));
        assert_eq!(outcome.reason, SelectionReason::FirstAvailableFallback);
        assert_eq!(outcome.selected.unwrap().row_position, 0);
    }

    #[test]
    fn test_without_target_uses_top_row() {
        let outcome = CandidateSelector::new().select(&two_rows(), None);
        assert_eq!(outcome.reason, SelectionReason::FirstAvailableFallback);
        assert_eq!(outcome.selected.unwrap().row_position, 0);
    }

    #[test]
    fn test_lowest_row_among_matches() {
        let rows = vec![
            candidate("+1 972-555-0009", 4),
            candidate("+1 469-555-0001", 0),
            candidate("+1 972-555-0003", 2),
        ];
        let outcome = CandidateSelector::new().select(&rows, Some(&area("972")));
        assert_eq!(outcome.selected.unwrap().phone_number, "+1 972-555-0003");
    }

    #[test]
    fn test_only_existing_number_reports_no_candidates() {
        let mut existing = candidate("+1 972-555-0002", 0);
        existing.is_existing_assigned = true;

        let outcome = CandidateSelector::new().select(&[existing], Some(&area("972")));

        assert_eq!(outcome.reason, SelectionReason::NoCandidates);
        assert!(outcome.selected.is_none());
    }

    #[test]
    fn test_existing_number_is_never_selected() {
        let mut existing = candidate("+1 972-555-0002", 0);
        existing.is_existing_assigned = true;
        let rows = vec![existing, candidate("+1 469-555-0001", 1)];

        let outcome = CandidateSelector::new().select(&rows, Some(&area("972")));

        assert_eq!(outcome.reason, SelectionReason::FirstAvailableFallback);
        assert_eq!(outcome.selected.unwrap().row_position, 1);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let rows = vec![
            candidate("Loading...", 0),
            candidate("+1 97-555-0002", 1),
            candidate("+1 972-555-0003", 2),
        ];
        let outcome = CandidateSelector::new().select(&rows, Some(&area("972")));
        assert_eq!(outcome.reason, SelectionReason::MatchedAreaCode);
        assert_eq!(outcome.selected.unwrap().row_position, 2);
    }

    #[test]
    fn test_all_malformed_rows() {
        let rows = vec![candidate("Loading...", 0), candidate("Phone Number", 1)];
        let outcome = CandidateSelector::new().select(&rows, None);
        assert_eq!(outcome.reason, SelectionReason::AllCandidatesInvalid);
    }

    #[test]
    fn test_select_is_repeatable() {
        let selector = CandidateSelector::new();
        let rows = two_rows();
        let first = selector.select(&rows, Some(&area("972")));
        let second = selector.select(&rows, Some(&area("972")));
        assert_eq!(first, second);
    }

    #[test]
    fn test_lowest_price_within_tier() {
        let mut cheap = candidate("+1 972-555-0005", 3);
        cheap.price = "$1.00".to_string();
        let mut pricey = candidate("+1 972-555-0002", 1);
        pricey.price = "$1.15".to_string();
        let mut cheapest_wrong_area = candidate("+1 469-555-0001", 0);
        cheapest_wrong_area.price = "$0.50".to_string();

        let selector = CandidateSelector::with_criteria(SelectionCriteria {
            lowest_price: true,
            ..Default::default()
        });
        let outcome = selector.select(&[cheapest_wrong_area, pricey, cheap], Some(&area("972")));

        assert_eq!(outcome.reason, SelectionReason::MatchedAreaCode);
        assert_eq!(outcome.selected.unwrap().row_position, 3);
    }

    #[test]
    fn test_unknown_price_sorts_last() {
        let unknown = candidate("+1 972-555-0002", 0);
        let mut priced = candidate("+1 972-555-0003", 1);
        priced.price = "$2.00".to_string();

        let selector = CandidateSelector::with_criteria(SelectionCriteria {
            lowest_price: true,
            ..Default::default()
        });
        let outcome = selector.select(&[unknown, priced], None);

        assert_eq!(outcome.selected.unwrap().row_position, 1);
    }

    #[test]
    fn test_location_and_capability_filters() {
        let mut plano = candidate("+1 972-555-0002", 0);
        plano.locality = "Plano, TX".to_string();
        let mut dallas = candidate("+1 972-555-0003", 1);
        dallas.locality = "Dallas, TX".to_string();
        dallas.capabilities.insert(Capability::Sms);

        let selector = CandidateSelector::with_criteria(SelectionCriteria {
            location: Some("dallas".to_string()),
            capability: Some(Capability::Sms),
            lowest_price: false,
        });
        let outcome = selector.select(&[plano.clone(), dallas], Some(&area("972")));
        assert_eq!(outcome.selected.unwrap().row_position, 1);

        // 沒有符合的地點時不縮小範圍
        let selector = CandidateSelector::with_criteria(SelectionCriteria {
            location: Some("Austin".to_string()),
            ..Default::default()
        });
        let outcome = selector.select(&[plano], Some(&area("972")));
        assert_eq!(outcome.selected.unwrap().row_position, 0);
    }

    #[test]
    fn test_extract_area_code_formats() {
        assert_eq!(extract_area_code("+1 972-555-0002"), Some(area("972")));
        assert_eq!(extract_area_code("+19725550002"), Some(area("972")));
        assert_eq!(extract_area_code("+1 (972) 555-0002"), Some(area("972")));
        assert_eq!(extract_area_code("972-555-0002"), None);
        assert_eq!(extract_area_code("Unknown"), None);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$1.15"), Some(1.15));
        assert_eq!(parse_price("$3 / month"), Some(3.0));
        assert_eq!(parse_price("Unknown"), None);
        assert_eq!(parse_price("$1,000.00"), Some(1000.0));
        assert_eq!(parse_price("$12,345"), Some(12345.0));
    }
}
