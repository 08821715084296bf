use crate::core::postal_code::PostalCodeInput;
use crate::core::resolver::{AreaCodeResolver, TargetPlan};
use crate::core::selector::CandidateSelector;
use crate::domain::model::{PhoneCandidate, SelectionOutcome};
use crate::domain::ports::AreaCodeOracle;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub explicit_area_code: Option<String>,
    pub postal_input: PostalCodeInput,
    pub candidates: Vec<PhoneCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub plan: TargetPlan,
    pub outcome: SelectionOutcome,
}

/// Postal codes in, one phone number (or a reason why not) out.
pub struct NumberPlanner<O: AreaCodeOracle> {
    resolver: AreaCodeResolver<O>,
    selector: CandidateSelector,
}

impl<O: AreaCodeOracle> NumberPlanner<O> {
    pub fn new(resolver: AreaCodeResolver<O>, selector: CandidateSelector) -> Self {
        Self { resolver, selector }
    }

    pub async fn run(&self, request: PlanRequest) -> PlanReport {
        tracing::info!("🚀 Starting area code planning");

        let plan = self
            .resolver
            .plan_target(request.explicit_area_code.as_deref(), request.postal_input)
            .await;
        match &plan.target {
            Some(code) => tracing::info!("Will search for phone numbers with area code: {}", code),
            None => tracing::info!("No area code resolved, will take any available number"),
        }

        let outcome = self
            .selector
            .select(&request.candidates, plan.target.as_ref());
        tracing::info!(
            "Selection finished with {:?} from {} candidate(s)",
            outcome.reason,
            request.candidates.len()
        );
        if let (Some(code), Some(_)) = (&plan.target, &outcome.selected) {
            if !outcome.is_area_code_match() {
                tracing::warn!("⚠️ No number with area code {} found, using first available", code);
            }
        }

        PlanReport { plan, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oracle_client::tests::StubOracle;
    use crate::core::oracle_client::AreaCodeOracleClient;
    use crate::core::resolver::TargetSource;
    use crate::domain::model::SelectionReason;

    fn planner(oracle: StubOracle) -> NumberPlanner<StubOracle> {
        NumberPlanner::new(
            AreaCodeResolver::new(AreaCodeOracleClient::new(oracle)),
            CandidateSelector::new(),
        )
    }

    fn listing() -> Vec<PhoneCandidate> {
        vec![
            PhoneCandidate::new("+1 469-555-0001", 0),
            PhoneCandidate::new("+1 972-555-0002", 1),
        ]
    }

    #[tokio::test]
    async fn test_run_resolves_and_matches() {
        let planner = planner(StubOracle::replying(&[
            "### Area Code: 972\n**Overlays:** 214, 469\n**ZIPs:** 75034, 75024",
        ]));

        let report = planner
            .run(PlanRequest {
                explicit_area_code: None,
                postal_input: "75034, 75024".into(),
                candidates: listing(),
            })
            .await;

        assert_eq!(report.plan.source, TargetSource::Resolved);
        assert!(report.outcome.is_area_code_match());
        assert_eq!(report.outcome.selected.unwrap().phone_number, "+1 972-555-0002");
    }

    #[tokio::test]
    async fn test_run_with_oracle_down_still_selects() {
        let planner = planner(StubOracle::unavailable());

        let report = planner
            .run(PlanRequest {
                explicit_area_code: None,
                postal_input: "75034".into(),
                candidates: listing(),
            })
            .await;

        assert_eq!(report.plan.target, None);
        assert_eq!(report.outcome.reason, SelectionReason::FirstAvailableFallback);
        assert!(!report.outcome.is_area_code_match());
        assert_eq!(report.outcome.selected.unwrap().row_position, 0);
    }
}
