use crate::core::planner::PlanReport;
use crate::domain::model::SelectedNumberRecord;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// Writes the chosen number for the purchase step. Returns the record, or
/// `None` when nothing was selected (nothing is written then).
pub async fn save_selection<S: Storage>(
    storage: &S,
    filename: &str,
    report: &PlanReport,
) -> Result<Option<SelectedNumberRecord>> {
    let Some(record) =
        SelectedNumberRecord::from_outcome(&report.outcome, report.plan.target.as_ref())
    else {
        tracing::warn!("⚠️ No number selected ({:?}), nothing saved", report.outcome.reason);
        return Ok(None);
    };

    let json_data = serde_json::to_string_pretty(&record)?;
    tracing::debug!("Writing selection record ({} bytes) to storage", json_data.len());
    storage.write_file(filename, json_data.as_bytes()).await?;

    tracing::info!("💾 Saved selected phone number details to {}", filename);
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::{TargetPlan, TargetSource};
    use crate::domain::model::{PhoneCandidate, SelectionOutcome, SelectionReason};
    use crate::utils::error::PickerError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                PickerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn report(selected: Option<PhoneCandidate>, reason: SelectionReason) -> PlanReport {
        PlanReport {
            plan: TargetPlan {
                target: Some("972".parse().unwrap()),
                source: TargetSource::Explicit,
                resolution: None,
            },
            outcome: SelectionOutcome { selected, reason },
        }
    }

    #[tokio::test]
    async fn test_save_selection_writes_json() {
        let storage = MockStorage::new();
        let report = report(
            Some(PhoneCandidate::new("+1 972-555-0002", 1)),
            SelectionReason::MatchedAreaCode,
        );

        let record = save_selection(&storage, "selected_phone_number.json", &report)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.phone_number, "+1 972-555-0002");

        let data = storage.get_file("selected_phone_number.json").await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(json["phone_number"], "+1 972-555-0002");
        assert_eq!(json["area_code"], "972");
        assert_eq!(json["reason"], "MatchedAreaCode");
    }

    #[tokio::test]
    async fn test_save_selection_skips_empty_outcome() {
        let storage = MockStorage::new();
        let report = report(None, SelectionReason::NoCandidates);

        let record = save_selection(&storage, "selected_phone_number.json", &report)
            .await
            .unwrap();

        assert!(record.is_none());
        assert!(storage.get_file("selected_phone_number.json").await.is_none());
    }
}
