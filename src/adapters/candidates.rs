use crate::adapters::row_text::RowTextExtractor;
use crate::domain::model::PhoneCandidate;
use crate::domain::ports::Storage;
use crate::utils::error::{PickerError, Result};
use serde::Deserialize;

/// Listing snapshot as handed over by the scraper: either the raw visible
/// text of each row, or already structured records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandidateListing {
    Rows(Vec<String>),
    Records(Vec<PhoneCandidate>),
}

pub fn parse_candidates(data: &[u8]) -> Result<Vec<PhoneCandidate>> {
    let listing: CandidateListing =
        serde_json::from_slice(data).map_err(|e| PickerError::CandidateInputError {
            message: e.to_string(),
        })?;

    let candidates = match listing {
        CandidateListing::Rows(rows) => RowTextExtractor::extract_all(&rows),
        CandidateListing::Records(records) => records,
    };

    tracing::info!("📋 Loaded {} phone number candidate(s)", candidates.len());
    Ok(candidates)
}

pub async fn load_candidates<S: Storage>(storage: &S, path: &str) -> Result<Vec<PhoneCandidate>> {
    let data = storage.read_file(path).await?;
    parse_candidates(&data)
}
