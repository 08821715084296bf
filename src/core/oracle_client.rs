use crate::core::reply;
use crate::domain::model::{AreaCode, PostalAreaCodeMap, PostalCode, PostalCodeSet};
use crate::domain::ports::{AreaCodeOracle, OracleRequest};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const SINGLE_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides accurate area code \
information for US ZIP codes. Return only the primary area code, no overlays.";

const BATCH_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides accurate area code \
information for US ZIP codes. Return only the primary area code for each ZIP, no overlays.";

/// In-memory memo of postal code lookups, empty results included. Entries are
/// never evicted and live as long as the process.
#[derive(Debug, Default)]
pub struct AreaCodeCache {
    entries: RwLock<HashMap<PostalCode, Vec<AreaCode>>>,
}

impl AreaCodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, postal_code: &PostalCode) -> Option<Vec<AreaCode>> {
        // 寫入只做整筆 insert，poisoned 的 map 內容仍然一致
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(postal_code).cloned()
    }

    pub fn insert(&self, postal_code: PostalCode, area_codes: Vec<AreaCode>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(postal_code, area_codes);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Memoizing adapter over an [`AreaCodeOracle`]. Oracle failures never reach
/// the caller; they come back as "no area code found".
pub struct AreaCodeOracleClient<O: AreaCodeOracle> {
    oracle: O,
    cache: Arc<AreaCodeCache>,
}

impl<O: AreaCodeOracle> AreaCodeOracleClient<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_cache(oracle, Arc::new(AreaCodeCache::new()))
    }

    /// Shares a cache between clients, e.g. across concurrent onboarding runs.
    pub fn with_cache(oracle: O, cache: Arc<AreaCodeCache>) -> Self {
        Self { oracle, cache }
    }

    pub fn cache(&self) -> &Arc<AreaCodeCache> {
        &self.cache
    }

    /// One outbound request for all uncached postal codes. Partial results are
    /// normal: postal codes the reply does not mention are simply absent and
    /// are not cached, so a later `lookup_one` can still try them.
    pub async fn lookup_batch(&self, postal_codes: &PostalCodeSet) -> PostalAreaCodeMap {
        let mut results = PostalAreaCodeMap::new();
        let mut uncached = Vec::new();

        for postal_code in postal_codes {
            match self.cache.get(postal_code) {
                Some(codes) => {
                    results.insert(postal_code.clone(), codes);
                }
                None => uncached.push(postal_code.clone()),
            }
        }

        if !results.is_empty() {
            tracing::info!("Using cached results for {} ZIP codes", results.len());
        }
        if uncached.is_empty() {
            return results;
        }

        let request = batch_request(&uncached);
        let content = match self.oracle.complete(&request).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("❌ Batch area code lookup failed: {}", e);
                return results;
            }
        };
        tracing::debug!("Oracle batch response: {}", content);

        let mut parsed = reply::parse_grouped(&content, &uncached);
        if parsed.is_empty() {
            tracing::warn!(
                "⚠️ Batch reply had no area code blocks, pairing 3-digit tokens by position"
            );
            parsed = reply::parse_positional(&content, &uncached);
        }

        for (postal_code, codes) in parsed {
            self.cache.insert(postal_code.clone(), codes.clone());
            results.insert(postal_code, codes);
        }

        tracing::info!("Batch lookup resolved {}/{} ZIP codes", results.len(), postal_codes.len());
        results
    }

    /// Single lookup; the outcome (empty included) is cached so the oracle is
    /// asked at most once per postal code.
    pub async fn lookup_one(&self, postal_code: &PostalCode) -> Vec<AreaCode> {
        if let Some(codes) = self.cache.get(postal_code) {
            tracing::info!("Using cached area codes for ZIP {}: {:?}", postal_code, codes);
            return codes;
        }

        let request = single_request(postal_code);
        let codes = match self.oracle.complete(&request).await {
            Ok(content) => {
                tracing::debug!("Oracle response for ZIP {}: {}", postal_code, content);
                match reply::parse_first_header(&content) {
                    Some(code) => {
                        tracing::info!("Found primary area code for ZIP {}: {}", postal_code, code);
                        vec![code]
                    }
                    None => {
                        tracing::warn!("⚠️ Could not extract area code for ZIP {}", postal_code);
                        Vec::new()
                    }
                }
            }
            Err(e) => {
                tracing::error!("❌ Area code lookup for ZIP {} failed: {}", postal_code, e);
                Vec::new()
            }
        };

        self.cache.insert(postal_code.clone(), codes.clone());
        codes
    }
}

fn single_request(postal_code: &PostalCode) -> OracleRequest {
    OracleRequest {
        system: SINGLE_SYSTEM_PROMPT.to_string(),
        user: format!(
            "Give me area code info for these ZIP codes:\n[{}]\n\n\
             Format the response like this (grouped by overlay complex):\n\
             ### Area Code: [code]\n\
             **Overlays:** [overlay(s) or ❌ None]\n\
             **ZIPs:** [list of ZIP codes]\n\n\
             Rules:\n\
             Group ZIPs under a single entry if they share the same overlay complex\n\
             Do not repeat the same overlay complex in multiple entries\n\
             No extra explanations, just compact and clean output\n\n\
             return only the primary area code no overlays.",
            postal_code
        ),
    }
}

fn batch_request(postal_codes: &[PostalCode]) -> OracleRequest {
    let list = postal_codes
        .iter()
        .map(PostalCode::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    OracleRequest {
        system: BATCH_SYSTEM_PROMPT.to_string(),
        user: format!(
            "Give me area code info for these ZIP codes:\n[{}]\n\n\
             Format the response like this (grouped by overlay complex):\n\
             ### Area Code: [primary code]\n\
             **Overlays:** [overlay(s) or ❌ None]\n\
             **ZIPs:** [list of ZIP codes]\n\n\
             Rules:\n\
             - Always return only one entry per overlay complex, using the **primary area code** as the header (e.g., 972 over 469 or 214)\n\
             - Group ZIPs under a single entry if they share the same overlay complex\n\
             - Do not repeat the same overlay complex in multiple entries\n\
             - Show overlays, but do not list overlays as the primary area code\n\
             - No extra explanations, just compact and clean output",
            list
        ),
    }
}
