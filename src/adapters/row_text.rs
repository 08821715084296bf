use crate::domain::model::{Capability, PhoneCandidate};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const EXISTING_MARKERS: [&str; 2] = ["Default Number", "Current"];

/// Capitalized row labels that can sit right before the city on a one-line row.
const LOCALITY_NOISE: [&str; 6] = ["voice", "sms", "mms", "default", "number", "current"];

struct RowPatterns {
    phone: Regex,
    locality: Regex,
    price: Regex,
    capabilities: [(Capability, Regex); 3],
}

fn patterns() -> &'static RowPatterns {
    static PATTERNS: OnceLock<RowPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| RowPatterns {
        phone: Regex::new(r"\+1\s*[0-9]{3}-[0-9]{3}-[0-9]{4}").expect("phone regex"),
        locality: Regex::new(r"\b([A-Z][A-Za-z.']*(?: [A-Z][A-Za-z.']*)*),[ \t]*([A-Z]{2})\b")
            .expect("locality regex"),
        price: Regex::new(r"\$\s*[0-9]+(?:\.[0-9]+)?").expect("price regex"),
        capabilities: [
            (Capability::Voice, Regex::new(r"(?i)\bvoice\b").expect("voice regex")),
            (Capability::Sms, Regex::new(r"(?i)\bsms\b").expect("sms regex")),
            (Capability::Mms, Regex::new(r"(?i)\bmms\b").expect("mms regex")),
        ],
    })
}

/// Turns the visible text of one rendered listing row into a candidate record.
pub struct RowTextExtractor;

impl RowTextExtractor {
    pub fn extract(row_position: usize, raw: &str) -> PhoneCandidate {
        let patterns = patterns();
        let text = raw.trim();

        // 抓不到號碼就保留第一行原文，交給 selector 跳過
        let phone_number = patterns
            .phone
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| text.lines().next().unwrap_or_default().trim().to_string());

        let locality = patterns
            .locality
            .captures(text)
            .and_then(|c| Self::clean_locality(&c[1], &c[2]))
            .unwrap_or_else(|| "Unknown".to_string());

        let price = patterns
            .price
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let capabilities: BTreeSet<Capability> = patterns
            .capabilities
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(capability, _)| *capability)
            .collect();

        let is_existing_assigned = EXISTING_MARKERS.iter().any(|marker| text.contains(marker));
        if is_existing_assigned {
            tracing::debug!("Row {} looks like an existing number: {}", row_position, phone_number);
        }

        PhoneCandidate {
            phone_number,
            locality,
            price,
            capabilities,
            is_existing_assigned,
            row_position,
        }
    }

    fn clean_locality(city: &str, state: &str) -> Option<String> {
        let words: Vec<&str> = city
            .split(' ')
            .skip_while(|word| LOCALITY_NOISE.contains(&word.to_ascii_lowercase().as_str()))
            .collect();
        if words.is_empty() {
            return None;
        }
        Some(format!("{}, {}", words.join(" "), state))
    }

    /// Row positions are the indexes in `rows`; rows without a single digit
    /// (table headers, spacers) are dropped.
    pub fn extract_all<S: AsRef<str>>(rows: &[S]) -> Vec<PhoneCandidate> {
        rows.iter()
            .map(|row| row.as_ref())
            .enumerate()
            .filter(|(_, row)| row.chars().any(|c| c.is_ascii_digit()))
            .map(|(i, row)| Self::extract(i, row))
            .collect()
    }
}
