//! Parsing contract for free-text oracle replies.
//!
//! Expected shape, repeated once per overlay complex:
//!
//! ```text
//! ### Area Code: 972
//! **Overlays:** 214, 469
//! **ZIPs:** 75034, 75024
//! ```

use crate::domain::model::{AreaCode, PostalAreaCodeMap, PostalCode};
use regex::Regex;
use std::sync::OnceLock;

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"###\s*Area Code:\s*([0-9]{3})\b").expect("header regex"))
}

fn zips_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*ZIPs:\*\*\s*([^\n]+)").expect("zips regex"))
}

fn postal_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[0-9]{5}\b").expect("postal token regex"))
}

fn area_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([0-9]{3})\b").expect("area token regex"))
}

/// Parses grouped `### Area Code` blocks. Only postal codes listed in
/// `requested` are kept; a postal code listed under several groups keeps the
/// first one.
pub fn parse_grouped(content: &str, requested: &[PostalCode]) -> PostalAreaCodeMap {
    let headers: Vec<_> = header_regex().captures_iter(content).collect();
    let mut result = PostalAreaCodeMap::new();

    for (i, caps) in headers.iter().enumerate() {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(area_code) = code.as_str().parse::<AreaCode>() else {
            continue;
        };

        // 區塊範圍：到下一個 header 為止
        let section_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(content.len());
        let section = &content[whole.end()..section_end];

        let Some(zips) = zips_line_regex().captures(section).and_then(|c| c.get(1)) else {
            tracing::debug!("Area code block {} has no ZIPs line", area_code);
            continue;
        };

        for token in postal_token_regex().find_iter(zips.as_str()) {
            let Ok(postal_code) = token.as_str().parse::<PostalCode>() else {
                continue;
            };
            if requested.contains(&postal_code) {
                result
                    .entry(postal_code)
                    .or_insert_with(|| vec![area_code.clone()]);
            }
        }
    }

    result
}

/// Degraded mode: pairs every standalone 3-digit token with the requested
/// postal codes by position. Heuristic; it mis-pairs when the reply omits or
/// reorders entries. Returns nothing unless there is at least one token per
/// requested postal code.
pub fn parse_positional(content: &str, requested: &[PostalCode]) -> PostalAreaCodeMap {
    let tokens: Vec<AreaCode> = area_token_regex()
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    if tokens.is_empty() || tokens.len() < requested.len() {
        return PostalAreaCodeMap::new();
    }

    requested
        .iter()
        .cloned()
        .zip(tokens.into_iter().map(|code| vec![code]))
        .collect()
}

/// First `### Area Code` header in a single-postal-code reply.
pub fn parse_first_header(content: &str) -> Option<AreaCode> {
    header_regex()
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<PostalCode> {
        list.iter().map(|c| c.parse().unwrap()).collect()
    }

    fn area(code: &str) -> AreaCode {
        code.parse().unwrap()
    }

    #[test]
    fn test_parse_grouped_blocks() {
        let reply = "### Area Code: 972\n**Overlays:** 214, 469\n**ZIPs:** 75034, 75024\n\n\
                     ### Area Code: 817\n**Overlays:** 682\n**ZIPs:** 76001";
        let requested = codes(&["75034", "75024", "76001"]);

        let result = parse_grouped(reply, &requested);

        assert_eq!(result.len(), 3);
        assert_eq!(result[&requested[0]], vec![area("972")]);
        assert_eq!(result[&requested[1]], vec![area("972")]);
        assert_eq!(result[&requested[2]], vec![area("817")]);
    }

    #[test]
    fn test_parse_grouped_ignores_unrequested_codes() {
        let reply = "### Area Code: 972\n**Overlays:** ❌ None\n**ZIPs:** [75034, 75999]";
        let requested = codes(&["75034"]);

        let result = parse_grouped(reply, &requested);

        assert_eq!(result.len(), 1);
        assert!(result.contains_key(&requested[0]));
    }

    #[test]
    fn test_parse_grouped_first_group_wins() {
        let reply = "### Area Code: 972\n**ZIPs:** 75034\n### Area Code: 214\n**ZIPs:** 75034";
        let requested = codes(&["75034"]);

        assert_eq!(parse_grouped(reply, &requested)[&requested[0]], vec![area("972")]);
    }

    #[test]
    fn test_parse_grouped_without_structure() {
        let requested = codes(&["75034"]);
        assert!(parse_grouped("The area code is 972.", &requested).is_empty());
        assert!(parse_grouped("### Area Code: 972\nno zips listed", &requested).is_empty());
    }

    #[test]
    fn test_parse_positional_pairs_in_order() {
        let requested = codes(&["75024", "75034"]);
        let result = parse_positional("Plano is 972 and Carrollton is 469", &requested);

        assert_eq!(result[&requested[0]], vec![area("972")]);
        assert_eq!(result[&requested[1]], vec![area("469")]);
    }

    #[test]
    fn test_parse_positional_needs_enough_tokens() {
        let requested = codes(&["75024", "75034"]);
        assert!(parse_positional("only 972 here", &requested).is_empty());
        assert!(parse_positional("nothing useful", &requested).is_empty());
    }

    #[test]
    fn test_parse_first_header() {
        assert_eq!(
            parse_first_header("### Area Code: 512\n**Overlays:** 737\n**ZIPs:** 78701"),
            Some(area("512"))
        );
        assert_eq!(parse_first_header("area code 512"), None);
    }
}
