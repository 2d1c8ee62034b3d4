//! Dietary profile and safety verdict types.
//!
//! `Verdict` is also the wire schema for the text model's output, so it gets
//! the same strict treatment as the menu types: closed `result` enumeration,
//! unknown fields rejected.

use serde::{Deserialize, Serialize};

use crate::models::menu::BBox;

/// A user's dietary profile, supplied with each QA request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub sodium_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictResult {
    Safe,
    Unsafe,
    AskServer,
}

/// A pointer back into the parsed menu supporting a verdict claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Citation {
    pub page: u32,
    pub bbox: BBox,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Verdict {
    pub result: VerdictResult,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_enumeration_is_closed() {
        for ok in ["safe", "unsafe", "ask_server"] {
            assert!(serde_json::from_value::<VerdictResult>(json!(ok)).is_ok());
        }
        assert!(serde_json::from_value::<VerdictResult>(json!("maybe")).is_err());
        assert!(serde_json::from_value::<VerdictResult>(json!("Safe")).is_err());
    }

    #[test]
    fn test_verdict_parses_with_defaults() {
        let v: Verdict = serde_json::from_value(json!({
            "result": "safe",
            "summary": "No conflicting ingredients found."
        }))
        .unwrap();
        assert_eq!(v.result, VerdictResult::Safe);
        assert!(v.reasons.is_empty() && v.citations.is_empty());
    }

    #[test]
    fn test_verdict_rejects_unknown_fields() {
        let v = json!({
            "result": "unsafe",
            "summary": "…",
            "confidence": 0.9
        });
        assert!(serde_json::from_value::<Verdict>(v).is_err());
    }

    #[test]
    fn test_citation_bbox_arity_enforced() {
        let v = json!({
            "page": 1,
            "bbox": [100.0, 200.0, 180.0],
            "type": "ingredient",
            "text": "peanut oil"
        });
        assert!(serde_json::from_value::<Citation>(v).is_err());
    }

    #[test]
    fn test_profile_fields_all_default() {
        let p: Profile = serde_json::from_value(json!({})).unwrap();
        assert!(p.allergens.is_empty() && p.diets.is_empty());
        assert!(p.sodium_limit.is_none());

        let p: Profile = serde_json::from_value(json!({
            "allergens": ["peanut"],
            "sodium_limit": 1500
        }))
        .unwrap();
        assert_eq!(p.allergens, vec!["peanut"]);
        assert_eq!(p.sodium_limit, Some(1500));
    }
}
