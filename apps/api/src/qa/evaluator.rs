//! Safety evaluation against a dietary profile.
//!
//! One text-model call per question, over a size-capped JSON rendering of
//! the parsed pages. A failed or non-conformant call never propagates: the
//! caller receives the fixed `ask_server` fallback phrased as insufficient
//! information, not as a system error.

use tracing::warn;

use crate::llm_client::{parse_json_response, LlmError, ModelProvider};
use crate::models::menu::{PageOutcome, ParsedPage};
use crate::models::qa::{Profile, Verdict, VerdictResult};
use crate::qa::prompts::{EVALUATE_PROMPT_TEMPLATE, EVALUATE_SYSTEM};

/// Upper bound on the serialized menu context embedded in the prompt.
pub const CONTEXT_CHAR_BUDGET: usize = 15_000;

/// Evaluates a question against the parsed pages. Never fails: any error
/// degrades to [`fallback_verdict`].
pub async fn evaluate(
    model: &dyn ModelProvider,
    profile: &Profile,
    question: &str,
    pages: &[PageOutcome],
) -> Verdict {
    match try_evaluate(model, profile, question, pages).await {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!("Safety evaluation degraded: {e}");
            fallback_verdict()
        }
    }
}

async fn try_evaluate(
    model: &dyn ModelProvider,
    profile: &Profile,
    question: &str,
    pages: &[PageOutcome],
) -> Result<Verdict, LlmError> {
    let profile_json = serde_json::to_string(profile)?;
    let prompt = EVALUATE_PROMPT_TEMPLATE
        .replace("{profile_json}", &profile_json)
        .replace("{question}", question)
        .replace("{menu_context}", &render_menu_context(pages));

    let text = model.text_completion(&prompt, EVALUATE_SYSTEM).await?;
    let verdict: Verdict = parse_json_response(&text)?;
    Ok(verdict)
}

/// Renders the parsed pages as JSON, capped at [`CONTEXT_CHAR_BUDGET`]
/// characters. Degraded placeholders render like any other page — the
/// evaluator sees their (empty) content, and rule 5 of the prompt routes
/// empty evidence to `ask_server`.
pub fn render_menu_context(pages: &[PageOutcome]) -> String {
    let parsed: Vec<&ParsedPage> = pages.iter().map(PageOutcome::page).collect();
    let json = serde_json::to_string(&parsed).unwrap_or_else(|_| "[]".to_string());
    truncate_chars(json, CONTEXT_CHAR_BUDGET)
}

/// The canned verdict returned when evaluation degrades. Reads as
/// "insufficient information", not as a distinguishable system error.
pub fn fallback_verdict() -> Verdict {
    Verdict {
        result: VerdictResult::AskServer,
        reasons: vec![
            "Not enough information was available to evaluate this menu against your profile."
                .to_string(),
        ],
        alternatives: vec![],
        citations: vec![],
        summary: "We could not verify this menu against your dietary profile. \
                  Please ask the server about your allergens before ordering."
            .to_string(),
    }
}

fn truncate_chars(s: String, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu::{AllergenIcon, BBox, IconLabel};
    use async_trait::async_trait;

    struct TextStub {
        response: Result<String, ()>,
    }

    #[async_trait]
    impl ModelProvider for TextStub {
        async fn text_completion(&self, _: &str, _: &str) -> Result<String, LlmError> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(LlmError::Api {
                    status: 500,
                    message: "provider unavailable".to_string(),
                }),
            }
        }

        async fn vision_completion(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &str,
        ) -> Result<String, LlmError> {
            unreachable!("evaluator never issues vision completions")
        }
    }

    fn profile_with(allergens: &[&str]) -> Profile {
        Profile {
            allergens: allergens.iter().map(|s| s.to_string()).collect(),
            diets: vec![],
            sodium_limit: None,
        }
    }

    fn peanut_page() -> PageOutcome {
        PageOutcome::Extracted {
            page: ParsedPage {
                page: 1,
                items: vec![],
                icons: vec![AllergenIcon {
                    label: IconLabel::Peanut,
                    bbox: BBox([10.0, 10.0, 20.0, 20.0]),
                    confidence: 0.95,
                }],
                tables: vec![],
            },
        }
    }

    #[tokio::test]
    async fn test_conformant_verdict_is_returned() {
        let stub = TextStub {
            response: Ok(r#"{
                "result": "unsafe",
                "reasons": ["Peanut icon on page 1"],
                "alternatives": [],
                "citations": [{"page": 1, "bbox": [10.0, 10.0, 20.0, 20.0], "type": "icon", "text": "peanut"}],
                "summary": "Contains peanut."
            }"#
            .to_string()),
        };
        let verdict = evaluate(
            &stub,
            &profile_with(&["peanut"]),
            "does this contain peanuts?",
            &[peanut_page()],
        )
        .await;

        assert_eq!(verdict.result, VerdictResult::Unsafe);
        assert_eq!(verdict.citations[0].page, 1);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_ask_server() {
        let stub = TextStub { response: Err(()) };
        let verdict = evaluate(&stub, &profile_with(&["peanut"]), "safe?", &[peanut_page()]).await;

        assert_eq!(verdict.result, VerdictResult::AskServer);
        assert!(!verdict.reasons.is_empty());
        assert!(verdict.citations.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_result_value_degrades() {
        let stub = TextStub {
            response: Ok(r#"{"result": "probably_fine", "summary": "…"}"#.to_string()),
        };
        let verdict = evaluate(&stub, &profile_with(&[]), "safe?", &[peanut_page()]).await;
        assert_eq!(verdict.result, VerdictResult::AskServer);
    }

    #[tokio::test]
    async fn test_prose_response_degrades() {
        let stub = TextStub {
            response: Ok("Looks fine to me!".to_string()),
        };
        let verdict = evaluate(&stub, &profile_with(&[]), "safe?", &[peanut_page()]).await;
        assert_eq!(verdict.result, VerdictResult::AskServer);
    }

    #[test]
    fn test_context_rendering_includes_icon_evidence() {
        let context = render_menu_context(&[peanut_page()]);
        assert!(context.contains("peanut"));
        assert!(context.contains("\"page\":1"));
    }

    #[test]
    fn test_context_is_capped_at_budget() {
        let pages: Vec<PageOutcome> = (1..=200)
            .map(|n| PageOutcome::Extracted {
                page: ParsedPage {
                    page: n,
                    items: vec![crate::models::menu::MenuItem {
                        name: "Very long dish name to inflate the rendering".repeat(8),
                        ingredients: vec!["ingredient".to_string(); 20],
                        price: Some(9.99),
                        section: Some("Mains".to_string()),
                        bbox: BBox([0.0, 0.0, 1.0, 1.0]),
                    }],
                    icons: vec![],
                    tables: vec![],
                },
            })
            .collect();

        let context = render_menu_context(&pages);
        assert_eq!(context.chars().count(), CONTEXT_CHAR_BUDGET);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let s = "é".repeat(10);
        assert_eq!(truncate_chars(s, 4), "éééé");
    }

    #[test]
    fn test_fallback_verdict_shape() {
        let v = fallback_verdict();
        assert_eq!(v.result, VerdictResult::AskServer);
        assert!(v.summary.contains("ask the server"));
    }
}
