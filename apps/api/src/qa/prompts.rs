// Safety evaluation prompt templates.
// All prompts for the qa module are defined here.

/// System prompt for safety evaluation — confines the model to the supplied
/// menu context and enforces JSON-only output.
pub const EVALUATE_SYSTEM: &str = "\
You are a dietary safety assistant for restaurant menus. \
Reason ONLY from the parsed menu context supplied in the prompt — never from \
general knowledge about dishes or cuisines. \
If the context does not contain enough evidence to decide, answer 'ask_server'. \
You MUST respond with valid JSON only — no markdown fences, no explanations.";

/// Evaluation prompt template.
/// Replace: `{profile_json}`, `{question}`, `{menu_context}`.
pub const EVALUATE_PROMPT_TEMPLATE: &str = r#"Answer a dietary safety question about a restaurant menu.

DINER PROFILE:
{profile_json}

QUESTION:
{question}

PARSED MENU CONTEXT (items, allergen icons, tables; bounding boxes are pixel coordinates):
{menu_context}

Return a JSON object with this EXACT schema (no extra fields):
{
  "result": "safe" | "unsafe" | "ask_server",
  "reasons": ["Contains peanut oil"],
  "alternatives": ["Stir-fried tofu", "Vegetable curry"],
  "citations": [
    {"page": 1, "bbox": [100.0, 200.0, 180.0, 220.0], "type": "ingredient", "text": "peanut oil"}
  ],
  "summary": "One short paragraph for the diner."
}

RULES:
1. "result" must be exactly one of "safe", "unsafe", "ask_server".
2. "unsafe" requires at least one citation pointing at the conflicting evidence.
3. Citations must copy page and bbox values from the context verbatim.
4. "alternatives" lists menu items from the context only — never invented dishes.
5. Missing or ambiguous evidence (including empty pages) means "ask_server", not "safe".
6. Return ONLY the JSON object — nothing else, no code fences."#;
