// Menu extraction prompt templates.
// All prompts for the menus module are defined here.

/// System prompt for page extraction — enforces JSON-only output.
pub const PAGE_EXTRACT_SYSTEM: &str = "\
You are a precise menu page analyst. \
Extract structured menu data from a single page image. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Be CONSERVATIVE: only report items, icons, and tables you can actually see. \
Never guess ingredients that are not printed on the page.";

/// Page extraction prompt template. Replace `{page}` before sending.
pub const PAGE_EXTRACT_PROMPT: &str = r#"Extract the structured content of this menu page image.

This is page {page} of the menu. All bounding boxes are pixel coordinates
[x_min, y_min, x_max, y_max] in the supplied image — exactly 4 numbers.

Return a JSON object with this EXACT schema (no extra fields):
{
  "page": {page},
  "items": [
    {
      "name": "Pad Thai",
      "ingredients": ["rice noodles", "peanut", "egg"],
      "price": 12.5,
      "section": "Mains",
      "bbox": [40.0, 120.0, 480.0, 168.0]
    }
  ],
  "icons": [
    {
      "label": "peanut",
      "bbox": [496.0, 128.0, 528.0, 160.0],
      "confidence": 0.92
    }
  ],
  "tables": [
    {
      "bbox": [40.0, 600.0, 560.0, 780.0],
      "cells": [
        {"r": 0, "c": 0, "text": "Dish"},
        {"r": 0, "c": 1, "text": "Sodium (mg)"}
      ]
    }
  ]
}

RULES:
1. "page" must be exactly {page}.
2. "name" and "bbox" are required for every item; omit "price" and "section" when not printed.
3. "ingredients" is only what the page states — do NOT infer typical recipes.
4. "label" must be one of: "peanut", "tree_nut", "shellfish", "egg", "dairy", "gluten", "vegan", "vegetarian", "spicy". Skip icons that match none of these.
5. "confidence" is between 0 and 1.
6. Use "tables" for any tabular region (nutrition grids, allergen matrices); cells are 0-indexed by row r and column c.
7. Return ONLY the JSON object — nothing else, no code fences."#;
