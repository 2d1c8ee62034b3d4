//! Structured menu data extracted from page images.
//!
//! These types double as the wire schema for the vision model's output.
//! Deserialization is strict (`deny_unknown_fields`, fixed-arity bounding
//! boxes, closed icon enumeration) so a non-conformant response fails here
//! instead of being trusted on provider say-so. Checks serde cannot express
//! (numeric ranges, page agreement) live in [`ParsedPage::validate`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pixel-coordinate bounding box. Exactly four components, enforced by the
/// type: a 3- or 5-element array fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BBox(pub [f64; 4]);

/// The closed set of allergen/diet icons the parser may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconLabel {
    Peanut,
    TreeNut,
    Shellfish,
    Egg,
    Dairy,
    Gluten,
    Vegan,
    Vegetarian,
    Spicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuItem {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub section: Option<String>,
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllergenIcon {
    pub label: IconLabel,
    pub bbox: BBox,
    /// 0.0 – 1.0. The schema requires only {label, bbox}; an omitted
    /// confidence deserializes to 0.0 and is treated as unknown.
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cell {
    pub r: u32,
    pub c: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Table {
    pub bbox: BBox,
    pub cells: Vec<Cell>,
}

/// One page of structured menu data. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParsedPage {
    pub page: u32,
    pub items: Vec<MenuItem>,
    pub icons: Vec<AllergenIcon>,
    pub tables: Vec<Table>,
}

impl ParsedPage {
    /// The substitute page used when extraction degrades.
    pub fn placeholder(page: u32) -> Self {
        ParsedPage {
            page,
            items: vec![],
            icons: vec![],
            tables: vec![],
        }
    }

    /// Post-deserialization checks the serde schema cannot express.
    pub fn validate(&self, expected_page: u32) -> Result<(), String> {
        if self.page != expected_page {
            return Err(format!(
                "page number mismatch: expected {expected_page}, got {}",
                self.page
            ));
        }
        for icon in &self.icons {
            if !(0.0..=1.0).contains(&icon.confidence) {
                return Err(format!(
                    "icon confidence {} outside [0, 1]",
                    icon.confidence
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of parsing a single page. `Degraded` carries the placeholder that
/// was substituted plus the failure reason, so callers can tell genuine data
/// from a fallback instead of both looking like identical JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    Extracted { page: ParsedPage },
    Degraded { page: ParsedPage, reason: String },
}

impl PageOutcome {
    pub fn page(&self) -> &ParsedPage {
        match self {
            PageOutcome::Extracted { page } => page,
            PageOutcome::Degraded { page, .. } => page,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, PageOutcome::Degraded { .. })
    }
}

/// A stored menu. `pages` is `None` until the parse step has run; a menu in
/// that state cannot be evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuRecord {
    pub menu_id: Uuid,
    pub filename: String,
    pub stored_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub pages: Option<Vec<PageOutcome>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_json() -> serde_json::Value {
        json!({
            "page": 1,
            "items": [
                {"name": "Pad Thai", "ingredients": ["noodles", "peanut"], "price": 12.5, "section": "Mains", "bbox": [10.0, 20.0, 200.0, 60.0]}
            ],
            "icons": [
                {"label": "peanut", "bbox": [210.0, 20.0, 240.0, 50.0], "confidence": 0.92}
            ],
            "tables": [
                {"bbox": [0.0, 100.0, 300.0, 200.0], "cells": [{"r": 0, "c": 0, "text": "Dish"}]}
            ]
        })
    }

    #[test]
    fn test_parses_conformant_page() {
        let page: ParsedPage = serde_json::from_value(page_json()).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items[0].name, "Pad Thai");
        assert_eq!(page.icons[0].label, IconLabel::Peanut);
        assert_eq!(page.tables[0].cells[0].text, "Dish");
        assert!(page.validate(1).is_ok());
    }

    #[test]
    fn test_bbox_must_have_exactly_four_components() {
        assert!(serde_json::from_value::<BBox>(json!([1.0, 2.0, 3.0])).is_err());
        assert!(serde_json::from_value::<BBox>(json!([1.0, 2.0, 3.0, 4.0, 5.0])).is_err());
        assert!(serde_json::from_value::<BBox>(json!([1.0, 2.0, 3.0, 4.0])).is_ok());
    }

    #[test]
    fn test_unknown_top_level_field_rejected() {
        let mut v = page_json();
        v["footer"] = json!("daily specials");
        assert!(serde_json::from_value::<ParsedPage>(v).is_err());
    }

    #[test]
    fn test_unknown_item_field_rejected() {
        let mut v = page_json();
        v["items"][0]["calories"] = json!(650);
        assert!(serde_json::from_value::<ParsedPage>(v).is_err());
    }

    #[test]
    fn test_icon_label_outside_enumeration_rejected() {
        let mut v = page_json();
        v["icons"][0]["label"] = json!("soy");
        assert!(serde_json::from_value::<ParsedPage>(v).is_err());
    }

    #[test]
    fn test_missing_required_item_name_rejected() {
        let v = json!({
            "page": 1,
            "items": [{"bbox": [0.0, 0.0, 1.0, 1.0]}],
            "icons": [],
            "tables": []
        });
        assert!(serde_json::from_value::<ParsedPage>(v).is_err());
    }

    #[test]
    fn test_optional_item_fields_default() {
        let v = json!({
            "page": 2,
            "items": [{"name": "Rice", "bbox": [0.0, 0.0, 1.0, 1.0]}],
            "icons": [],
            "tables": []
        });
        let page: ParsedPage = serde_json::from_value(v).unwrap();
        assert!(page.items[0].ingredients.is_empty());
        assert!(page.items[0].price.is_none());
        assert!(page.items[0].section.is_none());
    }

    #[test]
    fn test_omitted_confidence_defaults_to_zero() {
        let v = json!({
            "page": 1,
            "items": [],
            "icons": [{"label": "vegan", "bbox": [0.0, 0.0, 1.0, 1.0]}],
            "tables": []
        });
        let page: ParsedPage = serde_json::from_value(v).unwrap();
        assert_eq!(page.icons[0].confidence, 0.0);
        assert!(page.validate(1).is_ok());
    }

    #[test]
    fn test_validate_rejects_confidence_out_of_range() {
        let mut page: ParsedPage = serde_json::from_value(page_json()).unwrap();
        page.icons[0].confidence = 1.2;
        assert!(page.validate(1).is_err());
    }

    #[test]
    fn test_validate_rejects_page_mismatch() {
        let page: ParsedPage = serde_json::from_value(page_json()).unwrap();
        assert!(page.validate(3).is_err());
    }

    #[test]
    fn test_placeholder_is_empty() {
        let page = ParsedPage::placeholder(4);
        assert_eq!(page.page, 4);
        assert!(page.items.is_empty() && page.icons.is_empty() && page.tables.is_empty());
    }

    #[test]
    fn test_page_outcome_tags_degraded() {
        let degraded = PageOutcome::Degraded {
            page: ParsedPage::placeholder(1),
            reason: "provider unreachable".to_string(),
        };
        let extracted = PageOutcome::Extracted {
            page: serde_json::from_value(page_json()).unwrap(),
        };
        assert!(degraded.is_degraded());
        assert!(!extracted.is_degraded());
        assert_eq!(degraded.page().page, 1);

        let v = serde_json::to_value(&degraded).unwrap();
        assert_eq!(v["outcome"], "degraded");
        assert_eq!(v["reason"], "provider unreachable");
    }
}
