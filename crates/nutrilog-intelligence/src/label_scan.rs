// ABOUTME: Regex extraction of nutrition facts from OCR text of a food label
// ABOUTME: Repairs common OCR digit confusions and converts per-serving values to per-100g
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Label Scanning
//!
//! Input is the raw text of a US "Nutrition Facts" panel as returned by an OCR
//! engine. Matching is case-insensitive and tolerant of line breaks between a
//! label and its value. Inside numbers `O`/`o` are read as `0`, `l`/`I` as `1`,
//! and a decimal comma as a point. Percent daily value columns are ignored.

use std::sync::LazyLock;

use nutrilog_core::constants::energy::REFERENCE_GRAMS;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{NutrientKind, NutrientProfile};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Number token, including characters OCR commonly confuses with digits
const NUM: &str = r"<?\s*([0-9OoIl]+(?:[.,][0-9OoIl]+)?)";

/// Key used in `not_found` for the serving size
pub const SERVING_SIZE_FIELD: &str = "serving_size";

struct FieldPattern {
    kind: NutrientKind,
    regex: Regex,
    /// Reject a match when the text just before it ends with this word
    excluded_prefix: Option<&'static str>,
}

static FIELD_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    let unit = r"(?:[ \t]*(kcal|mcg|µg|ug|mg|iu|g))?";
    let specs: [(NutrientKind, String, Option<&'static str>); 15] = [
        (NutrientKind::Calories, format!(r"(?i)\bcalories\s*:?\s*{NUM}{unit}"), None),
        (NutrientKind::Fat, format!(r"(?i)\btotal\s+fat\s*:?\s*{NUM}{unit}"), None),
        (
            NutrientKind::SaturatedFat,
            format!(r"(?i)\bsat(?:urated|\.)?\s+fat\s*:?\s*{NUM}{unit}"),
            None,
        ),
        (NutrientKind::TransFat, format!(r"(?i)\btrans\s+fat\s*:?\s*{NUM}{unit}"), None),
        (NutrientKind::Cholesterol, format!(r"(?i)\bcholesterol\s*:?\s*{NUM}{unit}"), None),
        (NutrientKind::Sodium, format!(r"(?i)\bsodium\s*:?\s*{NUM}{unit}"), None),
        (
            NutrientKind::Carbohydrate,
            format!(r"(?i)\b(?:total\s+)?carb(?:ohydrates?|s|\.)?\s*:?\s*{NUM}{unit}"),
            None,
        ),
        (
            NutrientKind::Fiber,
            format!(r"(?i)\b(?:dietary\s+)?fib(?:er|re)\s*:?\s*{NUM}{unit}"),
            None,
        ),
        (
            NutrientKind::Sugars,
            format!(r"(?i)\b(?:total\s+)?sugars?\s*:?\s*{NUM}{unit}"),
            Some("added"),
        ),
        (
            NutrientKind::AddedSugars,
            format!(r"(?i)\b(?:incl(?:udes|\.)?\s*{NUM}{unit}\s*added\s+sugars?|added\s+sugars?\s*:?\s*{NUM}{unit})"),
            None,
        ),
        (NutrientKind::Protein, format!(r"(?i)\bprotein\s*:?\s*{NUM}{unit}"), None),
        (NutrientKind::VitaminD, format!(r"(?i)\bvit(?:amin|\.)?\s*d\s*:?\s*{NUM}{unit}"), None),
        (NutrientKind::Calcium, format!(r"(?i)\bcalcium\s*:?\s*{NUM}{unit}"), None),
        (NutrientKind::Iron, format!(r"(?i)\biron\s*:?\s*{NUM}{unit}"), None),
        (NutrientKind::Potassium, format!(r"(?i)\bpotassium\s*:?\s*{NUM}{unit}"), None),
    ];

    specs
        .into_iter()
        .filter_map(|(kind, pattern, excluded_prefix)| {
            Regex::new(&pattern).ok().map(|regex| FieldPattern {
                kind,
                regex,
                excluded_prefix,
            })
        })
        .collect()
});

static SERVING_PAREN_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: Serving size 2/3 cup (55g)
    Regex::new(&format!(
        r"(?i)\bserving\s+size[^(\n]*\(\s*{NUM}\s*(g|ml)\b"
    ))
    .ok()
});

static SERVING_PLAIN_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: Serving size 30 g, Serving Size: 250ml
    Regex::new(&format!(r"(?i)\bserving\s+size\s*:?\s*{NUM}\s*(g|ml)\b")).ok()
});

/// Values extracted from one label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelScan {
    /// Serving size in grams (millilitres are taken as grams)
    pub serving_size_g: Option<f64>,
    /// Values per serving; fields not found are zero
    pub per_serving: NutrientProfile,
    /// Nutrients that were found
    pub found: Vec<NutrientKind>,
    /// Field keys that were not found (nutrient names and `serving_size`)
    pub not_found: Vec<String>,
}

impl LabelScan {
    /// Convert the per-serving values to a per-100g profile
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when no serving size was found
    pub fn per_100g(&self) -> AppResult<NutrientProfile> {
        match self.serving_size_g {
            Some(grams) if grams > 0.0 => Ok(self.per_serving.scaled(REFERENCE_GRAMS / grams)),
            _ => Err(AppError::invalid_input(
                "Serving size not found on label; cannot convert to per-100g values",
            )),
        }
    }
}

/// Repair OCR digit confusions and parse a number token
fn parse_ocr_number(token: &str) -> Option<f64> {
    let repaired: String = token
        .chars()
        .map(|c| match c {
            'O' | 'o' => '0',
            'l' | 'I' => '1',
            ',' => '.',
            other => other,
        })
        .collect();
    repaired.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert a found value into the nutrient's canonical unit
fn to_canonical_unit(kind: NutrientKind, value: f64, unit: Option<&str>) -> f64 {
    let unit = unit.map(str::to_lowercase);
    match (kind.unit(), unit.as_deref()) {
        ("mg", Some("g")) => value * 1000.0,
        ("g", Some("mg")) => value / 1000.0,
        ("µg", Some("mg")) => value * 1000.0,
        // 1 IU of vitamin D = 0.025 µg
        ("µg", Some("iu")) => value * 0.025,
        _ => value,
    }
}

/// Whether a match should be rejected based on its surroundings
fn rejected(text: &str, start: usize, end: usize, excluded_prefix: Option<&str>) -> bool {
    let rest = &text[end..];
    let next = rest.trim_start_matches([' ', '\t']).chars().next();
    // A percent daily value column, or a number running into a word
    if matches!(next, Some('%')) || rest.chars().next().is_some_and(char::is_alphanumeric) {
        return true;
    }
    excluded_prefix.is_some_and(|prefix| {
        text[..start]
            .trim_end()
            .to_lowercase()
            .ends_with(prefix)
    })
}

/// First acceptable value for a pattern, in the nutrient's canonical unit
fn first_value(text: &str, pattern: &FieldPattern) -> Option<f64> {
    pattern.regex.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if rejected(text, whole.start(), whole.end(), pattern.excluded_prefix) {
            return None;
        }
        let (number, unit) = number_and_unit(&caps)?;
        let value = parse_ocr_number(number)?;
        Some(to_canonical_unit(pattern.kind, value, unit))
    })
}

/// Number and unit from the first participating alternative of a pattern
fn number_and_unit<'t>(caps: &Captures<'t>) -> Option<(&'t str, Option<&'t str>)> {
    // Patterns hold one or two alternatives of (number, unit) groups
    (1..caps.len()).step_by(2).find_map(|group| {
        caps.get(group)
            .map(|number| (number.as_str(), caps.get(group + 1).map(|u| u.as_str())))
    })
}

fn extract_serving_size(text: &str) -> Option<f64> {
    [&*SERVING_PAREN_PATTERN, &*SERVING_PLAIN_PATTERN]
        .into_iter()
        .flatten()
        .find_map(|regex| {
            let caps = regex.captures(text)?;
            parse_ocr_number(caps.get(1)?.as_str())
        })
        .filter(|grams| *grams > 0.0)
}

/// Extract nutrition facts from OCR text
#[must_use]
pub fn extract_label_fields(text: &str) -> LabelScan {
    let mut scan = LabelScan {
        serving_size_g: extract_serving_size(text),
        ..LabelScan::default()
    };
    if scan.serving_size_g.is_none() {
        scan.not_found.push(SERVING_SIZE_FIELD.to_owned());
    }

    for pattern in FIELD_PATTERNS.iter() {
        match first_value(text, pattern) {
            Some(value) => {
                scan.per_serving.set(pattern.kind, value);
                scan.found.push(pattern.kind);
            }
            None => scan.not_found.push(pattern.kind.as_str().to_owned()),
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "Nutrition Facts
8 servings per container
Serving size 2/3 cup (55g)
Amount per serving
Calories 230
% Daily Value*
Total Fat 8g 10%
Saturated Fat 1g 5%
Trans Fat 0g
Cholesterol 0mg 0%
Sodium 160mg 7%
Total Carbohydrate 37g 13%
Dietary Fiber 4g 14%
Total Sugars 12g
Includes 10g Added Sugars 20%
Protein 3g
Vitamin D 2mcg 10%
Calcium 260mg 20%
Iron 8mg 45%
Potassium 235mg 6%";

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_full_fda_label() {
        let scan = extract_label_fields(LABEL);
        assert_eq!(scan.serving_size_g, Some(55.0));
        assert!(scan.not_found.is_empty(), "missing: {:?}", scan.not_found);

        let p = scan.per_serving;
        assert_close(p.calories, 230.0);
        assert_close(p.fat, 8.0);
        assert_close(p.saturated_fat, 1.0);
        assert_close(p.trans_fat, 0.0);
        assert_close(p.sodium, 160.0);
        assert_close(p.carbohydrate, 37.0);
        assert_close(p.fiber, 4.0);
        assert_close(p.sugars, 12.0);
        assert_close(p.added_sugars, 10.0);
        assert_close(p.protein, 3.0);
        assert_close(p.vitamin_d, 2.0);
        assert_close(p.calcium, 260.0);
        assert_close(p.iron, 8.0);
        assert_close(p.potassium, 235.0);
    }

    #[test]
    fn test_ocr_confusions_repaired() {
        let scan = extract_label_fields("Serving size 4O g\nTotal Fat l,5g\nTrans Fat Og\nSodium lOmg");
        assert_eq!(scan.serving_size_g, Some(40.0));
        assert_close(scan.per_serving.fat, 1.5);
        assert_close(scan.per_serving.trans_fat, 0.0);
        assert!(scan.found.contains(&NutrientKind::TransFat));
        assert_close(scan.per_serving.sodium, 10.0);
    }

    #[test]
    fn test_total_fat_does_not_take_saturated_value() {
        let scan = extract_label_fields("Total Fat\nSaturated Fat 3g\nTrans Fat 0.5g");
        assert!(!scan.found.contains(&NutrientKind::Fat));
        assert_close(scan.per_serving.saturated_fat, 3.0);
        assert_close(scan.per_serving.trans_fat, 0.5);
    }

    #[test]
    fn test_total_sugars_does_not_take_added_value() {
        let scan = extract_label_fields("Added Sugars 6g\nProtein 2g");
        assert!(!scan.found.contains(&NutrientKind::Sugars));
        assert_close(scan.per_serving.added_sugars, 6.0);
    }

    #[test]
    fn test_percent_values_ignored() {
        let scan = extract_label_fields("Calcium 20%\nIron 2mg 10%");
        assert!(!scan.found.contains(&NutrientKind::Calcium));
        assert_close(scan.per_serving.iron, 2.0);
    }

    #[test]
    fn test_unit_conversion() {
        let scan = extract_label_fields("Sodium 0.2g\nVitamin D 400 IU");
        assert_close(scan.per_serving.sodium, 200.0);
        assert_close(scan.per_serving.vitamin_d, 10.0);
    }

    #[test]
    fn test_per_100g_requires_serving_size() {
        let scan = extract_label_fields("Calories 120\nProtein 6g");
        assert!(scan.not_found.iter().any(|f| f == SERVING_SIZE_FIELD));
        assert!(scan.per_100g().is_err());

        let scan = extract_label_fields("Serving size 1 cup (240ml)\nCalories 120\nProtein 6g");
        let per_100g = scan.per_100g().unwrap();
        assert_close(per_100g.calories, 50.0);
        assert_close(per_100g.protein, 2.5);
    }

    #[test]
    fn test_empty_text() {
        let scan = extract_label_fields("");
        assert!(scan.found.is_empty());
        assert_eq!(scan.not_found.len(), NutrientKind::ALL.len() + 1);
    }
}
