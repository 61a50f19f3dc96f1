//! Row cleaning: required-field check, default filling, control-character stripping.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CleanRecord, SourceRecord};

/// Nutrient columns a row cannot be published without.
pub const REQUIRED_NUTRIENTS: &[&str] = &[
    "energy-kcal_100g",
    "proteins_100g",
    "fat_100g",
    "carbohydrates_100g",
];

/// Carriage returns, line feeds, tabs and the literal two-character `\N`.
static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r+|\n+|\t+|\\N").expect("valid control-char pattern"));

/// Remove sequences that would break a JSONL line.
pub fn strip_control_chars(text: &str) -> String {
    CONTROL_CHARS.replace_all(text, "").into_owned()
}

/// Name of the first required field the row lacks, if any.
pub fn missing_required(row: &SourceRecord) -> Option<&'static str> {
    if row.code.is_none() {
        return Some("code");
    }
    if row.product_name.is_none() {
        return Some("product_name");
    }
    REQUIRED_NUTRIENTS
        .iter()
        .copied()
        .find(|column| row.nutrient(column).is_none())
}

/// Clean one loaded row.
///
/// Returns `Err(column)` naming a missing required field; the row is then
/// dropped by the caller. Only text fields are stripped, numbers are already
/// typed.
pub fn clean(row: SourceRecord) -> Result<CleanRecord, &'static str> {
    if let Some(column) = missing_required(&row) {
        return Err(column);
    }

    let text = |value: Option<String>| value.map(|v| strip_control_chars(&v)).unwrap_or_default();

    Ok(CleanRecord {
        code: text(row.code),
        product_name: text(row.product_name),
        brands: text(row.brands),
        serving_size: text(row.serving_size),
        countries_tags: text(row.countries_tags),
        serving_quantity: row.serving_quantity.unwrap_or(0.0),
        image_small_url: text(row.image_small_url),
        ingredients_text: text(row.ingredients_text),
        nutrients: row
            .nutrients
            .into_iter()
            .map(|(name, value)| (name, value.unwrap_or(0.0)))
            .collect(),
    })
}
