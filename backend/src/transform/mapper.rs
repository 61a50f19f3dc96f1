//! Source column to target key mapping.
//!
//! `code` becomes `mainUPC`, `product_name` becomes `foodDesc`, and each
//! `*_100g` column becomes an integer nutrient code. Columns listed in
//! [`DROPPED_COLUMNS`] never reach the output.

use std::collections::BTreeMap;

use crate::models::{CleanRecord, EnrichmentInputs, MappedRecord};

/// Target key for the identifier column.
pub const MAIN_UPC: &str = "mainUPC";

/// `*_100g` source column to nutrient code.
pub const NUTRIENT_MAPPING: &[(&str, u16)] = &[
    ("energy-kcal_100g", 208),
    ("proteins_100g", 203),
    ("fat_100g", 204),
    ("carbohydrates_100g", 205),
    ("fiber_100g", 291),
    ("calcium_100g", 301),
    ("iron_100g", 303),
    ("magnesium_100g", 304),
    ("potassium_100g", 306),
    ("sodium_100g", 307),
    ("zinc_100g", 309),
    ("copper_100g", 312),
    ("manganese_100g", 315),
    ("selenium_100g", 317),
    ("vitamin-c_100g", 401),
    ("vitamin-b1_100g", 404),
    ("vitamin-b2_100g", 405),
    // Niacin: not in the load schema, so code 406 is never emitted
    ("vitamin-pp_100g", 406),
    ("vitamin-b6_100g", 415),
    ("folates_100g", 417),
    ("vitamin-b12_100g", 418),
    ("vitamin-d_100g", 328),
    ("vitamin-e_100g", 323),
    ("vitamin-k_100g", 430),
    ("choline_100g", 421),
    ("saturated-fat_100g", 606),
    ("monounsaturated-fat_100g", 645),
    ("polyunsaturated-fat_100g", 646),
    ("trans-fat_100g", 605),
    ("cholesterol_100g", 601),
    ("alcohol_100g", 221),
    ("caffeine_100g", 262),
    ("sugars_100g", 269),
    ("omega-3-fat_100g", 901),
    ("omega-6-fat_100g", 902),
    ("vitamin-a_100g", 320),
];

/// Loaded columns with no place in the target schema.
pub const DROPPED_COLUMNS: &[&str] = &[
    "countries_tags",
    "chromium_100g",
    "molybdenum_100g",
    "iodine_100g",
    "biotin_100g",
    "vitamin-b9_100g",
];

/// Nutrient code for a source column.
pub fn nutrient_code(column: &str) -> Option<u16> {
    NUTRIENT_MAPPING
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, code)| *code)
}

pub fn is_dropped(column: &str) -> bool {
    DROPPED_COLUMNS.contains(&column)
}

/// Re-key a cleaned row.
pub fn map_record(record: CleanRecord) -> MappedRecord {
    let nutrients: BTreeMap<u16, f64> = record
        .nutrients
        .into_iter()
        .filter(|(name, _)| !is_dropped(name))
        .filter_map(|(name, value)| nutrient_code(name).map(|code| (code, value)))
        .collect();

    MappedRecord {
        main_upc: record.code,
        food_desc: record.product_name,
        nutrients,
        inputs: EnrichmentInputs {
            brands: record.brands,
            ingredients_text: record.ingredients_text,
            serving_size: record.serving_size,
            serving_quantity: record.serving_quantity,
            image_small_url: record.image_small_url,
        },
    }
}
