//! Per-record enrichment.
//!
//! Turns a [`MappedRecord`] into a [`NutritionFact`]:
//!
//! 1. brand merge into the description
//! 2. default serving weights
//! 3. provenance constants
//! 4. boost score
//!
//! Every step reads the intermediate record, so the enrichment inputs
//! (brands, ingredients, serving metadata, image URL) are consumed here and
//! have no field to land in on the output type.

use crate::models::{DefaultServing, EnrichmentInputs, MappedRecord, NutritionFact, Weight};

/// Value of `source` on every output record.
pub const SOURCE: &str = "OFF";

/// Value of `common` on every output record.
pub const COMMON: bool = false;

pub const BRANDED_BOOST: u32 = 100;
pub const UNBRANDED_BOOST: u32 = 25;

/// Added for each populated completeness field.
pub const FIELD_BOOST: u32 = 25;

/// Append `" by {brand}"` when exactly one brand is listed.
pub fn handle_brands(food_desc: &str, brands: &str) -> String {
    if brands.is_empty() {
        return food_desc.to_string();
    }

    let brands_list: Vec<&str> = brands.split(',').map(str::trim).collect();
    match brands_list.as_slice() {
        [brand] => format!("{} by {}", food_desc, brand),
        _ => food_desc.to_string(),
    }
}

/// 100 g serving, ounce and gram, in that sort order.
pub fn default_weights() -> Vec<Weight> {
    vec![
        Weight::new("100.", 1, "serving"),
        Weight::new("28.35", 987, "oz"),
        Weight::new("1.", 988, "gram"),
    ]
}

pub fn default_serving() -> DefaultServing {
    DefaultServing {
        gm_wgt: "100.".to_string(),
        amount: 1,
        msre_desc: "serving".to_string(),
    }
}

/// Relevance score: brand base plus a bonus per populated field.
pub fn add_boost(inputs: &EnrichmentInputs) -> u32 {
    let base = if inputs.brands.is_empty() {
        UNBRANDED_BOOST
    } else {
        BRANDED_BOOST
    };

    let populated = [
        !inputs.ingredients_text.is_empty(),
        !inputs.serving_size.is_empty(),
        inputs.serving_quantity != 0.0,
        !inputs.image_small_url.is_empty(),
    ];

    base + FIELD_BOOST * populated.iter().filter(|p| **p).count() as u32
}

/// Build the output record.
pub fn enrich(record: MappedRecord) -> NutritionFact {
    let MappedRecord {
        main_upc,
        food_desc,
        nutrients,
        inputs,
    } = record;

    NutritionFact {
        main_upc,
        food_desc: handle_brands(&food_desc, &inputs.brands),
        nutrients,
        weights: default_weights(),
        df_srv: default_serving(),
        source: SOURCE.to_string(),
        common: COMMON,
        boost: add_boost(&inputs),
    }
}
