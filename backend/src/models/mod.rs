//! Domain models for the conversion pipeline.
//!
//! Each stage has its own record shape so a field can only exist where it
//! is meaningful:
//!
//! - [`SourceRecord`] - one loaded row, every cell optional
//! - [`CleanRecord`] - required fields guaranteed, optional fields defaulted
//! - [`MappedRecord`] - target keys applied, enrichment inputs held apart
//! - [`NutritionFact`] - the output record, which has no slot for enrichment inputs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Source Record (Loader output)
// =============================================================================

/// One row of the Open Food Facts export, as typed by the load schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    /// 1-based line number in the source file.
    pub line: u64,
    pub code: Option<String>,
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub serving_size: Option<String>,
    pub countries_tags: Option<String>,
    pub serving_quantity: Option<f64>,
    pub image_small_url: Option<String>,
    pub ingredients_text: Option<String>,
    /// `*_100g` columns in schema order.
    pub nutrients: Vec<(&'static str, Option<f64>)>,
}

impl SourceRecord {
    /// Value of a nutrient column, `None` when absent or not loaded.
    pub fn nutrient(&self, column: &str) -> Option<f64> {
        self.nutrients
            .iter()
            .find(|(name, _)| *name == column)
            .and_then(|(_, value)| *value)
    }
}

// =============================================================================
// Clean Record (Cleaner output)
// =============================================================================

/// A row that passed the required-field check.
///
/// Absent text is `""` and absent numbers are `0.0`; every text field has
/// had control characters stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanRecord {
    pub code: String,
    pub product_name: String,
    pub brands: String,
    pub serving_size: String,
    pub countries_tags: String,
    pub serving_quantity: f64,
    pub image_small_url: String,
    pub ingredients_text: String,
    pub nutrients: Vec<(&'static str, f64)>,
}

// =============================================================================
// Mapped Record (Mapper output)
// =============================================================================

/// Fields consumed by enrichment and never written out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentInputs {
    pub brands: String,
    pub ingredients_text: String,
    pub serving_size: String,
    pub serving_quantity: f64,
    pub image_small_url: String,
}

/// A record keyed by target names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedRecord {
    pub main_upc: String,
    pub food_desc: String,
    /// Nutrient code to value per 100 g.
    pub nutrients: BTreeMap<u16, f64>,
    pub inputs: EnrichmentInputs,
}

// =============================================================================
// Nutrition Fact (output)
// =============================================================================

/// A serving-weight entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
    /// Gram weight as a decimal string, e.g. `"28.35"`.
    pub gm_wgt: String,
    pub amount: u32,
    pub sort_order: u32,
    pub msre_desc: String,
}

impl Weight {
    pub fn new(gm_wgt: &str, sort_order: u32, msre_desc: &str) -> Self {
        Self {
            gm_wgt: gm_wgt.to_string(),
            amount: 1,
            sort_order,
            msre_desc: msre_desc.to_string(),
        }
    }
}

/// The default serving of a food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultServing {
    pub gm_wgt: String,
    pub amount: u32,
    pub msre_desc: String,
}

/// The output record consumed by the food-database importer.
///
/// Serialized key order: `mainUPC`, `foodDesc`, nutrient codes ascending,
/// `weights`, `dfSrv`, `source`, `common`, `boost`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionFact {
    #[serde(rename = "mainUPC")]
    pub main_upc: String,
    pub food_desc: String,
    #[serde(flatten)]
    pub nutrients: BTreeMap<u16, f64>,
    pub weights: Vec<Weight>,
    pub df_srv: DefaultServing,
    pub source: String,
    pub common: bool,
    pub boost: u32,
}

impl NutritionFact {
    /// Serialize as one JSONL line, without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fact() -> NutritionFact {
        NutritionFact {
            main_upc: "01234567".into(),
            food_desc: "Granola Bar by Acme".into(),
            nutrients: BTreeMap::from([(208, 400.0), (203, 8.0)]),
            weights: vec![Weight::new("100.", 1, "serving")],
            df_srv: DefaultServing {
                gm_wgt: "100.".into(),
                amount: 1,
                msre_desc: "serving".into(),
            },
            source: "OFF".into(),
            common: false,
            boost: 150,
        }
    }

    #[test]
    fn test_nutrition_fact_keys() {
        let value = serde_json::to_value(sample_fact()).unwrap();
        assert_eq!(value["mainUPC"], "01234567");
        assert_eq!(value["foodDesc"], "Granola Bar by Acme");
        assert_eq!(value["208"], 400.0);
        assert_eq!(value["203"], 8.0);
        assert_eq!(value["dfSrv"]["msreDesc"], "serving");
        assert_eq!(value["weights"][0]["sortOrder"], 1);
        assert_eq!(value["source"], "OFF");
        assert_eq!(value["common"], false);
        assert_eq!(value["boost"], 150);
    }

    #[test]
    fn test_json_line_key_order() {
        let line = sample_fact().to_json_line().unwrap();
        assert!(!line.contains('\n'));
        let main = line.find("\"mainUPC\"").unwrap();
        let desc = line.find("\"foodDesc\"").unwrap();
        let protein = line.find("\"203\"").unwrap();
        let energy = line.find("\"208\"").unwrap();
        let weights = line.find("\"weights\"").unwrap();
        let boost = line.find("\"boost\"").unwrap();
        assert!(main < desc && desc < protein && protein < energy);
        assert!(energy < weights && weights < boost);
    }

    #[test]
    fn test_weight_shape() {
        let weight = Weight::new("28.35", 987, "oz");
        assert_eq!(
            serde_json::to_value(&weight).unwrap(),
            json!({"gmWgt": "28.35", "amount": 1, "sortOrder": 987, "msreDesc": "oz"})
        );
    }

    #[test]
    fn test_source_record_nutrient_lookup() {
        let record = SourceRecord {
            nutrients: vec![("fat_100g", Some(12.0)), ("fiber_100g", None)],
            ..Default::default()
        };
        assert_eq!(record.nutrient("fat_100g"), Some(12.0));
        assert_eq!(record.nutrient("fiber_100g"), None);
        assert_eq!(record.nutrient("iron_100g"), None);
    }
}
