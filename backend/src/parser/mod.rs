//! TSV loader for the Open Food Facts export.
//!
//! Reads a restricted column subset with a fixed per-column type. Cells are
//! taken verbatim (no trimming, no quoting); a small set of NA tokens counts
//! as absent. A cell that cannot be coerced to its declared type aborts the
//! load, since the file no longer matches the schema.

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::SourceRecord;

/// Declared type of a loaded column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Float,
}

/// Where a column's value lands in a [`SourceRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Code,
    ProductName,
    Brands,
    ServingSize,
    CountriesTags,
    ServingQuantity,
    ImageSmallUrl,
    IngredientsText,
    Nutrient,
}

impl Field {
    pub fn column_type(self) -> ColumnType {
        match self {
            Field::ServingQuantity | Field::Nutrient => ColumnType::Float,
            _ => ColumnType::Text,
        }
    }
}

/// One entry of the load schema. The header must contain every entry.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub field: Field,
}

const fn text(name: &'static str, field: Field) -> ColumnSpec {
    ColumnSpec { name, field }
}

const fn nutrient(name: &'static str) -> ColumnSpec {
    ColumnSpec { name, field: Field::Nutrient }
}

/// Columns read from the export, in output order for nutrients.
pub const SOURCE_COLUMNS: &[ColumnSpec] = &[
    text("code", Field::Code),
    text("brands", Field::Brands),
    text("product_name", Field::ProductName),
    text("serving_size", Field::ServingSize),
    text("countries_tags", Field::CountriesTags),
    ColumnSpec { name: "serving_quantity", field: Field::ServingQuantity },
    text("image_small_url", Field::ImageSmallUrl),
    text("ingredients_text", Field::IngredientsText),
    nutrient("energy-kcal_100g"),
    nutrient("proteins_100g"),
    nutrient("fat_100g"),
    nutrient("carbohydrates_100g"),
    nutrient("sugars_100g"),
    nutrient("fiber_100g"),
    nutrient("saturated-fat_100g"),
    nutrient("monounsaturated-fat_100g"),
    nutrient("polyunsaturated-fat_100g"),
    nutrient("omega-3-fat_100g"),
    nutrient("omega-6-fat_100g"),
    nutrient("trans-fat_100g"),
    nutrient("cholesterol_100g"),
    nutrient("sodium_100g"),
    nutrient("vitamin-a_100g"),
    nutrient("vitamin-d_100g"),
    nutrient("vitamin-e_100g"),
    nutrient("vitamin-k_100g"),
    nutrient("vitamin-c_100g"),
    nutrient("vitamin-b1_100g"),
    nutrient("vitamin-b2_100g"),
    nutrient("vitamin-b6_100g"),
    nutrient("vitamin-b9_100g"),
    nutrient("folates_100g"),
    nutrient("vitamin-b12_100g"),
    nutrient("biotin_100g"),
    nutrient("potassium_100g"),
    nutrient("calcium_100g"),
    nutrient("iron_100g"),
    nutrient("magnesium_100g"),
    nutrient("zinc_100g"),
    nutrient("copper_100g"),
    nutrient("manganese_100g"),
    nutrient("selenium_100g"),
    nutrient("chromium_100g"),
    nutrient("molybdenum_100g"),
    nutrient("iodine_100g"),
    nutrient("caffeine_100g"),
    nutrient("choline_100g"),
    nutrient("alcohol_100g"),
];

/// Cell contents treated as missing.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Look up a schema entry by column name.
pub fn column_spec(name: &str) -> Option<&'static ColumnSpec> {
    SOURCE_COLUMNS.iter().find(|c| c.name == name)
}

/// A schema column resolved against the file header.
#[derive(Debug, Clone, Copy)]
struct ResolvedColumn {
    spec: &'static ColumnSpec,
    index: usize,
}

/// Resolve every schema column to its header position.
fn resolve_columns(headers: &StringRecord) -> LoadResult<Vec<ResolvedColumn>> {
    SOURCE_COLUMNS
        .iter()
        .map(|spec| {
            // First occurrence wins on duplicated header names
            let index = headers
                .iter()
                .position(|h| h == spec.name)
                .ok_or_else(|| LoadError::MissingColumn(spec.name.to_string()))?;
            Ok(ResolvedColumn { spec, index })
        })
        .collect()
}

/// Parse a numeric cell. Infinities and NaN spellings outside [`NA_VALUES`]
/// are rejected, since JSON has no representation for them.
fn parse_float(raw: &str, line: u64, column: &str) -> LoadResult<f64> {
    let invalid = |message: String| LoadError::InvalidValue {
        line,
        column: column.to_string(),
        value: raw.to_string(),
        message,
    };

    let value = raw.trim().parse::<f64>().map_err(|e| invalid(e.to_string()))?;
    if !value.is_finite() {
        return Err(invalid("not a finite number".to_string()));
    }
    Ok(value)
}

/// Streaming reader over the export.
pub struct Loader<R: Read> {
    rows: StringRecordsIntoIter<R>,
    columns: Vec<ResolvedColumn>,
    width: usize,
}

impl Loader<File> {
    /// Open a TSV export on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }
}

impl<R: Read> Loader<R> {
    /// Read the header and resolve the load schema against it.
    pub fn from_reader(reader: R) -> LoadResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = resolve_columns(&headers)?;

        Ok(Self {
            rows: rdr.into_records(),
            columns,
            width: headers.len(),
        })
    }

    /// Number of schema columns found in the header.
    pub fn resolved_count(&self) -> usize {
        self.columns.len()
    }

    fn build_record(&self, row: &StringRecord) -> LoadResult<SourceRecord> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() > self.width {
            return Err(LoadError::FieldCount {
                line,
                expected: self.width,
                found: row.len(),
            });
        }

        let mut record = SourceRecord {
            line,
            nutrients: Vec::with_capacity(self.columns.len()),
            ..Default::default()
        };

        for column in &self.columns {
            let cell = row.get(column.index).filter(|raw| !is_missing(raw));
            let name = column.spec.name;

            match column.spec.field.column_type() {
                ColumnType::Text => {
                    let value = cell.map(str::to_string);
                    match column.spec.field {
                        Field::Code => record.code = value,
                        Field::ProductName => record.product_name = value,
                        Field::Brands => record.brands = value,
                        Field::ServingSize => record.serving_size = value,
                        Field::CountriesTags => record.countries_tags = value,
                        Field::ImageSmallUrl => record.image_small_url = value,
                        Field::IngredientsText => record.ingredients_text = value,
                        Field::ServingQuantity | Field::Nutrient => {}
                    }
                }
                ColumnType::Float => {
                    let value = cell.map(|raw| parse_float(raw, line, name)).transpose()?;
                    if column.spec.field == Field::ServingQuantity {
                        record.serving_quantity = value;
                    } else {
                        record.nutrients.push((name, value));
                    }
                }
            }
        }

        Ok(record)
    }
}

impl<R: Read> Iterator for Loader<R> {
    type Item = LoadResult<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };
        Some(self.build_record(&row))
    }
}
