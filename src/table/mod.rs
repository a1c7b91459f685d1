// src/table/mod.rs

pub mod arrow;
pub mod write;

pub use write::{output_stem, write_csv, write_outputs, write_parquet};

/// One property known to the feature service within the target jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRecord {
    pub jur: u32,
    pub roll_num: String,
    pub impr_value: Option<i64>,
    pub land_value: Option<i64>,
}

/// Output of identifier discovery, in service order with a dense index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollTable {
    records: Vec<RollRecord>,
}

impl RollTable {
    pub fn new(records: Vec<RollRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RollRecord] {
        &self.records
    }

    pub fn jurisdictions(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.jur).collect()
    }

    pub fn rolls(&self) -> Vec<String> {
        self.records.iter().map(|r| r.roll_num.clone()).collect()
    }

    /// Keep only the first `n` records.
    pub fn truncate(&mut self, n: usize) {
        self.records.truncate(n);
    }
}

/// Labelled page fields for one property, in the order they were first seen.
/// A `None` value is the null marker: absent, empty, or whitespace-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedFields {
    entries: Vec<(String, Option<String>)>,
}

impl ScrapedFields {
    /// Record `value` for `id` unless it is already present; the first value wins.
    pub fn insert(&mut self, id: &str, value: Option<String>) {
        if !self.contains(id) {
            self.entries.push((id.to_string(), value));
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == id)
    }

    /// `None` if the id was never recorded, `Some(None)` if it was recorded as null.
    pub fn get(&self, id: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.as_deref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One scraped property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRow {
    pub jur: u32,
    pub roll: String,
    pub fields: ScrapedFields,
}

/// Scrape results in input order. Columns are `jur`, `roll`, then every field
/// id in the order it first appeared; a row missing a column reads as null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTable {
    field_columns: Vec<String>,
    rows: Vec<PropertyRow>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: PropertyRow) {
        for key in row.fields.keys() {
            if !self.field_columns.iter().any(|c| c == key) {
                self.field_columns.push(key.to_string());
            }
        }
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[PropertyRow] {
        &self.rows
    }

    pub fn field_columns(&self) -> &[String] {
        &self.field_columns
    }

    pub fn columns(&self) -> Vec<String> {
        let mut cols = vec!["jur".to_string(), "roll".to_string()];
        cols.extend(self.field_columns.iter().cloned());
        cols
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
