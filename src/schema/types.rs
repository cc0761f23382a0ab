// src/schema/types.rs

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use super::ordered;

/// One `%R` row: field → value pairs in the header order that was current
/// when the row was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `field`, or `""` when the record does not carry it.
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Replace `field` in place, or append it after the existing fields.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            let k: String = k.into();
            record.set(&k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ordered::serialize(&self.fields, serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ordered::deserialize(deserializer).map(|fields| Record { fields })
    }
}

/// A table declared by `%T`, its `%F` field names and every `%R` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Field names from the last `%F` line seen for this table.
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append `name` to the headers unless it is already declared.
    pub fn ensure_header(&mut self, name: &str) {
        if !self.headers.iter().any(|h| h == name) {
            self.headers.push(name.to_string());
        }
    }

    /// One-to-one lookup from `key_field` to `value_field`. Rows with an empty
    /// key are skipped; the first row for a key wins.
    pub fn index_by(&self, key_field: &str, value_field: &str) -> HashMap<String, String> {
        let mut index = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            let key = row.value(key_field);
            if key.is_empty() {
                continue;
            }
            index
                .entry(key.to_string())
                .or_insert_with(|| row.value(value_field).to_string());
        }
        index
    }
}

/// The `ERMHDR` line that opens every P6 export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportHeader {
    pub version: String,
    pub export_date: String,
    pub export_type: String,
    pub user: String,
    pub user_name: String,
    pub database: String,
    pub module: String,
    pub currency: String,
}

impl ExportHeader {
    /// Build from the tab-separated remainder of an `ERMHDR` line.
    pub fn from_fields(rest: &str) -> Self {
        let rest = rest.strip_prefix('\t').unwrap_or(rest);
        let mut parts = rest.split('\t').map(str::trim);
        let mut next = || parts.next().unwrap_or("").to_string();
        Self {
            version: next(),
            export_date: next(),
            export_type: next(),
            user: next(),
            user_name: next(),
            database: next(),
            module: next(),
            currency: next(),
        }
    }

    /// Export day, when `export_date` is a `YYYY-MM-DD` date.
    pub fn export_day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.export_date.trim(), "%Y-%m-%d").ok()
    }
}

/// Every table of one export, in order of first declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<ExportHeader>,
    #[serde(default, with = "ordered")]
    tables: Vec<(String, Table)>,
}

impl ParsedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `table` under `name`. An existing table of that name is
    /// replaced but keeps its original position.
    pub fn insert(&mut self, name: &str, table: Table) {
        match self.tables.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = table,
            None => self.tables.push((name.to_string(), table)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|(_, t)| t.rows.len()).sum()
    }
}
