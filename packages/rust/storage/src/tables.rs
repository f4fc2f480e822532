//! CSV readers and writers for the item, error, and catalog tables.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use wikiloot_shared::{CatalogEntry, ItemRecord, Result, WikilootError};

/// Identity columns of a row that failed extraction, kept for reprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRow {
    pub item_id: String,
    pub category: String,
    pub sub_category: String,
    pub name: String,
    pub variation: u32,
    pub url: String,
}

impl From<&ItemRecord> for ErrorRow {
    fn from(record: &ItemRecord) -> Self {
        Self {
            item_id: record.item_id.clone(),
            category: record.category.clone(),
            sub_category: record.sub_category.clone(),
            name: record.name.clone(),
            variation: record.variation,
            url: record.url.clone(),
        }
    }
}

/// Header of the enriched item table.
pub const ITEM_COLUMNS: [&str; 10] = [
    "item_id",
    "category",
    "sub_category",
    "name",
    "variation",
    "url",
    "rarity",
    "price_gp",
    "weight_lb",
    "description",
];

/// Header of the error table.
pub const ERROR_COLUMNS: [&str; 6] = ["item_id", "category", "sub_category", "name", "variation", "url"];

/// Header of the catalog table.
pub const CATALOG_COLUMNS: [&str; 2] = ["name", "url"];

/// Only the `url` column of any table.
#[derive(Debug, Deserialize)]
struct UrlOnly {
    url: String,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read the input item table.
#[instrument]
pub fn read_items(path: &Path) -> Result<Vec<ItemRecord>> {
    let rows: Vec<ItemRecord> = read_rows(path)?;
    debug!(rows = rows.len(), "item table loaded");
    Ok(rows)
}

/// Read a previously written error table.
pub fn read_error_rows(path: &Path) -> Result<Vec<ErrorRow>> {
    read_rows(path)
}

/// Read a `name, url` catalog table.
pub fn read_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    read_rows(path)
}

/// Collect the `url` column of any table with a header row.
pub fn read_known_urls(path: &Path) -> Result<HashSet<String>> {
    let rows: Vec<UrlOnly> = read_rows(path)?;
    Ok(rows.into_iter().map(|row| row.url).collect())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| WikilootError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| {
            // +2: one for the header, one for 1-based line numbers.
            row.map_err(|e| WikilootError::table(path, format!("row {}: {e}", index + 2)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write the enriched item table.
pub fn write_items(path: &Path, records: &[ItemRecord]) -> Result<()> {
    write_rows(path, &ITEM_COLUMNS, records)
}

/// Write the error table: identity columns of every failed row.
pub fn write_error_rows<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a ItemRecord>,
) -> Result<()> {
    let rows: Vec<ErrorRow> = records.into_iter().map(ErrorRow::from).collect();
    write_rows(path, &ERROR_COLUMNS, &rows)
}

/// Write a `name, url` catalog table.
pub fn write_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    write_rows(path, &CATALOG_COLUMNS, entries)
}

/// Serialize `rows` under their derived header; `columns` is written only
/// when there are no rows to derive it from.
fn write_rows<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| WikilootError::io(parent, e))?;
        }
    }

    // Opening the file ourselves keeps `PermissionDenied` visible as `Locked`.
    let file = File::create(path).map_err(|e| WikilootError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    if rows.is_empty() {
        writer
            .write_record(columns)
            .map_err(|e| WikilootError::table(path, e.to_string()))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| WikilootError::table(path, e.to_string()))?;
    }
    writer.flush().map_err(|e| WikilootError::io(path, e))?;

    debug!(path = %path.display(), rows = rows.len(), "table written");
    Ok(())
}
