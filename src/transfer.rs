// CSV export / import
//
// Columns: name, expiry_date, quantity, unit, category, storage_location[, added_date]
// Import runs every row through the item form so bad data never reaches the store.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::entities::InventoryItem;
use crate::form::{format_quantity, ItemForm, DATE_FORMAT};
use crate::store::ImportDraft;

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    name: String,
    expiry_date: String,
    quantity: String,
    unit: String,
    category: String,
    storage_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    added_date: Option<String>,
}

impl From<&InventoryItem> for CsvRow {
    fn from(item: &InventoryItem) -> Self {
        CsvRow {
            name: item.name.clone(),
            expiry_date: item.expiry_date.format(DATE_FORMAT).to_string(),
            quantity: format_quantity(item.quantity),
            unit: item.unit.clone(),
            category: item.category.clone(),
            storage_location: item.storage_zone.as_str().to_string(),
            added_date: Some(item.added_date.format(DATE_FORMAT).to_string()),
        }
    }
}

/// Write every item as one CSV row (with header)
pub fn export_csv<W: Write>(items: &[InventoryItem], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    for item in items {
        wtr.serialize(CsvRow::from(item))
            .with_context(|| format!("Failed to write item {}", item.id))?;
    }
    wtr.flush().context("Failed to flush CSV output")?;

    Ok(items.len())
}

pub fn export_csv_file(items: &[InventoryItem], path: &Path) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    export_csv(items, file)
}

/// Parse rows into validated drafts; the first bad row aborts with its line number.
/// A blank or missing `added_date` means today.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ImportDraft>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut drafts = Vec::new();

    for (index, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = result.with_context(|| format!("Failed to read CSV line {}", line))?;

        let added_date = match row.added_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                anyhow!(
                    "Invalid item on CSV line {}: added_date: must be a date in YYYY-MM-DD format",
                    line
                )
            })?),
        };

        let form = ItemForm {
            name: row.name,
            expiry_date: row.expiry_date,
            quantity: row.quantity,
            unit: row.unit,
            category: row.category,
            storage_zone: row.storage_location,
        };

        let draft = form.validate().map_err(|errors| {
            let detail: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow!("Invalid item on CSV line {}: {}", line, detail.join("; "))
        })?;
        drafts.push(ImportDraft {
            item: draft,
            added_date,
        });
    }

    Ok(drafts)
}

pub fn read_csv_file(path: &Path) -> Result<Vec<ImportDraft>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{NewItem, StorageZone};
    use crate::store::InventoryStore;
    use rusqlite::Connection;

    fn sample_item() -> InventoryItem {
        InventoryItem::from_new(
            NewItem {
                name: "Butter, salted".to_string(),
                expiry_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
                quantity: 0.5,
                unit: "kg".to_string(),
                category: "Dairy".to_string(),
                storage_zone: StorageZone::Cold,
            },
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        )
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let mut out = Vec::new();
        let count = export_csv(&[sample_item()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(count, 1);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("name,expiry_date,quantity,unit,category,storage_location,added_date")
        );
        assert_eq!(
            lines.next(),
            Some("\"Butter, salted\",2026-12-01,0.5,kg,Dairy,COLD,2026-10-16")
        );
    }

    #[test]
    fn test_exported_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.csv");
        let item = sample_item();

        export_csv_file(&[item.clone()], &path).unwrap();
        let drafts = read_csv_file(&path).unwrap();

        assert_eq!(
            drafts,
            vec![ImportDraft {
                item: item.to_new(),
                added_date: Some(item.added_date),
            }]
        );
    }

    #[test]
    fn test_export_import_round_trip_keeps_added_date() {
        let mut source = InventoryStore::open(Connection::open_in_memory().unwrap()).unwrap();
        let added_on = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        source.add_item_on(sample_item().to_new(), added_on).unwrap();

        let mut out = Vec::new();
        export_csv(source.items(), &mut out).unwrap();

        let mut target = InventoryStore::open(Connection::open_in_memory().unwrap()).unwrap();
        target.import_items(read_csv(out.as_slice()).unwrap()).unwrap();

        assert_eq!(target.items().len(), 1);
        assert_eq!(target.items()[0].added_date, added_on);
        assert_eq!(target.items()[0].name, "Butter, salted");
    }

    #[test]
    fn test_bad_added_date_reports_line() {
        let data = "name,expiry_date,quantity,unit,category,storage_location,added_date\n\
                    Peas,2027-01-10,2,bag,Vegetables,FROZEN,01/01/2025\n";

        let err = read_csv(data.as_bytes()).unwrap_err().to_string();
        assert!(err.contains("line 2"), "got: {}", err);
        assert!(err.contains("added_date"));
    }

    #[test]
    fn test_added_date_column_is_optional() {
        let data = "name,expiry_date,quantity,unit,category,storage_location\n\
                    Peas,2027-01-10,2,bag,Vegetables,frozen\n";

        let drafts = read_csv(data.as_bytes()).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].item.storage_zone, StorageZone::Frozen);
        assert_eq!(drafts[0].added_date, None);
    }

    #[test]
    fn test_bad_row_reports_line() {
        let data = "name,expiry_date,quantity,unit,category,storage_location\n\
                    Peas,2027-01-10,2,bag,Vegetables,FROZEN\n\
                    ,2027-01-10,0,bag,Vegetables,FROZEN\n";

        let err = read_csv(data.as_bytes()).unwrap_err().to_string();
        assert!(err.contains("line 3"), "got: {}", err);
        assert!(err.contains("name: is required"));
    }
}
