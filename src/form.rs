// 📝 Item Form - validate a single item and write it through the store
//
// Fields arrive as raw text (terminal input, CLI flags, JSON bodies) and are
// checked all at once so every bad field can be reported together.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::entities::{AppSettings, InventoryItem, NewItem, StorageZone};
use crate::error::{InventoryError, Result};
use crate::store::InventoryStore;

/// Smallest quantity the form accepts
pub const MIN_QUANTITY: f64 = 0.01;

/// Date format used by every front end
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// FIELD ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ============================================================================
// ITEM FORM
// ============================================================================

/// Raw form state for adding or editing one item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemForm {
    pub name: String,
    /// YYYY-MM-DD
    pub expiry_date: String,
    /// Text or a JSON number
    #[serde(deserialize_with = "text_or_number")]
    pub quantity: String,
    pub unit: String,
    pub category: String,
    #[serde(rename = "storageLocation")]
    pub storage_zone: String,
}

impl ItemForm {
    /// Empty form for a new item in `zone`, defaulting to the first category
    pub fn blank(zone: StorageZone, settings: &AppSettings) -> Self {
        ItemForm {
            name: String::new(),
            expiry_date: String::new(),
            quantity: "1".to_string(),
            unit: String::new(),
            category: settings.default_category().unwrap_or_default().to_string(),
            storage_zone: zone.as_str().to_string(),
        }
    }

    /// Form prefilled from an existing item
    pub fn from_item(item: &InventoryItem) -> Self {
        ItemForm {
            name: item.name.clone(),
            expiry_date: item.expiry_date.format(DATE_FORMAT).to_string(),
            quantity: format_quantity(item.quantity),
            unit: item.unit.clone(),
            category: item.category.clone(),
            storage_zone: item.storage_zone.as_str().to_string(),
        }
    }

    /// Check every field; on success return the parsed draft
    pub fn validate(&self) -> std::result::Result<NewItem, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "is required"));
        }

        let expiry_date = if self.expiry_date.trim().is_empty() {
            errors.push(FieldError::new("expiryDate", "is required"));
            None
        } else {
            match NaiveDate::parse_from_str(self.expiry_date.trim(), DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new("expiryDate", "must be a date in YYYY-MM-DD format"));
                    None
                }
            }
        };

        let quantity = if self.quantity.trim().is_empty() {
            errors.push(FieldError::new("quantity", "is required"));
            None
        } else {
            match self.quantity.trim().parse::<f64>() {
                Ok(q) if q.is_finite() && q >= MIN_QUANTITY => Some(q),
                Ok(_) => {
                    errors.push(FieldError::new("quantity", "must be at least 0.01"));
                    None
                }
                Err(_) => {
                    errors.push(FieldError::new("quantity", "must be a number"));
                    None
                }
            }
        };

        let unit = self.unit.trim();
        if unit.is_empty() {
            errors.push(FieldError::new("unit", "is required"));
        }

        let category = self.category.trim();
        if category.is_empty() {
            errors.push(FieldError::new("category", "is required"));
        }

        let storage_zone = if self.storage_zone.trim().is_empty() {
            errors.push(FieldError::new("storageLocation", "is required"));
            None
        } else {
            match self.storage_zone.parse::<StorageZone>() {
                Ok(zone) => Some(zone),
                Err(_) => {
                    errors.push(FieldError::new(
                        "storageLocation",
                        "must be one of COLD, FROZEN, AMBIENT",
                    ));
                    None
                }
            }
        };

        match (expiry_date, quantity, storage_zone) {
            (Some(expiry_date), Some(quantity), Some(storage_zone)) if errors.is_empty() => {
                Ok(NewItem {
                    name: name.to_string(),
                    expiry_date,
                    quantity,
                    unit: unit.to_string(),
                    category: category.to_string(),
                    storage_zone,
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate and write: edits `editing` when given, otherwise adds a new item
    pub fn submit(
        &self,
        store: &mut InventoryStore,
        editing: Option<&InventoryItem>,
    ) -> Result<InventoryItem> {
        let draft = self.validate().map_err(InventoryError::Validation)?;

        match editing {
            Some(existing) => {
                let updated = InventoryItem {
                    id: existing.id.clone(),
                    added_date: existing.added_date,
                    name: draft.name,
                    expiry_date: draft.expiry_date,
                    quantity: draft.quantity,
                    unit: draft.unit,
                    category: draft.category,
                    storage_zone: draft.storage_zone,
                };
                store.update_item(updated)
            }
            None => store.add_item(draft),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(n) => format_quantity(n),
    })
}

/// `1.0` shows as `1`, `0.5` as `0.5`
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}
