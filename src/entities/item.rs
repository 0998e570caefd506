// 🥕 Inventory Item - one perishable thing in the house
//
// Identity: `id` (UUID string, never changes once assigned)
// Values: everything else, editable through the item form
//
// JSON layout uses camelCase keys (expiryDate, storageLocation, addedDate)
// so the persisted document matches what the browser client writes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::zone::StorageZone;

// ============================================================================
// INVENTORY ITEM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Stable identity, unique within the collection
    pub id: String,

    pub name: String,

    /// Calendar date the item expires (YYYY-MM-DD)
    pub expiry_date: NaiveDate,

    /// Always > 0
    pub quantity: f64,

    /// Free text (g, pack, bottle, ...)
    pub unit: String,

    pub category: String,

    #[serde(rename = "storageLocation")]
    pub storage_zone: StorageZone,

    /// Local date the item was first recorded
    pub added_date: NaiveDate,
}

impl InventoryItem {
    /// Build a stored item from a draft, assigning identity and added date
    pub fn from_new(new_item: NewItem, added_date: NaiveDate) -> Self {
        InventoryItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: new_item.name,
            expiry_date: new_item.expiry_date,
            quantity: new_item.quantity,
            unit: new_item.unit,
            category: new_item.category,
            storage_zone: new_item.storage_zone,
            added_date,
        }
    }

    /// Copy of the editable values as a draft
    pub fn to_new(&self) -> NewItem {
        NewItem {
            name: self.name.clone(),
            expiry_date: self.expiry_date,
            quantity: self.quantity,
            unit: self.unit.clone(),
            category: self.category.clone(),
            storage_zone: self.storage_zone,
        }
    }

    /// Content fingerprint used to skip duplicates on import.
    /// Identity and added date are not part of it.
    pub fn fingerprint(&self) -> String {
        fingerprint_values(
            &self.name,
            self.expiry_date,
            self.quantity,
            &self.unit,
            &self.category,
            self.storage_zone,
        )
    }
}

// ============================================================================
// NEW ITEM (draft without identity)
// ============================================================================

/// Item values before the store assigns `id` and `addedDate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub expiry_date: NaiveDate,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    #[serde(rename = "storageLocation")]
    pub storage_zone: StorageZone,
}

impl NewItem {
    pub fn fingerprint(&self) -> String {
        fingerprint_values(
            &self.name,
            self.expiry_date,
            self.quantity,
            &self.unit,
            &self.category,
            self.storage_zone,
        )
    }
}

fn fingerprint_values(
    name: &str,
    expiry_date: NaiveDate,
    quantity: f64,
    unit: &str,
    category: &str,
    zone: StorageZone,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}|{}|{}|{}|{}|{}",
        name.trim(),
        expiry_date,
        quantity,
        unit.trim(),
        category,
        zone.as_str()
    ));
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> NewItem {
        NewItem {
            name: "Milk".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            quantity: 1.0,
            unit: "bottle".to_string(),
            category: "Dairy".to_string(),
            storage_zone: StorageZone::Cold,
        }
    }

    #[test]
    fn test_item_creation_assigns_identity() {
        let added = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let a = InventoryItem::from_new(milk(), added);
        let b = InventoryItem::from_new(milk(), added);

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id, "Every item gets its own id");
        assert_eq!(a.added_date, added);
        assert_eq!(a.to_new(), milk());
    }

    #[test]
    fn test_item_json_layout() {
        let added = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let item = InventoryItem::from_new(milk(), added);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["expiryDate"], "2026-10-20");
        assert_eq!(json["storageLocation"], "COLD");
        assert_eq!(json["addedDate"], "2026-10-16");
        assert_eq!(json["quantity"], 1.0);
    }

    #[test]
    fn test_fingerprint_ignores_identity() {
        let added = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let item = InventoryItem::from_new(milk(), added);

        assert_eq!(item.fingerprint(), milk().fingerprint());
        assert_eq!(item.fingerprint().len(), 64);

        let mut other = milk();
        other.quantity = 2.0;
        assert_ne!(other.fingerprint(), milk().fingerprint());
    }
}
