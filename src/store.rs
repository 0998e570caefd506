// 🧊 Inventory Store - items + settings, mirrored to local storage
//
// Every mutation:
//   1. builds the next collection
//   2. writes it whole under its key (so a failed write changes nothing)
//   3. swaps it in, appends an audit event, notifies subscribers

use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::db::{self, Event, ITEMS_KEY, SETTINGS_KEY};
use crate::entities::{AppSettings, FontSize, InventoryItem, NewItem, StorageZone};
use crate::error::{InventoryError, Result};
use crate::form::FieldError;

/// Notification sent after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Items,
    Settings,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
    /// Categories appended because imported items referenced them
    pub new_categories: Vec<String>,
}

/// One item to import. `added_date` of None means today.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDraft {
    pub item: NewItem,
    pub added_date: Option<NaiveDate>,
}

impl From<NewItem> for ImportDraft {
    fn from(item: NewItem) -> Self {
        ImportDraft {
            item,
            added_date: None,
        }
    }
}

pub struct InventoryStore {
    conn: Connection,
    items: Vec<InventoryItem>,
    settings: AppSettings,
    subscribers: Vec<Sender<StoreChange>>,
    actor: String,
}

impl InventoryStore {
    /// Prepare the schema and load both collections.
    /// Missing keys mean an empty item list and default settings.
    pub fn open(conn: Connection) -> Result<Self> {
        db::setup_database(&conn)?;

        let items: Vec<InventoryItem> = match db::kv_get(&conn, ITEMS_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        // serde(default) on AppSettings merges the stored fields over the defaults
        let settings: AppSettings = match db::kv_get(&conn, SETTINGS_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => AppSettings::default(),
        };

        debug!(
            items = items.len(),
            categories = settings.custom_categories.len(),
            "inventory loaded"
        );

        Ok(InventoryStore {
            conn,
            items,
            settings,
            subscribers: Vec::new(),
            actor: "user".to_string(),
        })
    }

    /// Open (creating if needed) a database file, including parent directories
    pub fn open_path(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        let store = Self::open(conn)?;

        info!(path = %path.display(), "inventory database opened");
        Ok(store)
    }

    /// Name recorded as the actor of audit events (cli, tui, api, ...)
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = actor.to_string();
        self
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn find_item(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items kept in `zone`, in collection order
    pub fn items_by_zone(&self, zone: StorageZone) -> Vec<InventoryItem> {
        self.items
            .iter()
            .filter(|item| item.storage_zone == zone)
            .cloned()
            .collect()
    }

    pub fn has_category_inventory(&self, category: &str) -> bool {
        self.items.iter().any(|item| item.category == category)
    }

    /// Unused and not the last remaining category
    pub fn can_delete_category(&self, category: &str) -> bool {
        !self.has_category_inventory(category) && self.settings.custom_categories.len() > 1
    }

    /// Audit events for one entity, newest first
    pub fn history(&self, entity_type: &str, entity_id: &str) -> Result<Vec<Event>> {
        db::get_events_for_entity(&self.conn, entity_type, entity_id)
    }

    /// Receive a `StoreChange` after every successful mutation.
    /// Dropped receivers are pruned on the next notification.
    pub fn subscribe(&mut self) -> Receiver<StoreChange> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    // ========================================================================
    // ITEM CRUD
    // ========================================================================

    /// Add with a fresh id and today's date
    pub fn add_item(&mut self, new_item: NewItem) -> Result<InventoryItem> {
        self.add_item_on(new_item, Local::now().date_naive())
    }

    /// Add with an explicit added date
    pub fn add_item_on(&mut self, new_item: NewItem, added_date: NaiveDate) -> Result<InventoryItem> {
        check_values(&new_item.name, new_item.quantity)?;
        let item = InventoryItem::from_new(new_item, added_date);

        let mut next = self.items.clone();
        next.push(item.clone());
        self.commit_items(next)?;

        info!(id = %item.id, name = %item.name, zone = %item.storage_zone, "item added");
        self.record(
            "item_added",
            "item",
            &item.id,
            serde_json::json!({
                "name": item.name,
                "expiryDate": item.expiry_date,
                "storageLocation": item.storage_zone,
            }),
        );

        Ok(item)
    }

    /// Replace the stored item with the same id.
    /// The stored id and added date win over whatever the caller passed.
    pub fn update_item(&mut self, updated: InventoryItem) -> Result<InventoryItem> {
        check_values(&updated.name, updated.quantity)?;
        let index = match self.items.iter().position(|item| item.id == updated.id) {
            Some(index) => index,
            None => {
                warn!(id = %updated.id, "update rejected: item not found");
                return Err(InventoryError::ItemNotFound(updated.id));
            }
        };

        let stored = InventoryItem {
            added_date: self.items[index].added_date,
            ..updated
        };

        let mut next = self.items.clone();
        next[index] = stored.clone();
        self.commit_items(next)?;

        info!(id = %stored.id, name = %stored.name, "item updated");
        self.record(
            "item_updated",
            "item",
            &stored.id,
            serde_json::to_value(&stored).unwrap_or_default(),
        );

        Ok(stored)
    }

    /// Remove exactly `id`. Returns false when nothing matched.
    pub fn delete_item(&mut self, id: &str) -> Result<bool> {
        Ok(self.delete_items(&[id.to_string()])? == 1)
    }

    /// Remove every listed id; returns how many were removed
    pub fn delete_items(&mut self, ids: &[String]) -> Result<usize> {
        let doomed: HashSet<&str> = ids.iter().map(|id| id.as_str()).collect();

        let (removed, kept): (Vec<InventoryItem>, Vec<InventoryItem>) = self
            .items
            .iter()
            .cloned()
            .partition(|item| doomed.contains(item.id.as_str()));

        if removed.is_empty() {
            debug!(requested = ids.len(), "delete matched no items");
            return Ok(0);
        }

        self.commit_items(kept)?;

        info!(removed = removed.len(), "items deleted");
        for item in &removed {
            self.record(
                "item_deleted",
                "item",
                &item.id,
                serde_json::json!({ "name": item.name }),
            );
        }

        Ok(removed.len())
    }

    /// Add every draft whose fingerprint isn't already stored.
    /// Categories the drafts reference but settings lack are appended.
    /// Items and settings are written in one transaction.
    pub fn import_items(&mut self, drafts: Vec<ImportDraft>) -> Result<ImportSummary> {
        let mut seen: HashSet<String> = self.items.iter().map(|item| item.fingerprint()).collect();
        let today = Local::now().date_naive();

        let mut summary = ImportSummary::default();
        let mut next_items = self.items.clone();
        let mut next_settings = self.settings.clone();

        for draft in drafts {
            check_values(&draft.item.name, draft.item.quantity)?;

            if !seen.insert(draft.item.fingerprint()) {
                summary.duplicates += 1;
                continue;
            }

            if !next_settings.has_category(&draft.item.category) {
                next_settings.custom_categories.push(draft.item.category.clone());
                summary.new_categories.push(draft.item.category.clone());
            }

            let added_date = draft.added_date.unwrap_or(today);
            next_items.push(InventoryItem::from_new(draft.item, added_date));
            summary.imported += 1;
        }

        let items_changed = summary.imported > 0;
        let settings_changed = !summary.new_categories.is_empty();

        if items_changed || settings_changed {
            let tx = self.conn.unchecked_transaction()?;
            if settings_changed {
                db::kv_set(&tx, SETTINGS_KEY, &serde_json::to_string(&next_settings)?)?;
            }
            if items_changed {
                db::kv_set(&tx, ITEMS_KEY, &serde_json::to_string(&next_items)?)?;
            }
            tx.commit()?;
        }

        if settings_changed {
            self.settings = next_settings;
            self.notify(StoreChange::Settings);
        }
        if items_changed {
            self.items = next_items;
            self.notify(StoreChange::Items);
        }

        info!(
            imported = summary.imported,
            duplicates = summary.duplicates,
            "items imported"
        );
        self.record(
            "items_imported",
            "inventory",
            "all",
            serde_json::to_value(&summary).unwrap_or_default(),
        );

        Ok(summary)
    }

    // ========================================================================
    // SETTINGS
    // ========================================================================

    /// Values below 1 are stored as 1. Returns the stored value.
    pub fn update_reminder_days(&mut self, days: i64) -> Result<u32> {
        let days = days.clamp(1, i64::from(u32::MAX)) as u32;

        let mut next = self.settings.clone();
        next.reminder_days = days;
        self.commit_settings(next)?;

        info!(days, "reminder window updated");
        self.record(
            "reminder_days_updated",
            "settings",
            "app",
            serde_json::json!({ "reminderDays": days }),
        );

        Ok(days)
    }

    pub fn set_font_size(&mut self, font_size: Option<FontSize>) -> Result<()> {
        let mut next = self.settings.clone();
        next.font_size = font_size;
        self.commit_settings(next)?;

        info!(font_size = ?font_size, "font size updated");
        self.record(
            "font_size_updated",
            "settings",
            "app",
            serde_json::json!({ "fontSize": font_size }),
        );

        Ok(())
    }

    /// Append a trimmed category name.
    /// Returns false (and writes nothing) when it is already present.
    pub fn add_category(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::EmptyCategory);
        }
        if self.settings.has_category(name) {
            debug!(category = name, "category already present");
            return Ok(false);
        }

        let mut next = self.settings.clone();
        next.custom_categories.push(name.to_string());
        self.commit_settings(next)?;

        info!(category = name, "category added");
        self.record("category_added", "category", name, serde_json::json!({}));

        Ok(true)
    }

    /// Remove a category that is neither in use nor the last one
    pub fn delete_category(&mut self, name: &str) -> Result<()> {
        if !self.settings.has_category(name) {
            return Err(InventoryError::CategoryNotFound(name.to_string()));
        }
        if self.has_category_inventory(name) {
            warn!(category = name, "delete rejected: category in use");
            return Err(InventoryError::CategoryInUse(name.to_string()));
        }
        if self.settings.custom_categories.len() <= 1 {
            warn!(category = name, "delete rejected: last category");
            return Err(InventoryError::LastCategory(name.to_string()));
        }

        let mut next = self.settings.clone();
        next.custom_categories.retain(|c| c != name);
        self.commit_settings(next)?;

        info!(category = name, "category deleted");
        self.record("category_deleted", "category", name, serde_json::json!({}));

        Ok(())
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    fn commit_items(&mut self, next: Vec<InventoryItem>) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        db::kv_set(&self.conn, ITEMS_KEY, &json)?;
        self.items = next;
        self.notify(StoreChange::Items);
        Ok(())
    }

    fn commit_settings(&mut self, next: AppSettings) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        db::kv_set(&self.conn, SETTINGS_KEY, &json)?;
        self.settings = next;
        self.notify(StoreChange::Settings);
        Ok(())
    }

    fn notify(&mut self, change: StoreChange) {
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    /// Audit failures never undo a committed mutation
    fn record(&self, event_type: &str, entity_type: &str, entity_id: &str, data: serde_json::Value) {
        let event = Event::new(event_type, entity_type, entity_id, data, &self.actor);
        if let Err(e) = db::insert_event(&self.conn, &event) {
            warn!(error = %e, event_type, "failed to record audit event");
        }
    }
}

/// Store-level guard for writes that bypass the item form
fn check_values(name: &str, quantity: f64) -> Result<()> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "is required"));
    }
    if !(quantity.is_finite() && quantity > 0.0) {
        errors.push(FieldError::new("quantity", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(InventoryError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> InventoryStore {
        InventoryStore::open(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn draft(name: &str, category: &str, zone: StorageZone, expiry: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            expiry_date: NaiveDate::parse_from_str(expiry, "%Y-%m-%d").unwrap(),
            quantity: 1.0,
            unit: "pack".to_string(),
            category: category.to_string(),
            storage_zone: zone,
        }
    }

    fn stored_items(store: &InventoryStore) -> Vec<InventoryItem> {
        let json = db::kv_get(&store.conn, ITEMS_KEY).unwrap().unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_empty_store_uses_defaults() {
        let store = test_store();

        assert!(store.items().is_empty());
        assert_eq!(store.settings(), &AppSettings::default());
    }

    #[test]
    fn test_add_item_persists_immediately() {
        let mut store = test_store();
        let item = store
            .add_item(draft("Chicken", "Meat", StorageZone::Frozen, "2026-11-01"))
            .unwrap();

        assert_eq!(store.items().len(), 1);
        assert_eq!(stored_items(&store), vec![item.clone()]);
        assert_eq!(store.find_item(&item.id), Some(&item));
    }

    #[test]
    fn test_reopen_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fridge.db");

        let added = {
            let mut store = InventoryStore::open_path(&path).unwrap();
            store.update_reminder_days(5).unwrap();
            store.add_category("Fruit").unwrap();
            store
                .add_item(draft("Apple", "Fruit", StorageZone::Ambient, "2026-10-25"))
                .unwrap()
        };

        let store = InventoryStore::open_path(&path).unwrap();
        assert_eq!(store.items(), &[added]);
        assert_eq!(store.settings().reminder_days, 5);
        assert!(store.settings().has_category("Fruit"));
    }

    #[test]
    fn test_stored_settings_merge_over_defaults() {
        let conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();
        db::kv_set(&conn, SETTINGS_KEY, r#"{"reminderDays": 10}"#).unwrap();

        let store = InventoryStore::open(conn).unwrap();
        assert_eq!(store.settings().reminder_days, 10);
        assert_eq!(
            store.settings().custom_categories,
            AppSettings::default().custom_categories
        );
    }

    #[test]
    fn test_update_item_keeps_identity_and_added_date() {
        let mut store = test_store();
        let added_on = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let item = store
            .add_item_on(draft("Milk", "Dairy", StorageZone::Cold, "2026-10-20"), added_on)
            .unwrap();

        let mut changed = item.clone();
        changed.quantity = 3.0;
        changed.added_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let stored = store.update_item(changed).unwrap();

        assert_eq!(stored.quantity, 3.0);
        assert_eq!(stored.added_date, added_on);
        assert_eq!(stored_items(&store)[0].quantity, 3.0);
    }

    #[test]
    fn test_update_unknown_item_is_rejected() {
        let mut store = test_store();
        let ghost = InventoryItem::from_new(
            draft("Ghost", "Meat", StorageZone::Cold, "2026-10-20"),
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        );

        let err = store.update_item(ghost).unwrap_err();
        assert!(matches!(err, InventoryError::ItemNotFound(_)));
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_delete_removes_exactly_one_identifier() {
        let mut store = test_store();
        let a = store.add_item(draft("A", "Meat", StorageZone::Cold, "2026-10-20")).unwrap();
        let b = store.add_item(draft("B", "Meat", StorageZone::Cold, "2026-10-21")).unwrap();
        let c = store.add_item(draft("C", "Meat", StorageZone::Frozen, "2026-10-22")).unwrap();

        assert!(store.delete_item(&b.id).unwrap());
        assert!(!store.delete_item(&b.id).unwrap());

        let ids: Vec<String> = stored_items(&store).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn test_delete_items_batch() {
        let mut store = test_store();
        let a = store.add_item(draft("A", "Meat", StorageZone::Cold, "2026-10-20")).unwrap();
        let b = store.add_item(draft("B", "Meat", StorageZone::Cold, "2026-10-21")).unwrap();
        let c = store.add_item(draft("C", "Meat", StorageZone::Cold, "2026-10-22")).unwrap();

        let removed = store
            .delete_items(&[a.id.clone(), c.id.clone(), "missing".to_string()])
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.items(), &[b]);
    }

    #[test]
    fn test_items_by_zone() {
        let mut store = test_store();
        store.add_item(draft("Ice", "Meat", StorageZone::Frozen, "2027-01-01")).unwrap();
        store.add_item(draft("Milk", "Dairy", StorageZone::Cold, "2026-10-20")).unwrap();

        let frozen = store.items_by_zone(StorageZone::Frozen);
        assert_eq!(frozen.len(), 1);
        assert_eq!(frozen[0].name, "Ice");
        assert!(store.items_by_zone(StorageZone::Ambient).is_empty());
    }

    #[test]
    fn test_reminder_days_clamped_to_one() {
        let mut store = test_store();

        assert_eq!(store.update_reminder_days(0).unwrap(), 1);
        assert_eq!(store.update_reminder_days(-4).unwrap(), 1);
        assert_eq!(store.update_reminder_days(14).unwrap(), 14);
        assert_eq!(store.settings().reminder_days, 14);
    }

    #[test]
    fn test_add_category_is_idempotent() {
        let mut store = test_store();

        assert!(store.add_category("  Fruit ").unwrap());
        let before = store.settings().custom_categories.clone();

        assert!(!store.add_category("Fruit").unwrap());
        assert!(!store.add_category("Fruit   ").unwrap());
        assert_eq!(store.settings().custom_categories, before);
        assert_eq!(before.last().map(String::as_str), Some("Fruit"));
    }

    #[test]
    fn test_add_blank_category_is_rejected() {
        let mut store = test_store();
        assert!(matches!(
            store.add_category("   "),
            Err(InventoryError::EmptyCategory)
        ));
    }

    #[test]
    fn test_delete_category_rules() {
        let mut store = test_store();
        store.add_item(draft("Steak", "Meat", StorageZone::Cold, "2026-10-20")).unwrap();

        assert!(!store.can_delete_category("Meat"));
        assert!(matches!(
            store.delete_category("Meat"),
            Err(InventoryError::CategoryInUse(_))
        ));
        assert!(matches!(
            store.delete_category("Snacks"),
            Err(InventoryError::CategoryNotFound(_))
        ));

        for name in ["Vegetables", "Sauces", "Dairy"] {
            assert!(store.can_delete_category(name));
            store.delete_category(name).unwrap();
        }

        assert_eq!(store.settings().custom_categories, vec!["Meat".to_string()]);
    }

    #[test]
    fn test_last_category_cannot_be_deleted() {
        let mut store = test_store();
        for name in ["Meat", "Vegetables", "Sauces"] {
            store.delete_category(name).unwrap();
        }

        assert!(!store.can_delete_category("Dairy"));
        assert!(matches!(
            store.delete_category("Dairy"),
            Err(InventoryError::LastCategory(_))
        ));
    }

    #[test]
    fn test_subscribers_are_notified() {
        let mut store = test_store();
        let rx = store.subscribe();

        store.add_item(draft("A", "Meat", StorageZone::Cold, "2026-10-20")).unwrap();
        store.update_reminder_days(2).unwrap();
        store.add_category("Meat").unwrap(); // no-op, no notification

        let changes: Vec<StoreChange> = rx.try_iter().collect();
        assert_eq!(changes, vec![StoreChange::Items, StoreChange::Settings]);

        drop(rx);
        store.update_reminder_days(3).unwrap();
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn test_import_skips_duplicates_and_adds_categories() {
        let mut store = test_store();
        let drafts = vec![
            draft("Tofu", "Soy", StorageZone::Cold, "2026-10-19"),
            draft("Tofu", "Soy", StorageZone::Cold, "2026-10-19"),
            draft("Peas", "Vegetables", StorageZone::Frozen, "2027-02-01"),
        ];

        let drafts: Vec<ImportDraft> = drafts.into_iter().map(ImportDraft::from).collect();

        let first = store.import_items(drafts.clone()).unwrap();
        assert_eq!(first.imported, 2);
        assert_eq!(first.duplicates, 1);
        assert_eq!(first.new_categories, vec!["Soy".to_string()]);

        let second = store.import_items(drafts).unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates, 3);
        assert_eq!(store.items().len(), 2);
    }

    #[test]
    fn test_import_keeps_given_added_date() {
        let mut store = test_store();
        let restored = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        store
            .import_items(vec![
                ImportDraft {
                    item: draft("Peas", "Vegetables", StorageZone::Frozen, "2027-02-01"),
                    added_date: Some(restored),
                },
                draft("Milk", "Dairy", StorageZone::Cold, "2026-10-20").into(),
            ])
            .unwrap();

        assert_eq!(store.items()[0].added_date, restored);
        assert_eq!(store.items()[1].added_date, Local::now().date_naive());
    }

    #[test]
    fn test_store_rejects_non_positive_quantity_and_blank_name() {
        let mut store = test_store();

        let mut zero = draft("Milk", "Dairy", StorageZone::Cold, "2026-10-20");
        zero.quantity = 0.0;
        assert!(matches!(store.add_item(zero), Err(InventoryError::Validation(_))));

        let blank = draft("  ", "Dairy", StorageZone::Cold, "2026-10-20");
        assert!(matches!(
            store.import_items(vec![blank.into()]),
            Err(InventoryError::Validation(_))
        ));

        let item = store.add_item(draft("Milk", "Dairy", StorageZone::Cold, "2026-10-20")).unwrap();
        let mut negative = item.clone();
        negative.quantity = -1.0;
        assert!(matches!(store.update_item(negative), Err(InventoryError::Validation(_))));
        assert_eq!(store.items(), &[item]);
    }

    // ------------------------------------------------------------------------
    // Failed writes
    // ------------------------------------------------------------------------

    /// Make every write to `key` fail
    fn block_writes(store: &InventoryStore, key: &str) {
        store
            .conn
            .execute_batch(&format!(
                "CREATE TRIGGER block_insert BEFORE INSERT ON kv_store WHEN NEW.key = '{key}'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;
                 CREATE TRIGGER block_update BEFORE UPDATE ON kv_store WHEN NEW.key = '{key}'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;"
            ))
            .unwrap();
    }

    #[test]
    fn test_failed_add_leaves_items_untouched() {
        let mut store = test_store();
        let rx = store.subscribe();
        block_writes(&store, ITEMS_KEY);

        let err = store
            .add_item(draft("Milk", "Dairy", StorageZone::Cold, "2026-10-20"))
            .unwrap_err();

        assert!(matches!(err, InventoryError::Storage(_)));
        assert!(store.items().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_delete_leaves_items_untouched() {
        let mut store = test_store();
        let a = store.add_item(draft("A", "Meat", StorageZone::Cold, "2026-10-20")).unwrap();
        let b = store.add_item(draft("B", "Meat", StorageZone::Cold, "2026-10-21")).unwrap();
        block_writes(&store, ITEMS_KEY);

        assert!(store.delete_items(&[a.id.clone()]).is_err());
        assert_eq!(store.items(), &[a, b]);
    }

    #[test]
    fn test_failed_category_add_leaves_settings_untouched() {
        let mut store = test_store();
        block_writes(&store, SETTINGS_KEY);

        assert!(store.add_category("Fruit").is_err());
        assert_eq!(store.settings(), &AppSettings::default());
    }

    #[test]
    fn test_failed_import_applies_nothing() {
        let mut store = test_store();
        block_writes(&store, ITEMS_KEY);

        let result = store.import_items(vec![draft("Tofu", "Soy", StorageZone::Cold, "2026-10-19").into()]);

        assert!(matches!(result, Err(InventoryError::Storage(_))));
        assert!(store.items().is_empty());
        assert_eq!(store.settings(), &AppSettings::default());
        assert_eq!(db::kv_get(&store.conn, SETTINGS_KEY).unwrap(), None);
    }

    #[test]
    fn test_history_records_mutations() {
        let mut store = test_store().with_actor("test");
        let item = store.add_item(draft("A", "Meat", StorageZone::Cold, "2026-10-20")).unwrap();
        store.delete_item(&item.id).unwrap();

        let events = store.history("item", &item.id).unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();

        assert_eq!(events.len(), 2);
        assert!(types.contains(&"item_added"));
        assert!(types.contains(&"item_deleted"));
        assert!(events.iter().all(|e| e.actor == "test"));
    }
}
