// 👀 List View - zone tab, category filter, sort key, batch selection
//
// Pure state + functions over an item slice. Front ends own a ListView and
// ask it for rows whenever the store changes. Nothing here touches storage;
// batch actions return ids for the caller to delete after confirmation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::entities::{InventoryItem, StorageZone};
use crate::error::{InventoryError, Result};

// ============================================================================
// EXPIRY MATH
// ============================================================================

/// Signed whole days from `today` to `date` (negative once expired)
pub fn days_between(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Expires within the reminder window; already-expired items count too
pub fn is_near_expiry(item: &InventoryItem, reminder_days: u32, today: NaiveDate) -> bool {
    days_between(today, item.expiry_date) <= i64::from(reminder_days)
}

pub fn is_expired(item: &InventoryItem, today: NaiveDate) -> bool {
    item.expiry_date < today
}

// ============================================================================
// SORT + FILTER KEYS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Soonest expiry first
    #[default]
    ExpiryDate,
    /// Most recently added first
    AddedDate,
}

impl SortKey {
    pub fn toggle(&self) -> Self {
        match self {
            SortKey::ExpiryDate => SortKey::AddedDate,
            SortKey::AddedDate => SortKey::ExpiryDate,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::ExpiryDate => "expiry date",
            SortKey::AddedDate => "date added",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "expirydate" | "expiry" => Ok(SortKey::ExpiryDate),
            "addeddate" | "added" => Ok(SortKey::AddedDate),
            _ => Err(format!("unknown sort key '{}' (expected expiry or added)", s)),
        }
    }
}

/// Filter value meaning "every category"
pub const ALL_CATEGORIES: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// `None`, empty or "ALL" mean no filter
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") => CategoryFilter::All,
            Some(ALL_CATEGORIES) => CategoryFilter::All,
            Some(name) => CategoryFilter::Only(name.to_string()),
        }
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => &item.category == name,
        }
    }

    /// Step through ALL -> each category -> ALL
    pub fn cycle(&self, categories: &[String]) -> Self {
        match self {
            CategoryFilter::All => categories
                .first()
                .map(|c| CategoryFilter::Only(c.clone()))
                .unwrap_or(CategoryFilter::All),
            CategoryFilter::Only(current) => {
                match categories.iter().position(|c| c == current) {
                    Some(i) if i + 1 < categories.len() => CategoryFilter::Only(categories[i + 1].clone()),
                    _ => CategoryFilter::All,
                }
            }
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_CATEGORIES),
            CategoryFilter::Only(name) => f.write_str(name),
        }
    }
}

// ============================================================================
// ROWS
// ============================================================================

/// One visible item plus its computed expiry flags
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub is_warning: bool,
    pub is_expired: bool,
    pub days_left: i64,
}

impl ItemRow {
    pub fn new(item: InventoryItem, reminder_days: u32, today: NaiveDate) -> Self {
        ItemRow {
            is_warning: is_near_expiry(&item, reminder_days, today),
            is_expired: is_expired(&item, today),
            days_left: days_between(today, item.expiry_date),
            item,
        }
    }
}

/// Filter by zone and category, then sort. `sort_by` is stable, so ties keep
/// collection order.
pub fn filter_and_sort(
    items: &[InventoryItem],
    zone: StorageZone,
    category: &CategoryFilter,
    sort_key: SortKey,
) -> Vec<InventoryItem> {
    let mut filtered: Vec<InventoryItem> = items
        .iter()
        .filter(|item| item.storage_zone == zone && category.matches(item))
        .cloned()
        .collect();

    match sort_key {
        SortKey::ExpiryDate => filtered.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date)),
        SortKey::AddedDate => filtered.sort_by(|a, b| b.added_date.cmp(&a.added_date)),
    }

    filtered
}

/// Per-zone counts for tab badges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    pub zone: StorageZone,
    pub label: String,
    pub total: usize,
    pub near_expiry: usize,
    pub expired: usize,
}

pub fn zone_summaries(items: &[InventoryItem], reminder_days: u32, today: NaiveDate) -> Vec<ZoneSummary> {
    StorageZone::ALL
        .iter()
        .map(|&zone| {
            let in_zone: Vec<&InventoryItem> = items.iter().filter(|i| i.storage_zone == zone).collect();
            ZoneSummary {
                zone,
                label: zone.label().to_string(),
                total: in_zone.len(),
                near_expiry: in_zone
                    .iter()
                    .filter(|i| is_near_expiry(i, reminder_days, today))
                    .count(),
                expired: in_zone.iter().filter(|i| is_expired(i, today)).count(),
            }
        })
        .collect()
}

// ============================================================================
// LIST VIEW STATE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ListView {
    zone: StorageZone,
    category: CategoryFilter,
    sort_key: SortKey,
    batch_mode: bool,
    selected: BTreeSet<String>,
}

impl ListView {
    pub fn new(zone: StorageZone) -> Self {
        ListView {
            zone,
            ..Default::default()
        }
    }

    pub fn zone(&self) -> StorageZone {
        self.zone
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn batch_mode(&self) -> bool {
        self.batch_mode
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Switching tabs starts with a clean batch state
    pub fn set_zone(&mut self, zone: StorageZone) {
        if zone != self.zone {
            self.zone = zone;
            self.batch_mode = false;
            self.selected.clear();
        }
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    /// Visible rows for the current zone, category and sort key
    pub fn rows(&self, items: &[InventoryItem], reminder_days: u32, today: NaiveDate) -> Vec<ItemRow> {
        filter_and_sort(items, self.zone, &self.category, self.sort_key)
            .into_iter()
            .map(|item| ItemRow::new(item, reminder_days, today))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Batch selection
    // ------------------------------------------------------------------------

    /// Leaving batch mode drops the selection
    pub fn toggle_batch_mode(&mut self) {
        self.batch_mode = !self.batch_mode;
        if !self.batch_mode {
            self.selected.clear();
        }
    }

    pub fn toggle_selection(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// All visible rows selected -> clear; otherwise select exactly the visible rows
    pub fn toggle_select_all(&mut self, rows: &[ItemRow]) {
        let all_selected = !rows.is_empty()
            && self.selected.len() == rows.len()
            && rows.iter().all(|row| self.selected.contains(&row.item.id));

        self.selected.clear();
        if !all_selected {
            self.selected
                .extend(rows.iter().map(|row| row.item.id.clone()));
        }
    }

    /// Ids to delete, or None when nothing is selected.
    /// Taking the batch resets the selection and leaves batch mode.
    pub fn take_batch(&mut self) -> Option<Vec<String>> {
        if self.selected.is_empty() {
            return None;
        }

        let ids: Vec<String> = std::mem::take(&mut self.selected).into_iter().collect();
        self.batch_mode = false;
        Some(ids)
    }

    // ------------------------------------------------------------------------
    // Quick actions
    // ------------------------------------------------------------------------

    /// Expired rows among the currently visible ones
    pub fn expired_rows<'a>(&self, rows: &'a [ItemRow]) -> Vec<&'a ItemRow> {
        rows.iter().filter(|row| row.is_expired).collect()
    }

    /// Every visible row of the selected category
    pub fn category_rows<'a>(&self, rows: &'a [ItemRow]) -> Result<Vec<&'a ItemRow>> {
        match &self.category {
            CategoryFilter::All => Err(InventoryError::NoCategorySelected),
            CategoryFilter::Only(name) => Ok(rows.iter().filter(|row| &row.item.category == name).collect()),
        }
    }
}

/// Ids of the given rows, in row order
pub fn row_ids(rows: &[&ItemRow]) -> Vec<String> {
    rows.iter().map(|row| row.item.id.clone()).collect()
}
