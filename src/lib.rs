// Fridge Manager - Core Library
// Exposes all modules for use in the CLI, the TUI, the API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod form;
pub mod logging;
pub mod store;
pub mod transfer;
pub mod view;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use db::{
    Event, ITEMS_KEY, SETTINGS_KEY,
    setup_database, kv_get, kv_set, kv_remove,
    insert_event, get_events_for_entity,
};
pub use entities::{
    AppSettings, FontSize, InventoryItem, NewItem, StorageZone,
    DEFAULT_CATEGORIES, DEFAULT_REMINDER_DAYS,
};
pub use error::{InventoryError, Result};
pub use form::{FieldError, ItemForm};
pub use store::{ImportDraft, ImportSummary, InventoryStore, StoreChange};
pub use view::{
    CategoryFilter, ItemRow, ListView, SortKey, ZoneSummary,
    days_between, is_expired, is_near_expiry, zone_summaries,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
