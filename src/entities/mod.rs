// Entity Models
//
// InventoryItem: identity (id) + editable values
// AppSettings: single settings document
// StorageZone: the three fixed places an item can live

pub mod item;
pub mod settings;
pub mod zone;

pub use item::{InventoryItem, NewItem};
pub use settings::{AppSettings, FontSize, DEFAULT_CATEGORIES, DEFAULT_REMINDER_DAYS};
pub use zone::StorageZone;
