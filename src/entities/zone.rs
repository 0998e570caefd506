// Storage Zone - where a physical item is kept
//
// Three fixed zones, shown as tabs in every front end.
// Serialized as COLD / FROZEN / AMBIENT so stored documents stay compatible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum StorageZone {
    /// Refrigerated
    #[default]
    Cold,

    /// Freezer
    Frozen,

    /// Room temperature (pantry, shelf)
    Ambient,
}

impl StorageZone {
    /// All zones in tab order
    pub const ALL: [StorageZone; 3] = [StorageZone::Cold, StorageZone::Frozen, StorageZone::Ambient];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageZone::Cold => "COLD",
            StorageZone::Frozen => "FROZEN",
            StorageZone::Ambient => "AMBIENT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageZone::Cold => "Cold",
            StorageZone::Frozen => "Frozen",
            StorageZone::Ambient => "Ambient",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StorageZone::Cold => "❄️",
            StorageZone::Frozen => "🧊",
            StorageZone::Ambient => "🌡️",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            StorageZone::Cold => StorageZone::Frozen,
            StorageZone::Frozen => StorageZone::Ambient,
            StorageZone::Ambient => StorageZone::Cold,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            StorageZone::Cold => StorageZone::Ambient,
            StorageZone::Frozen => StorageZone::Cold,
            StorageZone::Ambient => StorageZone::Frozen,
        }
    }
}

impl fmt::Display for StorageZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known zone
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown storage zone '{0}' (expected cold, frozen or ambient)")]
pub struct ParseZoneError(pub String);

impl FromStr for StorageZone {
    type Err = ParseZoneError;

    /// Accepts the stored form (`COLD`) and the label (`cold`, `Cold`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COLD" => Ok(StorageZone::Cold),
            "FROZEN" => Ok(StorageZone::Frozen),
            "AMBIENT" => Ok(StorageZone::Ambient),
            _ => Err(ParseZoneError(s.to_string())),
        }
    }
}
