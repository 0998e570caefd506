// ⚙️ App Settings - reminder window, categories, font size
//
// Stored as one JSON document. Fields missing from an older document
// fall back to their defaults when loaded (serde `default`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reminder window used when nothing is stored
pub const DEFAULT_REMINDER_DAYS: u32 = 3;

/// Categories offered on first run
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Meat", "Vegetables", "Sauces", "Dairy"];

// ============================================================================
// FONT SIZE
// ============================================================================

/// Display preference, stored and returned but never applied here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
    #[serde(rename = "xlarge")]
    XLarge,
}

impl FontSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
            FontSize::XLarge => "xlarge",
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown font size '{0}' (expected small, medium, large or xlarge)")]
pub struct ParseFontSizeError(pub String);

impl FromStr for FontSize {
    type Err = ParseFontSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(FontSize::Small),
            "medium" => Ok(FontSize::Medium),
            "large" => Ok(FontSize::Large),
            "xlarge" => Ok(FontSize::XLarge),
            _ => Err(ParseFontSizeError(s.to_string())),
        }
    }
}

// ============================================================================
// APP SETTINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Items expiring within this many days are flagged (>= 1)
    pub reminder_days: u32,

    /// Ordered, unique, non-empty names
    pub custom_categories: Vec<String>,

    /// None means "follow the system"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            reminder_days: DEFAULT_REMINDER_DAYS,
            custom_categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            font_size: None,
        }
    }
}

impl AppSettings {
    pub fn has_category(&self, name: &str) -> bool {
        self.custom_categories.iter().any(|c| c == name)
    }

    /// First configured category, used as the form default
    pub fn default_category(&self) -> Option<&str> {
        self.custom_categories.first().map(|c| c.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();

        assert_eq!(settings.reminder_days, 3);
        assert_eq!(settings.custom_categories.len(), 4);
        assert_eq!(settings.default_category(), Some("Meat"));
        assert!(settings.font_size.is_none());
    }

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"reminderDays": 7}"#).unwrap();

        assert_eq!(settings.reminder_days, 7);
        assert_eq!(settings.custom_categories, AppSettings::default().custom_categories);
    }

    #[test]
    fn test_font_size_round_trip_names() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"customCategories": ["Fruit"], "fontSize": "xlarge"}"#).unwrap();

        assert_eq!(settings.font_size, Some(FontSize::XLarge));
        assert_eq!(settings.reminder_days, DEFAULT_REMINDER_DAYS);
        assert!(settings.has_category("Fruit"));
        assert!("LARGE".parse::<FontSize>().is_ok());
        assert!("huge".parse::<FontSize>().is_err());
    }
}
