// Error model for the inventory library
// Binaries wrap these in anyhow; the API maps them to status codes

use thiserror::Error;

use crate::form::FieldError;

/// Result type used across the library.
pub type Result<T> = std::result::Result<T, InventoryError>;

#[derive(Debug, Error)]
pub enum InventoryError {
    /// No item with this identifier exists in the collection.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Category name was blank after trimming.
    #[error("category name must not be empty")]
    EmptyCategory,

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// At least one item still references the category.
    #[error("category '{0}' is still used by at least one item")]
    CategoryInUse(String),

    #[error("category '{0}' is the last remaining category")]
    LastCategory(String),

    /// A quick action needs a concrete category, not "all".
    #[error("select a specific category first")]
    NoCategorySelected,

    /// Form validation failed; one entry per offending field.
    #[error("invalid item: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InventoryError {
    /// True for errors caused by the caller's input rather than storage.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            InventoryError::Storage(_) | InventoryError::Serialization(_)
        )
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = InventoryError::Validation(vec![
            FieldError::new("name", "is required"),
            FieldError::new("quantity", "must be at least 0.01"),
        ]);

        assert_eq!(
            err.to_string(),
            "invalid item: name: is required; quantity: must be at least 0.01"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn test_storage_errors_are_not_user_errors() {
        let err = InventoryError::from(rusqlite::Error::InvalidQuery);
        assert!(!err.is_user_error());
    }
}
