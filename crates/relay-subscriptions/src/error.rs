//! Registry error types.

use thiserror::Error;

use crate::registry::RegistryId;

/// Errors raised by subscription registry operations.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The subscription was constructed against a different registry.
    #[error("subscription owner mismatch: expected registry {expected}, found {}", display_owner(.actual))]
    OwnershipMismatch {
        /// Registry performing the add.
        expected: RegistryId,
        /// Registry recorded on the handle, `None` once the handle was removed.
        actual: Option<RegistryId>,
    },

    /// The handle already holds a slot and cannot be registered again.
    #[error("subscription already registered as '{event_type}'[{slot_key}]")]
    AlreadyRegistered {
        /// Event type the handle is bound to.
        event_type: String,
        /// Slot the handle occupies.
        slot_key: usize,
    },

    /// Configuration validation failed.
    #[error("Configuration error: {message}")]
    Config {
        /// Validation failure description.
        message: String,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse registry config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

#[allow(clippy::ref_option)]
fn display_owner(owner: &Option<RegistryId>) -> String {
    owner.map_or_else(|| "<removed>".to_owned(), |id| id.to_string())
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, SubscriptionError>;
