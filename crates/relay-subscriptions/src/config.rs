//! Registry configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RegistryResult, SubscriptionError};

/// Configuration for a [`SubscriptionRegistry`](crate::SubscriptionRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Label attached to every log event emitted by the registry.
    #[serde(default = "default_name")]
    pub name: String,
    /// Capacity reserved for each event type's bucket when it is created.
    #[serde(default)]
    pub slot_capacity: usize,
}

fn default_name() -> String {
    "default".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            slot_capacity: 0,
        }
    }
}

impl RegistryConfig {
    /// Create a config with the given registry name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the capacity reserved for new buckets.
    #[must_use]
    pub fn with_slot_capacity(mut self, slot_capacity: usize) -> Self {
        self.slot_capacity = slot_capacity;
        self
    }

    /// Parse a config from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::ConfigParse`] if the document is malformed
    /// and [`SubscriptionError::Config`] if it fails validation.
    pub fn from_toml_str(input: &str) -> RegistryResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::Config`] if `name` is blank.
    pub fn validate(&self) -> RegistryResult<()> {
        if self.name.trim().is_empty() {
            return Err(SubscriptionError::Config {
                message: "registry name must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}
