//! Controller configuration

use std::time::Duration;

use serde::Deserialize;

use crate::quantity::DEFAULT_MAX_QUANTITY;

/// How the view follows a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Patch the affected lines and totals from the response payload.
    #[default]
    Patch,

    /// Fetch the whole cart again and rebuild the view from it.
    Reload,
}

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// How the view is brought up to date after a mutation.
    pub sync: SyncMode,

    /// Idle time before a quantity edit is sent, in milliseconds.
    pub debounce_ms: u64,

    /// Duration of the removal transition, in milliseconds.
    pub removal_transition_ms: u64,

    /// Maximum quantity for lines that advertise none.
    pub default_max_quantity: u32,

    /// ISO 4217 code used to display amounts.
    pub currency: String,
}

impl ControllerConfig {
    /// Debounce window for quantity edits.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Removal transition duration.
    #[must_use]
    pub fn removal_transition(&self) -> Duration {
        Duration::from_millis(self.removal_transition_ms)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sync: SyncMode::Patch,
            debounce_ms: 500,
            removal_transition_ms: 300,
            default_max_quantity: DEFAULT_MAX_QUANTITY,
            currency: "USD".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_storefront_widgets() {
        let config = ControllerConfig::default();

        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.removal_transition(), Duration::from_millis(300));
        assert_eq!(config.default_max_quantity, 99);
        assert_eq!(config.sync, SyncMode::Patch);
    }
}
