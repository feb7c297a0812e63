//! Connector configuration.

use serde::{Deserialize, Serialize};

use crate::BridgeResult;

/// Routing and teardown policy for a [`Connector`](crate::Connector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Only hit-test the first sample of a gesture and route every later
    /// sample of the same gesture to that node.
    pub use_only_first_hit_test: bool,
    /// Destroy a gesture manager the caller supplied when the connector is
    /// destroyed. Managers the connector created itself are always destroyed.
    pub destroy_supplied_manager: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            use_only_first_hit_test: true,
            destroy_supplied_manager: true,
        }
    }
}

impl ConnectorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> BridgeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BridgeError;

    #[test]
    fn defaults_enable_first_hit_policy() {
        let config = ConnectorConfig::default();
        assert!(config.use_only_first_hit_test);
        assert!(config.destroy_supplied_manager);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ConnectorConfig::from_json(r#"{"use_only_first_hit_test": false}"#)
            .expect("should parse");
        assert!(!config.use_only_first_hit_test);
        assert!(config.destroy_supplied_manager);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = ConnectorConfig::from_json("{ nope }");
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }
}
