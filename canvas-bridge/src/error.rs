//! Error types for bridge operations.

use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while configuring or driving a connector.
///
/// Routing itself never fails: a gesture without a hit target is dropped,
/// not reported.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The builder was given neither a legacy handle nor a boundary mapper.
    #[error("No interaction handle configured")]
    MissingInteraction,

    /// Boundary mode needs a scene root to build boundaries from.
    #[error("Boundary mode requires a scene root")]
    MissingSceneRoot,

    /// The connector was destroyed and released its gesture manager.
    #[error("Connector has been destroyed")]
    Destroyed,

    /// Connector configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
