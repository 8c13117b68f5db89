//! Error types for the discovery and matchmaking engine
//!
//! Engine functions return [`DiscoveryError`] directly so callers can match on
//! the taxonomy. Service and binary plumbing uses the anyhow-based [`Result`].

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific discovery scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Invalid rating observation for {entity_id}: value {value} is outside 1..=5")]
    InvalidObservation { entity_id: String, value: i64 },

    #[error("Invalid filter: {reason}")]
    InvalidFilterSpec { reason: String },

    #[error("Invalid catalog item {item_id}: {reason}")]
    InvalidCatalogItem { item_id: String, reason: String },

    #[error("Catalog item is full: {item_id}")]
    ItemFull { item_id: String },

    #[error("Entity not found: {entity_id}")]
    EntityNotFound { entity_id: String },

    #[error("Unknown catalog kind: {kind}")]
    UnknownCatalogKind { kind: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Repository error: {message}")]
    RepositoryError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl DiscoveryError {
    /// Shorthand for a filter validation failure
    pub fn invalid_filter(reason: impl Into<String>) -> Self {
        Self::InvalidFilterSpec {
            reason: reason.into(),
        }
    }

    /// True for errors caused by caller input rather than the service itself
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidObservation { .. }
                | Self::InvalidFilterSpec { .. }
                | Self::InvalidCatalogItem { .. }
                | Self::ItemFull { .. }
                | Self::EntityNotFound { .. }
                | Self::UnknownCatalogKind { .. }
        )
    }
}
