//! Domain error taxonomy.
//!
//! Every lifecycle operation validates its preconditions eagerly and fails
//! fast with the most specific kind. The HTTP layer maps these onto status
//! codes in `server::error`.

use std::fmt;

/// Result alias used across the store and service layers
pub type Result<T> = std::result::Result<T, Error>;

/// Classified failure of a store or lifecycle operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity is absent (404-equivalent)
    #[error("{resource} not found with id: {id}")]
    NotFound {
        /// Kind of entity that was looked up
        resource: &'static str,
        /// Identifier that missed
        id: String,
    },

    /// Malformed input: bad enum value, non-positive quantity, negative
    /// price (400-equivalent)
    #[error("{0}")]
    InvalidArgument(String),

    /// Valid request against the wrong lifecycle state (409-equivalent)
    #[error("{0}")]
    InvalidState(String),

    /// The request lost to a competing claim: insufficient inventory,
    /// duplicate order for a booking, reference collision (409-equivalent)
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure, e.g. the storage backend (500-equivalent)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Builds a [`Error::NotFound`] for the given resource and id
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// True if this error is a [`Error::NotFound`]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(format!("database error: {err}"))
    }
}
