/// Convenience result type used across emblem.
pub type EmblemResult<T> = Result<T, EmblemError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum EmblemError {
    /// Invalid or out-of-range data; `field` names the offending field.
    #[error("validation error: {field}: {message}")]
    Validation {
        /// Dotted path of the rejected field (e.g. `layer.opacity`).
        field: String,
        /// Human-readable reason.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("not found: {entity} '{id}'")]
    NotFound {
        /// Entity kind (`logo`, `layer`, `asset`, ...).
        entity: &'static str,
        /// Identity that failed to resolve.
        id: String,
    },

    /// A reorder target index falls outside the dense range `[0, len)`.
    #[error("z-index {index} out of range for stack of {len}")]
    OutOfRange {
        /// Requested target index.
        index: u32,
        /// Layer count of the stack at the time of the call.
        len: usize,
    },

    /// Concurrent mutation raced and the observed state violates an invariant.
    /// Callers retry by re-reading current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The upstream media collaborator failed (upload/delete/transform).
    #[error("media error: {0}")]
    Media(String),

    /// A caller-supplied deadline expired before the work finished.
    #[error("canceled: {0}")]
    Canceled(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EmblemError {
    /// Build a [`EmblemError::Validation`] value.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a [`EmblemError::NotFound`] value.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Build a [`EmblemError::OutOfRange`] value.
    pub fn out_of_range(index: u32, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    /// Build a [`EmblemError::Conflict`] value.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Build a [`EmblemError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`EmblemError::Canceled`] value.
    pub fn canceled(msg: impl Into<String>) -> Self {
        Self::Canceled(msg.into())
    }

    /// Build a [`EmblemError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
