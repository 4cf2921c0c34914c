/// Core error types for the bundlescope layout model.

/// A specialized Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Top-level error type for layout construction and loading.
///
/// A lookup miss is not an error anywhere in this crate family: index and
/// query operations return `Option` instead.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A construction operation would violate a key constraint: a duplicate
    /// bundle name, file name, asset guid or group id, an id that does not
    /// belong to the layout under construction, or an illegal edge such as
    /// a bundle depending on itself.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A construction operation was attempted after `finalize()`.
    #[error("model is frozen: construction is not permitted after finalize")]
    FrozenModel,

    /// A serialized reference key did not resolve to any entity during load.
    #[error("dangling reference: {entity} field `{field}` -> '{key}'")]
    DanglingReference {
        entity: String,
        field: &'static str,
        key: String,
    },

    /// A structural invariant does not hold in an already-built layout.
    /// Only produced by the post-hoc audit, never by a conforming builder.
    #[error("structural inconsistency: {0}")]
    Inconsistent(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LayoutError {
    /// Create an `InvalidKey` error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        LayoutError::InvalidKey(message.into())
    }

    /// Create a `DanglingReference` error for a reference field of `entity`.
    pub fn dangling(
        entity: impl Into<String>,
        field: &'static str,
        key: impl Into<String>,
    ) -> Self {
        LayoutError::DanglingReference {
            entity: entity.into(),
            field,
            key: key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let err = LayoutError::invalid_key("duplicate bundle name 'shared'");
        assert_eq!(err.to_string(), "invalid key: duplicate bundle name 'shared'");
    }

    #[test]
    fn test_dangling_display() {
        let err = LayoutError::dangling("bundleA", "dependencies", "missing");
        assert_eq!(
            err.to_string(),
            "dangling reference: bundleA field `dependencies` -> 'missing'"
        );
    }

    #[test]
    fn test_frozen_display() {
        assert!(LayoutError::FrozenModel.to_string().contains("frozen"));
    }
}
