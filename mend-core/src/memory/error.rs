//! Error types for learned-fix memory.

use thiserror::Error;

/// Errors from fix storage and the remote context service.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The remote context service is unreachable or answered unusably.
    /// Recovery is degrading to local-only storage, not failing resolution.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// A storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Failed to read or write the persisted context id.
    #[error("Context id error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_unavailable_displays_cause() {
        let err = MemoryError::PersistenceUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("Persistence unavailable"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MemoryError = io.into();
        assert!(matches!(err, MemoryError::Io(_)));
    }
}
