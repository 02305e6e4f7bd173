use uuid::Uuid;

// ============================================================================
// Storage Errors - Failures reported by persistence adapters
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Optimistic concurrency check failed
    #[error("Concurrency conflict on {entity} {id}: expected version {expected}, found {actual}")]
    VersionConflict {
        entity: &'static str,
        id: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: &'static str, id: Uuid },

    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: Uuid },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. } | StoreError::AlreadyExists { .. })
    }
}
