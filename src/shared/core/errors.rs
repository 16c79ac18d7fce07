use crate::shared::infrastructure::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    UnknownReference(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{entity} {field} '{value}' already exists.")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{0}")]
    InUse(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApplicationError {
    /// Maps a unique violation to a conflict on the given field; any other
    /// store failure stays a store failure.
    pub fn conflict_or_store(
        error: StoreError,
        entity: &'static str,
        field: &'static str,
        value: &str,
    ) -> Self {
        match error {
            StoreError::UniqueViolation { .. } => ApplicationError::Conflict {
                entity,
                field,
                value: value.to_string(),
            },
            other => ApplicationError::Store(other),
        }
    }

    /// Like `conflict_or_store`, for rows that reference a department which
    /// may have been deleted since it was looked up.
    pub fn reference_conflict_or_store(
        error: StoreError,
        department_id: &str,
        entity: &'static str,
        field: &'static str,
        value: &str,
    ) -> Self {
        match error {
            StoreError::MissingReference { .. } => Self::unknown_department(department_id),
            other => Self::conflict_or_store(other, entity, field, value),
        }
    }

    pub fn unknown_department(raw_id: &str) -> Self {
        Self::UnknownReference(format!("Department with ID {raw_id} not found."))
    }
}
