use thiserror::Error;

/// Failures surfaced by the person store. Callers match on the variant to
/// tell a missing row apart from a storage problem.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Person {0} not found")]
    NotFound(i64),
    #[error("Person already has id {0}; use update instead")]
    AlreadyPersisted(i64),
    #[error("Person has no id; add it before updating")]
    MissingId,
    #[error("Field `{0}` is required")]
    MissingField(&'static str),
}

impl StoreError {
    /// True for the not-found signal shared by get, update and delete.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
