use thiserror::Error;

/// Errors from repository operations (used by trait definitions in nebula-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_display_includes_detail() {
        let err = RepositoryError::Query("disk I/O error".to_string());
        assert_eq!(err.to_string(), "query error: disk I/O error");
    }

    #[test]
    fn conflict_display_includes_key() {
        let err = RepositoryError::Conflict("chat 'abc' already exists".to_string());
        assert!(err.to_string().contains("abc"));
    }
}
