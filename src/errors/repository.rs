use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(SqlxError),

    /// Entity not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Conflict error: {0}")]
    Conflict(String),

    /// Invalid input data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// True when the store rejected a write because the key is already taken.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match err {
            SqlxError::RowNotFound => Self::NotFound("Resource not found".to_string()),
            // Map database-specific errors to more meaningful application errors
            SqlxError::Database(db_err) => {
                // PostgreSQL error codes for common constraints
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        // Unique violation
                        "23505" => {
                            let constraint = db_err.constraint().unwrap_or("links_pkey");
                            return Self::Conflict(format!(
                                "Unique constraint '{}' violated",
                                constraint
                            ));
                        }
                        // Foreign key violation
                        "23503" => {
                            return Self::InvalidData(
                                "Referenced resource does not exist".to_string(),
                            )
                        }
                        // Check constraint violation
                        "23514" => {
                            return Self::InvalidData("Data violates constraints".to_string())
                        }
                        _ => {}
                    }
                }
                Self::Database(SqlxError::Database(db_err))
            }
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = RepositoryError::from(SqlxError::RowNotFound);
        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn pool_timeout_stays_a_database_error() {
        let err = RepositoryError::from(SqlxError::PoolTimedOut);
        assert!(matches!(err, RepositoryError::Database(_)));
    }

    #[test]
    fn conflict_is_a_unique_violation() {
        assert!(RepositoryError::Conflict("links_pkey".into()).is_unique_violation());
    }
}
