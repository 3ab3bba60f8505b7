//! Error types for Palaam.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DatabaseError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Errors surfaced by the clinic operations to the request layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("query failed: {0}")]
    Persistence(DatabaseError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, .. } => Self::NotFound(format!("{entity} not found")),
            DatabaseError::Constraint(msg) | DatabaseError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_not_found_maps_to_not_found() {
        let err: ServiceError = DatabaseError::not_found("patient", "p1").into();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "patient not found"));
    }

    #[test]
    fn constraint_and_conflict_map_to_conflict() {
        let err: ServiceError = DatabaseError::Constraint("FOREIGN KEY constraint failed".into()).into();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err: ServiceError = DatabaseError::Conflict("overlap".into()).into();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == "overlap"));
    }

    #[test]
    fn query_failures_stay_opaque() {
        let err: ServiceError = DatabaseError::Query("disk I/O error".into()).into();
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert!(err.to_string().starts_with("query failed"));
    }
}
