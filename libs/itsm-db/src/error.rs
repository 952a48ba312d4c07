use std::fmt;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Which constraint a write tripped over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign key",
        })
    }
}

/// Errors returned by every repository operation.
///
/// The raw driver error stays attached as `source` for `Transient` and
/// `Storage`; constraint violations keep only the driver message.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{kind} constraint violated in {op}: {message}")]
    ConstraintViolation {
        op: &'static str,
        kind: ConstraintKind,
        message: String,
    },

    #[error("transient database failure in {op}")]
    Transient {
        op: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("invalid {field}: {message}")]
    MalformedInput {
        field: &'static str,
        message: String,
    },

    #[error("storage failure in {op}")]
    Storage {
        op: &'static str,
        #[source]
        source: DbErr,
    },
}

impl RepoError {
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn malformed(field: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            field,
            message: message.into(),
        }
    }

    /// Classify a driver error raised while running `op`.
    #[must_use]
    pub fn from_db(op: &'static str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                return Self::ConstraintViolation {
                    op,
                    kind: ConstraintKind::Unique,
                    message,
                };
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                return Self::ConstraintViolation {
                    op,
                    kind: ConstraintKind::ForeignKey,
                    message,
                };
            }
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(id) => Self::NotFound { entity: op, id },
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => Self::Transient { op, source: err },
            other => Self::Storage { op, source: other },
        }
    }

    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation {
                kind: ConstraintKind::Unique,
                ..
            }
        )
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Attach an operation name to a raw `SeaORM` result.
///
/// ```ignore
/// let rows = Ticket::find().all(conn).await.op("tickets.list")?;
/// ```
pub trait DbResultExt<T> {
    /// # Errors
    /// Converts the driver error with [`RepoError::from_db`].
    fn op(self, op: &'static str) -> Result<T, RepoError>;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn op(self, op: &'static str) -> Result<T, RepoError> {
        self.map_err(|e| RepoError::from_db(op, e))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::RuntimeErr;

    use super::*;

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err = RepoError::from_db("tickets.get", DbErr::RecordNotFound("42".to_owned()));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "tickets.get not found: 42");
    }

    #[test]
    fn connection_errors_are_transient() {
        let err = RepoError::from_db(
            "tickets.list",
            DbErr::Conn(RuntimeErr::Internal("pool closed".to_owned())),
        );
        assert!(err.is_retryable());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn other_errors_are_storage() {
        let err = RepoError::from_db("assets.update", DbErr::Custom("boom".to_owned()));
        assert!(matches!(err, RepoError::Storage { op: "assets.update", .. }));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn op_extension_tags_errors() {
        let res: Result<(), DbErr> = Err(DbErr::Custom("x".to_owned()));
        match res.op("projects.create") {
            Err(RepoError::Storage { op, .. }) => assert_eq!(op, "projects.create"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
