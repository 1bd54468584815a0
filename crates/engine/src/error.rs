use chamba_core::error::CoreError;
use chamba_core::types::DbId;

/// Postgres `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// Postgres `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// Postgres `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// Failure of a marketplace operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EngineError {
    /// Whether the database refused the transaction because of contention
    /// with another one (lock timeout, serialization failure, deadlock).
    pub fn is_contention(&self) -> bool {
        match self {
            EngineError::Core(err) => err.is_retryable(),
            EngineError::Database(err) => err
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| {
                    matches!(
                        code.as_ref(),
                        LOCK_NOT_AVAILABLE | SERIALIZATION_FAILURE | DEADLOCK_DETECTED
                    )
                }),
        }
    }

    /// Report contention as [`CoreError::ConcurrentModification`] on the
    /// operation's target. Other errors pass through unchanged.
    pub fn on_target(self, entity: &'static str, id: DbId) -> Self {
        if self.is_contention() {
            EngineError::Core(CoreError::ConcurrentModification { entity, id })
        } else {
            self
        }
    }

    /// Whether a unique constraint named `constraint` rejected the write.
    pub fn violates(&self, constraint: &str) -> bool {
        match self {
            EngineError::Database(err) => err
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation() && db.constraint() == Some(constraint)),
            EngineError::Core(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn concurrent_modification_is_contention() {
        let err = EngineError::from(CoreError::ConcurrentModification {
            entity: "service_request",
            id: 1,
        });
        assert!(err.is_contention());
    }

    #[test]
    fn domain_errors_are_not_contention() {
        let err = EngineError::from(CoreError::AlreadyAccepted { request_id: 1 });
        assert!(!err.is_contention());
        assert_matches!(
            err.on_target("service_request", 1),
            EngineError::Core(CoreError::AlreadyAccepted { request_id: 1 })
        );
    }

    #[test]
    fn non_database_sqlx_errors_pass_through() {
        let err = EngineError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_contention());
        assert!(!err.violates("uq_proposals_request_worker"));
        assert_matches!(
            err.on_target("service_request", 3),
            EngineError::Database(sqlx::Error::RowNotFound)
        );
    }

    #[test]
    fn contention_is_reported_on_target() {
        let err = EngineError::from(CoreError::ConcurrentModification {
            entity: "transaction",
            id: 0,
        });
        assert_matches!(
            err.on_target("service_request", 9),
            EngineError::Core(CoreError::ConcurrentModification {
                entity: "service_request",
                id: 9
            })
        );
    }
}
