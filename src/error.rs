use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failures surfaced by the record store and the rotation workflow.
///
/// A bad person id submitted to the assignment action is not an error; it
/// yields the `dashboard` destination instead (see `rotation::assignment`).
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("person {id} not found")]
    PersonNotFound { id: i32 },

    #[error("dinner {id} not found")]
    DinnerNotFound { id: i32 },

    #[error("person {id} hosts {hosted} dinner(s) and cannot be deleted")]
    HostInUse { id: i32, hosted: u64 },

    #[error("person {person_id} already has attendance recorded for dinner {dinner_id}")]
    DuplicateAttendance { dinner_id: i32, person_id: i32 },

    #[error("a placeholder dinner already exists")]
    PlaceholderExists,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store error: {0}")]
    Store(#[from] DbErr),
}

pub type RotationResult<T> = Result<T, RotationError>;

impl RotationError {
    /// Constraint rejections that callers must not swallow.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            RotationError::HostInUse { .. }
                | RotationError::DuplicateAttendance { .. }
                | RotationError::PlaceholderExists
        )
    }
}

/// True when the store rejected a write because of a UNIQUE index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// True when the store rejected a write because of a FOREIGN KEY constraint.
pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
