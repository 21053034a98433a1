//! Errors surfaced by the booking engine.

use uuid::Uuid;

use crate::model::{BookingStatus, Role};
use crate::storage::StorageError;

/// Everything a booking operation can fail with.
///
/// Every variant except `Storage` is terminal: it describes the request, not the
/// moment, and retrying it cannot succeed. Contention inside `Storage` is retried
/// by the engine before it ever reaches a caller.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("booking not found: {0}")]
    NotFound(Uuid),

    #[error("experience not found: {0}")]
    ExperienceNotFound(Uuid),

    #[error("{actor} is not allowed to {action}")]
    Unauthorized { actor: String, action: String },

    #[error("cannot move booking from {from} to {to} as {role}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
        role: Role,
    },

    #[error("experience {0} has no seats left")]
    CapacityExceeded(Uuid),

    #[error("attendance is not open for booking {booking_id}: {reason}")]
    AttendanceNotOpen { booking_id: Uuid, reason: String },

    #[error("storage error: {0}")]
    Storage(StorageError),
}

pub type Result<T> = core::result::Result<T, BookingError>;

impl BookingError {
    pub(crate) fn unauthorized(actor: impl ToString, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            actor: actor.to_string(),
            action: action.into(),
        }
    }

    /// Whether the store was momentarily locked by a concurrent writer.
    pub fn is_contention(&self) -> bool {
        matches!(self, Self::Storage(StorageError::Contention(_)))
    }
}

impl From<StorageError> for BookingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BookingNotFound(id) => Self::NotFound(id),
            StorageError::ExperienceNotFound(id) => Self::ExperienceNotFound(id),
            StorageError::ExperienceFull(id) => Self::CapacityExceeded(id),
            other => Self::Storage(other),
        }
    }
}
