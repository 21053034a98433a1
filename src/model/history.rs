//! History: the append-only audit trail of everything that happened to a booking.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BookingStatus, Role};

/// One recorded change to a booking.
///
/// `from` is `None` for the entry written when the booking is created.
/// Check-ins that do not move the status record the same status on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub booking_id: Uuid,
    pub actor_id: String,
    pub role: Role,
    pub from: Option<BookingStatus>,
    pub to: BookingStatus,
    pub note: Option<String>,
    pub at: Timestamp,
}
