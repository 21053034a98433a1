//! Experience types: a scheduled volunteering opportunity with a fixed number of seats.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A volunteering opportunity offered by a host organisation.
///
/// `current_bookings` counts seats held by bookings that have not been
/// rejected or cancelled. It only ever moves through the seat ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub ngo_id: String,
    pub title: String,
    pub capacity: u32,
    pub current_bookings: u32,

    /// When the experience is over and attendance can be attested.
    pub ends_at: Timestamp,

    /// Whether new bookings need platform pre-screening before reaching the host.
    pub requires_admin_review: bool,

    pub created_at: Timestamp,
}

/// What it takes to list a new experience.
#[derive(Debug, Clone)]
pub struct NewExperience {
    pub ngo_id: String,
    pub title: String,
    pub capacity: u32,
    pub ends_at: Timestamp,
    pub requires_admin_review: bool,
}

impl Experience {
    pub fn new(new: NewExperience) -> Self {
        Self {
            id: Uuid::new_v4(),
            ngo_id: new.ngo_id,
            title: new.title,
            capacity: new.capacity,
            current_bookings: 0,
            ends_at: new.ends_at,
            requires_admin_review: new.requires_admin_review,
            created_at: Timestamp::now(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.current_bookings >= self.capacity
    }

    pub fn seats_left(&self) -> u32 {
        self.capacity.saturating_sub(self.current_bookings)
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        self.ends_at <= now
    }
}
