//! Notifications: fire-and-forget messages sent after a booking change commits.
//!
//! Delivery is somebody else's job. The engine hands each committed event to a
//! [`Notifier`] and, if that fails, logs the failure and moves on. A lost
//! notification never undoes a booking change.

use std::fmt;

use tracing::info;

use crate::model::Booking;

/// Something worth telling the parties of a booking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Created,
    AdminApproved,
    AdminRejected,
    Confirmed,
    Rejected,
    Cancelled,
    CheckedIn,
    Completed,
}

impl Event {
    pub fn name(self) -> &'static str {
        match self {
            Self::Created => "booking_created",
            Self::AdminApproved => "booking_admin_approved",
            Self::AdminRejected => "booking_admin_rejected",
            Self::Confirmed => "booking_confirmed",
            Self::Rejected => "booking_rejected",
            Self::Cancelled => "booking_cancelled",
            Self::CheckedIn => "attendance_checked_in",
            Self::Completed => "booking_completed",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to send {event}: {reason}")]
pub struct NotifyError {
    pub event: Event,
    pub reason: String,
}

/// Outbound channel for booking events.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: Event, booking: &Booking) -> Result<(), NotifyError>;
}

/// Writes every event to the log. The default when nothing else is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event, booking: &Booking) -> Result<(), NotifyError> {
        info!(
            event = event.name(),
            booking_id = %booking.id,
            user_id = %booking.user_id,
            ngo_id = %booking.ngo_id,
            status = %booking.status,
            "notification"
        );
        Ok(())
    }
}
