//! Booking state machine.
//!
//! Every legal status change is one row in [`RULES`]: where it starts, where
//! it ends, which roles may ask for it, which timestamp it stamps, and whether
//! it gives the seat back. Anything not in the table is an invalid transition.
//!
//! This module only answers "is this move legal, and what does it do". Whether
//! the actor may touch this particular booking at all is decided earlier, in
//! [`crate::access`].
//!
//! `completed` never appears as a target: it is reached only through the
//! attendance protocol.

use jiff::Timestamp;

use crate::error::BookingError;
use crate::model::{Booking, BookingStatus, Role};
use crate::notify::Event;

use BookingStatus::{Cancelled, Confirmed, Pending, PendingAdmin, Rejected};
use Role::{Admin, Ngo, User};

/// Which lifecycle timestamp a transition sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    AdminApproved,
    AdminRejected,
    Confirmed,
    Rejected,
    Cancelled,
}

/// Where a rejection reason supplied with the transition is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonField {
    /// `rejection_reason`, written by the host.
    Host,

    /// `admin_rejection_reason`, written by the platform operator.
    Admin,
}

/// One legal status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub from: BookingStatus,
    pub to: BookingStatus,
    pub roles: &'static [Role],
    pub stamp: Stamp,
    pub reason: Option<ReasonField>,
    pub releases_seat: bool,
}

pub const RULES: &[Rule] = &[
    Rule {
        from: PendingAdmin,
        to: Pending,
        roles: &[Admin],
        stamp: Stamp::AdminApproved,
        reason: None,
        releases_seat: false,
    },
    Rule {
        from: PendingAdmin,
        to: Rejected,
        roles: &[Admin],
        stamp: Stamp::AdminRejected,
        reason: Some(ReasonField::Admin),
        releases_seat: true,
    },
    Rule {
        from: Pending,
        to: Confirmed,
        roles: &[Ngo, Admin],
        stamp: Stamp::Confirmed,
        reason: None,
        releases_seat: false,
    },
    Rule {
        from: Pending,
        to: Rejected,
        roles: &[Ngo],
        stamp: Stamp::Rejected,
        reason: Some(ReasonField::Host),
        releases_seat: true,
    },
    Rule {
        from: Confirmed,
        to: Cancelled,
        roles: &[User, Ngo, Admin],
        stamp: Stamp::Cancelled,
        reason: None,
        releases_seat: true,
    },
    Rule {
        from: Pending,
        to: Cancelled,
        roles: &[User, Ngo, Admin],
        stamp: Stamp::Cancelled,
        reason: None,
        releases_seat: true,
    },
    Rule {
        from: PendingAdmin,
        to: Cancelled,
        roles: &[User, Ngo, Admin],
        stamp: Stamp::Cancelled,
        reason: None,
        releases_seat: true,
    },
];

/// Looks up the rule for moving from `from` to `to` as `role`.
pub fn find(
    from: BookingStatus,
    to: BookingStatus,
    role: Role,
) -> Result<&'static Rule, BookingError> {
    RULES
        .iter()
        .find(|r| r.from == from && r.to == to && r.roles.contains(&role))
        .ok_or(BookingError::InvalidTransition { from, to, role })
}

impl Rule {
    /// Moves `booking` to the rule's target status, stamping `at` and filing `reason`.
    ///
    /// A reason is ignored for transitions that do not record one.
    pub fn apply(&self, booking: &mut Booking, at: Timestamp, reason: Option<String>) {
        booking.status = self.to;

        let stamp = match self.stamp {
            Stamp::AdminApproved => &mut booking.admin_approved_at,
            Stamp::AdminRejected => &mut booking.admin_rejected_at,
            Stamp::Confirmed => &mut booking.confirmed_at,
            Stamp::Rejected => &mut booking.rejected_at,
            Stamp::Cancelled => &mut booking.cancelled_at,
        };
        *stamp = Some(at);

        match self.reason {
            Some(ReasonField::Host) => booking.rejection_reason = reason,
            Some(ReasonField::Admin) => booking.admin_rejection_reason = reason,
            None => {}
        }
    }

    /// The notification this transition emits once committed.
    pub fn event(&self) -> Event {
        match self.stamp {
            Stamp::AdminApproved => Event::AdminApproved,
            Stamp::AdminRejected => Event::AdminRejected,
            Stamp::Confirmed => Event::Confirmed,
            Stamp::Rejected => Event::Rejected,
            Stamp::Cancelled => Event::Cancelled,
        }
    }
}
