//! Attendance: the two-party check-in state attached to every booking.
//!
//! Host and volunteer each attest independently that the experience took place.
//! The combined [`AttendanceStatus`] is always derived from the two check-ins,
//! never stored on its own.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Role;

/// One party's attestation that attendance occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub at: Timestamp,
    pub notes: Option<String>,
}

/// Which side of a booking is checking in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Host,
    Volunteer,
}

impl Party {
    /// The party an actor checks in as. Operators have no attendance flag of their own.
    pub fn for_role(role: Role) -> Option<Self> {
        match role {
            Role::Ngo => Some(Self::Host),
            Role::User => Some(Self::Volunteer),
            Role::Admin => None,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Volunteer => f.write_str("volunteer"),
        }
    }
}

/// Derived attendance state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Pending,
    NgoOnly,
    VolunteerOnly,
    Confirmed,

    /// Set by a resolution path outside this engine. Never auto-completes.
    Disputed,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::NgoOnly => "ngo_only",
            Self::VolunteerOnly => "volunteer_only",
            Self::Confirmed => "confirmed",
            Self::Disputed => "disputed",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both parties' check-ins for one booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub ngo: Option<CheckIn>,
    pub volunteer: Option<CheckIn>,
    pub disputed: bool,
}

impl Attendance {
    pub fn status(&self) -> AttendanceStatus {
        if self.disputed {
            return AttendanceStatus::Disputed;
        }
        match (self.ngo.is_some(), self.volunteer.is_some()) {
            (false, false) => AttendanceStatus::Pending,
            (true, false) => AttendanceStatus::NgoOnly,
            (false, true) => AttendanceStatus::VolunteerOnly,
            (true, true) => AttendanceStatus::Confirmed,
        }
    }

    pub fn checked_in(&self, party: Party) -> bool {
        self.slot(party).is_some()
    }

    /// Records a party's check-in.
    ///
    /// Returns `false` without touching anything when that party already checked in,
    /// so the first timestamp and notes are kept.
    pub fn record(&mut self, party: Party, at: Timestamp, notes: Option<String>) -> bool {
        let slot = match party {
            Party::Host => &mut self.ngo,
            Party::Volunteer => &mut self.volunteer,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(CheckIn { at, notes });
        true
    }

    fn slot(&self, party: Party) -> Option<&CheckIn> {
        match party {
            Party::Host => self.ngo.as_ref(),
            Party::Volunteer => self.volunteer.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(secs, 0).unwrap()
    }

    #[test]
    fn fresh_attendance_is_pending() {
        assert_eq!(Attendance::default().status(), AttendanceStatus::Pending);
    }

    #[test]
    fn single_party_check_ins_are_partial() {
        let mut host_first = Attendance::default();
        host_first.record(Party::Host, ts(1_000), None);
        assert_eq!(host_first.status(), AttendanceStatus::NgoOnly);

        let mut volunteer_first = Attendance::default();
        volunteer_first.record(Party::Volunteer, ts(1_000), None);
        assert_eq!(volunteer_first.status(), AttendanceStatus::VolunteerOnly);
    }

    #[test]
    fn both_parties_confirm() {
        let mut attendance = Attendance::default();
        attendance.record(Party::Volunteer, ts(1_000), None);
        attendance.record(Party::Host, ts(2_000), Some("great work".into()));
        assert_eq!(attendance.status(), AttendanceStatus::Confirmed);
    }

    #[test]
    fn second_check_in_keeps_the_first() {
        let mut attendance = Attendance::default();
        assert!(attendance.record(Party::Host, ts(1_000), Some("first".into())));
        assert!(!attendance.record(Party::Host, ts(9_000), Some("second".into())));

        let ngo = attendance.ngo.unwrap();
        assert_eq!(ngo.at, ts(1_000));
        assert_eq!(ngo.notes.as_deref(), Some("first"));
    }

    #[test]
    fn dispute_overrides_flags() {
        let mut attendance = Attendance {
            disputed: true,
            ..Attendance::default()
        };
        attendance.record(Party::Host, ts(1_000), None);
        attendance.record(Party::Volunteer, ts(1_000), None);
        assert_eq!(attendance.status(), AttendanceStatus::Disputed);
    }

    #[test]
    fn operators_have_no_party() {
        assert_eq!(Party::for_role(Role::Admin), None);
        assert_eq!(Party::for_role(Role::Ngo), Some(Party::Host));
        assert_eq!(Party::for_role(Role::User), Some(Party::Volunteer));
    }
}
