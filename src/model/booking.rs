//! Booking types: a volunteer's application to, and attendance record for, one experience.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Attendance, Experience};

/// Where a booking stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting platform pre-screening before the host sees it.
    PendingAdmin,

    /// Awaiting the host's decision.
    Pending,

    Confirmed,
    Rejected,
    Cancelled,

    /// Both parties attested attendance.
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingAdmin => "pending_admin",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_admin" => Ok(Self::PendingAdmin),
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// Answers captured when the volunteer applied.
///
/// Opaque to the engine: one JSON object, stored and returned exactly as
/// given. The well-known answers are read through accessors and yield `None`
/// when absent or not a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Application {
    answers: serde_json::Map<String, serde_json::Value>,
}

impl Application {
    pub const MOTIVATION: &'static str = "motivation";
    pub const SKILLS: &'static str = "skills";
    pub const DIETARY_NEEDS: &'static str = "dietaryNeeds";
    pub const TRAVEL_DATES: &'static str = "travelDates";

    pub fn from_answers(answers: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { answers }
    }

    /// Sets one answer, replacing any earlier value under `key`.
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.answers.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.answers.get(key)
    }

    pub fn answers(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.answers
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.answers.get(key).and_then(serde_json::Value::as_str)
    }

    pub fn motivation(&self) -> Option<&str> {
        self.text(Self::MOTIVATION)
    }

    pub fn skills(&self) -> Option<&str> {
        self.text(Self::SKILLS)
    }

    pub fn dietary_needs(&self) -> Option<&str> {
        self.text(Self::DIETARY_NEEDS)
    }

    pub fn travel_dates(&self) -> Option<&str> {
        self.text(Self::TRAVEL_DATES)
    }
}

/// A volunteer's booking against one experience.
///
/// Each lifecycle timestamp is set at most once. Bookings are never deleted;
/// terminal ones are kept for audit and attendance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub experience_id: Uuid,
    pub user_id: String,

    /// Host organisation, copied from the experience when the booking is created.
    pub ngo_id: String,

    pub status: BookingStatus,

    pub applied_at: Timestamp,
    pub admin_approved_at: Option<Timestamp>,
    pub admin_rejected_at: Option<Timestamp>,
    pub confirmed_at: Option<Timestamp>,
    pub rejected_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,

    /// Why the host turned the volunteer down.
    pub rejection_reason: Option<String>,

    /// Why the platform turned the volunteer down during pre-screening.
    pub admin_rejection_reason: Option<String>,

    pub attendance: Attendance,
    pub application: Application,
}

impl Booking {
    /// A fresh application against `experience`.
    ///
    /// Starts at `pending_admin` when the experience requires platform
    /// pre-screening, otherwise at `pending`.
    pub fn apply(experience: &Experience, user_id: &str, application: Application) -> Self {
        let status = if experience.requires_admin_review {
            BookingStatus::PendingAdmin
        } else {
            BookingStatus::Pending
        };
        Self {
            id: Uuid::new_v4(),
            experience_id: experience.id,
            user_id: user_id.to_string(),
            ngo_id: experience.ngo_id.clone(),
            status,
            applied_at: Timestamp::now(),
            admin_approved_at: None,
            admin_rejected_at: None,
            confirmed_at: None,
            rejected_at: None,
            cancelled_at: None,
            completed_at: None,
            rejection_reason: None,
            admin_rejection_reason: None,
            attendance: Attendance::default(),
            application,
        }
    }

    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::NewExperience;

    fn experience(requires_admin_review: bool) -> Experience {
        Experience::new(NewExperience {
            ngo_id: "reef-trust".into(),
            title: "Coral survey".into(),
            capacity: 4,
            ends_at: Timestamp::now(),
            requires_admin_review,
        })
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            BookingStatus::PendingAdmin,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
    }

    #[test]
    fn screened_experiences_start_at_pending_admin() {
        let booking = Booking::apply(&experience(true), "ana", Application::default());
        assert_eq!(booking.status, BookingStatus::PendingAdmin);
    }

    #[test]
    fn unscreened_experiences_start_at_pending() {
        let exp = experience(false);
        let booking = Booking::apply(&exp, "ana", Application::default());

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.ngo_id, "reef-trust");
        assert_eq!(booking.experience_id, exp.id);
        assert!(booking.confirmed_at.is_none());
    }

    #[test]
    fn application_keeps_unknown_answers() {
        let json = r#"{"motivation":"love the ocean","shirtSize":"M"}"#;
        let application: Application = serde_json::from_str(json).unwrap();

        assert_eq!(application.motivation(), Some("love the ocean"));
        assert_eq!(application.get("shirtSize").unwrap(), "M");

        let back: serde_json::Value = serde_json::to_value(&application).unwrap();
        assert_eq!(back["shirtSize"], "M");
        assert!(back.get("skills").is_none());
    }

    #[test]
    fn structured_answers_under_well_known_keys_survive() {
        let json = r#"{"skills":["diving","first aid"],"motivation":42}"#;
        let application: Application = serde_json::from_str(json).unwrap();

        assert_eq!(application.skills(), None);
        assert_eq!(application.motivation(), None);
        assert_eq!(
            serde_json::to_value(&application).unwrap(),
            serde_json::from_str::<serde_json::Value>(json).unwrap()
        );
    }

    #[test]
    fn later_answers_replace_earlier_ones() {
        let application = Application::default()
            .with(Application::MOTIVATION, "b")
            .with(Application::MOTIVATION, "a");

        assert_eq!(application.motivation(), Some("a"));
        assert_eq!(application.answers().len(), 1);
    }
}
