//! Core data model for Roster.
//!
//! These types represent the booking engine's records:
//! experiences and their seats, bookings and their lifecycle,
//! the actors who move them, and the attendance each party attests to.

mod actor;
mod attendance;
mod booking;
mod experience;
mod history;

pub use actor::{Actor, Role};
pub use attendance::{Attendance, AttendanceStatus, CheckIn, Party};
pub use booking::{Application, Booking, BookingStatus};
pub use experience::{Experience, NewExperience};
pub use history::HistoryEntry;
