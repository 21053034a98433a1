//! Output formatting for CLI display.

use crate::model::{Booking, HistoryEntry};
use crate::storage::LedgerEntry;

/// One line per booking: id, status, attendance, volunteer, and host.
pub(super) fn format_booking_line(b: &Booking) -> String {
    format!(
        "{}  [{}] [{}]  {} @ {}",
        b.short_id(),
        b.status,
        b.attendance.status(),
        b.user_id,
        b.ngo_id
    )
}

pub(super) fn format_history_line(h: &HistoryEntry) -> String {
    let change = match h.from {
        Some(from) if from == h.to => format!("{} (unchanged)", h.to),
        Some(from) => format!("{from} → {}", h.to),
        None => format!("created as {}", h.to),
    };
    let note = h.note.as_deref().map(|n| format!(": {n}")).unwrap_or_default();
    format!("{}  {change}  by {} ({}){note}", h.at, h.actor_id, h.role)
}

pub(super) fn format_seat_line(entry: &LedgerEntry) -> String {
    format!(
        "{}  seat {} on experience {}",
        entry.at,
        entry.movement,
        &entry.experience_id.to_string()[..8]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use uuid::Uuid;

    use crate::model::{Application, BookingStatus, Experience, NewExperience, Role};
    use crate::storage::SeatMovement;

    fn at() -> Timestamp {
        "2026-05-01T09:30:00Z".parse().unwrap()
    }

    fn history(from: Option<BookingStatus>, to: BookingStatus, note: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            booking_id: Uuid::nil(),
            actor_id: "maya".into(),
            role: Role::Ngo,
            from,
            to,
            note: note.map(String::from),
            at: at(),
        }
    }

    #[test]
    fn booking_line_shows_status_and_parties() {
        let exp = Experience::new(NewExperience {
            ngo_id: "reef-trust".into(),
            title: "Coral survey".into(),
            capacity: 2,
            ends_at: at(),
            requires_admin_review: true,
        });
        let booking = Booking::apply(&exp, "ana", Application::default());

        let line = format_booking_line(&booking);
        assert!(line.starts_with(&booking.short_id()));
        assert!(line.contains("[pending_admin] [pending]"));
        assert!(line.ends_with("ana @ reef-trust"));
    }

    #[test]
    fn history_lines() {
        assert_eq!(
            format_history_line(&history(None, BookingStatus::Pending, None)),
            "2026-05-01T09:30:00Z  created as pending  by maya (ngo)"
        );
        assert_eq!(
            format_history_line(&history(
                Some(BookingStatus::Pending),
                BookingStatus::Rejected,
                Some("team is full")
            )),
            "2026-05-01T09:30:00Z  pending → rejected  by maya (ngo): team is full"
        );
        assert_eq!(
            format_history_line(&history(
                Some(BookingStatus::Confirmed),
                BookingStatus::Confirmed,
                Some("host checked in")
            )),
            "2026-05-01T09:30:00Z  confirmed (unchanged)  by maya (ngo): host checked in"
        );
    }

    #[test]
    fn seat_line() {
        let entry = LedgerEntry {
            booking_id: Uuid::nil(),
            experience_id: Uuid::nil(),
            movement: SeatMovement::Release,
            at: at(),
        };
        assert_eq!(
            format_seat_line(&entry),
            "2026-05-01T09:30:00Z  seat released on experience 00000000"
        );
    }
}
