//! Booking storage: insert, load, update, and list bookings.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::model::{Attendance, Booking, BookingStatus, CheckIn};

use super::{Result, StorageError, parse_optional_timestamp, parse_timestamp, parse_uuid};

const COLUMNS: &str = "b.id, b.experience_id, b.user_id, b.ngo_id, b.status, b.applied_at,
    b.admin_approved_at, b.admin_rejected_at, b.confirmed_at, b.rejected_at,
    b.cancelled_at, b.completed_at, b.rejection_reason, b.admin_rejection_reason,
    b.ngo_check_in_time, b.ngo_check_in_notes, b.volunteer_check_in_time,
    b.volunteer_check_in_notes, b.attendance_disputed, b.application";

/// Which bookings a listing covers.
#[derive(Debug, Clone, Copy)]
pub enum BookingScope<'a> {
    /// Bookings made by one volunteer.
    Volunteer(&'a str),

    /// Bookings against one host organisation's experiences.
    Organisation(&'a str),

    All,
}

/// Inserts a new booking row.
pub fn insert_booking(conn: &Connection, booking: &Booking) -> Result<()> {
    let application = serde_json::to_string(&booking.application)?;
    conn.execute(
        "INSERT INTO booking
         (id, experience_id, user_id, ngo_id, status, applied_at, application)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            booking.id.to_string(),
            booking.experience_id.to_string(),
            &booking.user_id,
            &booking.ngo_id,
            booking.status.as_str(),
            booking.applied_at.to_string(),
            application,
        ],
    )?;
    update_booking(conn, booking)
}

/// Writes every mutable field of a booking back to its row.
pub fn update_booking(conn: &Connection, booking: &Booking) -> Result<()> {
    let ts = |t: Option<Timestamp>| t.map(|t| t.to_string());
    let ngo = booking.attendance.ngo.as_ref();
    let volunteer = booking.attendance.volunteer.as_ref();

    let rows = conn.execute(
        "UPDATE booking
         SET status = ?1, admin_approved_at = ?2, admin_rejected_at = ?3, confirmed_at = ?4,
             rejected_at = ?5, cancelled_at = ?6, completed_at = ?7, rejection_reason = ?8,
             admin_rejection_reason = ?9, ngo_check_in_time = ?10, ngo_check_in_notes = ?11,
             volunteer_check_in_time = ?12, volunteer_check_in_notes = ?13,
             attendance_disputed = ?14
         WHERE id = ?15",
        rusqlite::params![
            booking.status.as_str(),
            ts(booking.admin_approved_at),
            ts(booking.admin_rejected_at),
            ts(booking.confirmed_at),
            ts(booking.rejected_at),
            ts(booking.cancelled_at),
            ts(booking.completed_at),
            &booking.rejection_reason,
            &booking.admin_rejection_reason,
            ts(ngo.map(|c| c.at)),
            ngo.and_then(|c| c.notes.as_deref()),
            ts(volunteer.map(|c| c.at)),
            volunteer.and_then(|c| c.notes.as_deref()),
            booking.attendance.disputed,
            booking.id.to_string(),
        ],
    )?;
    if rows == 0 {
        return Err(StorageError::BookingNotFound(booking.id));
    }
    Ok(())
}

/// Loads a single booking.
pub fn load_booking(conn: &Connection, id: Uuid) -> Result<Booking> {
    let sql = format!("SELECT {COLUMNS} FROM booking b WHERE b.id = ?1");
    let row = conn
        .query_row(&sql, [id.to_string()], BookingRow::read)
        .optional()?;
    row.ok_or(StorageError::BookingNotFound(id))?.into_booking()
}

/// Lists bookings in `scope`, oldest application first.
pub fn list_bookings(conn: &Connection, scope: BookingScope<'_>) -> Result<Vec<Booking>> {
    let (filter, arg) = match scope {
        BookingScope::Volunteer(user) => ("WHERE b.user_id = ?1", Some(user)),
        BookingScope::Organisation(ngo) => ("WHERE b.ngo_id = ?1", Some(ngo)),
        BookingScope::All => ("", None),
    };
    let sql = format!("SELECT {COLUMNS} FROM booking b {filter} ORDER BY b.rowid");
    let mut stmt = conn.prepare(&sql)?;
    let rows = match arg {
        Some(arg) => stmt.query_map([arg], BookingRow::read)?,
        None => stmt.query_map([], BookingRow::read)?,
    };
    collect(rows)
}

/// Lists an organisation's confirmed bookings whose experience ended by `now`.
///
/// These are the bookings still waiting on one or both check-ins: once both
/// parties attest, a booking is completed and drops out.
pub fn list_awaiting_attendance(
    conn: &Connection,
    ngo_id: &str,
    now: Timestamp,
) -> Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {COLUMNS}, e.ends_at FROM booking b
         JOIN experience e ON e.id = b.experience_id
         WHERE b.ngo_id = ?1 AND b.status = ?2
         ORDER BY b.rowid"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params![ngo_id, BookingStatus::Confirmed.as_str()],
        |row| Ok((BookingRow::read(row)?, row.get::<_, String>(20)?)),
    )?;

    let mut bookings = Vec::new();
    for row in rows {
        let (booking, ends_at) = row?;
        if parse_timestamp(&ends_at, "experience.ends_at")? <= now {
            bookings.push(booking.into_booking()?);
        }
    }
    Ok(bookings)
}

fn collect(
    rows: impl Iterator<Item = rusqlite::Result<BookingRow>>,
) -> Result<Vec<Booking>> {
    let mut bookings = Vec::new();
    for row in rows {
        bookings.push(row?.into_booking()?);
    }
    Ok(bookings)
}

/// Raw column values, read before any parsing can fail.
struct BookingRow {
    id: String,
    experience_id: String,
    user_id: String,
    ngo_id: String,
    status: String,
    applied_at: String,
    admin_approved_at: Option<String>,
    admin_rejected_at: Option<String>,
    confirmed_at: Option<String>,
    rejected_at: Option<String>,
    cancelled_at: Option<String>,
    completed_at: Option<String>,
    rejection_reason: Option<String>,
    admin_rejection_reason: Option<String>,
    ngo_check_in_time: Option<String>,
    ngo_check_in_notes: Option<String>,
    volunteer_check_in_time: Option<String>,
    volunteer_check_in_notes: Option<String>,
    attendance_disputed: bool,
    application: String,
}

impl BookingRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            experience_id: row.get(1)?,
            user_id: row.get(2)?,
            ngo_id: row.get(3)?,
            status: row.get(4)?,
            applied_at: row.get(5)?,
            admin_approved_at: row.get(6)?,
            admin_rejected_at: row.get(7)?,
            confirmed_at: row.get(8)?,
            rejected_at: row.get(9)?,
            cancelled_at: row.get(10)?,
            completed_at: row.get(11)?,
            rejection_reason: row.get(12)?,
            admin_rejection_reason: row.get(13)?,
            ngo_check_in_time: row.get(14)?,
            ngo_check_in_notes: row.get(15)?,
            volunteer_check_in_time: row.get(16)?,
            volunteer_check_in_notes: row.get(17)?,
            attendance_disputed: row.get(18)?,
            application: row.get(19)?,
        })
    }

    fn into_booking(self) -> Result<Booking> {
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(StorageError::Corrupt)?;

        let check_in = |time: Option<String>, notes: Option<String>, column: &str| -> Result<_> {
            Ok(parse_optional_timestamp(time.as_deref(), column)?.map(|at| CheckIn { at, notes }))
        };
        let attendance = Attendance {
            ngo: check_in(
                self.ngo_check_in_time,
                self.ngo_check_in_notes,
                "booking.ngo_check_in_time",
            )?,
            volunteer: check_in(
                self.volunteer_check_in_time,
                self.volunteer_check_in_notes,
                "booking.volunteer_check_in_time",
            )?,
            disputed: self.attendance_disputed,
        };

        Ok(Booking {
            id: parse_uuid(&self.id, "booking.id")?,
            experience_id: parse_uuid(&self.experience_id, "booking.experience_id")?,
            user_id: self.user_id,
            ngo_id: self.ngo_id,
            status,
            applied_at: parse_timestamp(&self.applied_at, "booking.applied_at")?,
            admin_approved_at: parse_optional_timestamp(
                self.admin_approved_at.as_deref(),
                "booking.admin_approved_at",
            )?,
            admin_rejected_at: parse_optional_timestamp(
                self.admin_rejected_at.as_deref(),
                "booking.admin_rejected_at",
            )?,
            confirmed_at: parse_optional_timestamp(
                self.confirmed_at.as_deref(),
                "booking.confirmed_at",
            )?,
            rejected_at: parse_optional_timestamp(self.rejected_at.as_deref(), "booking.rejected_at")?,
            cancelled_at: parse_optional_timestamp(
                self.cancelled_at.as_deref(),
                "booking.cancelled_at",
            )?,
            completed_at: parse_optional_timestamp(
                self.completed_at.as_deref(),
                "booking.completed_at",
            )?,
            rejection_reason: self.rejection_reason,
            admin_rejection_reason: self.admin_rejection_reason,
            attendance,
            application: serde_json::from_str(&self.application)?,
        })
    }
}
