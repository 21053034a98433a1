//! Seat ledger: the only writer of `experience.current_bookings`.
//!
//! A [`Ledger`] can only be built from an open transaction, so every seat
//! movement commits or rolls back together with the booking change that
//! caused it. Each movement is journaled in `seat_ledger`, whose primary key
//! allows one reserve and one release per booking.

use std::fmt;

use jiff::Timestamp;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{Result, StorageError, parse_timestamp, parse_uuid};

/// Direction of a seat movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatMovement {
    Reserve,
    Release,
}

impl SeatMovement {
    fn as_str(self) -> &'static str {
        match self {
            Self::Reserve => "reserve",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for SeatMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserve => f.write_str("reserved"),
            Self::Release => f.write_str("released"),
        }
    }
}

/// One journaled seat movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub booking_id: Uuid,
    pub experience_id: Uuid,
    pub movement: SeatMovement,
    pub at: Timestamp,
}

/// Seat counter mutations, scoped to one transaction.
pub struct Ledger<'a> {
    conn: &'a Connection,
}

impl<'a> Ledger<'a> {
    pub fn new(tx: &'a Transaction<'_>) -> Self {
        Self { conn: tx }
    }

    /// Takes one seat on `experience_id` for `booking_id`.
    ///
    /// Fails with [`StorageError::ExperienceFull`] when every seat is held,
    /// leaving the counter untouched. Returns the new seat count.
    pub fn reserve_seat(&self, experience_id: Uuid, booking_id: Uuid, at: Timestamp) -> Result<u32> {
        let (capacity, current) = self.counts(experience_id)?;
        if current >= capacity {
            return Err(StorageError::ExperienceFull(experience_id));
        }

        self.journal(experience_id, booking_id, SeatMovement::Reserve, at)?;
        self.conn.execute(
            "UPDATE experience SET current_bookings = current_bookings + 1 WHERE id = ?1",
            [experience_id.to_string()],
        )?;

        debug!(%experience_id, %booking_id, seats = current + 1, capacity, "seat reserved");
        Ok(current + 1)
    }

    /// Gives back the seat `booking_id` was holding on `experience_id`.
    ///
    /// The counter never drops below zero. A second release for the same
    /// booking fails with [`StorageError::DuplicateSeatMovement`].
    pub fn release_seat(&self, experience_id: Uuid, booking_id: Uuid, at: Timestamp) -> Result<u32> {
        let (capacity, current) = self.counts(experience_id)?;

        self.journal(experience_id, booking_id, SeatMovement::Release, at)?;
        self.conn.execute(
            "UPDATE experience SET current_bookings = MAX(current_bookings - 1, 0) WHERE id = ?1",
            [experience_id.to_string()],
        )?;

        let seats = current.saturating_sub(1);
        debug!(%experience_id, %booking_id, seats, capacity, "seat released");
        Ok(seats)
    }

    fn counts(&self, experience_id: Uuid) -> Result<(u32, u32)> {
        self.conn
            .query_row(
                "SELECT capacity, current_bookings FROM experience WHERE id = ?1",
                [experience_id.to_string()],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?
            .ok_or(StorageError::ExperienceNotFound(experience_id))
    }

    fn journal(
        &self,
        experience_id: Uuid,
        booking_id: Uuid,
        movement: SeatMovement,
        at: Timestamp,
    ) -> Result<()> {
        let inserted = self.conn.execute(
            "INSERT INTO seat_ledger (booking_id, experience_id, movement, at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                booking_id.to_string(),
                experience_id.to_string(),
                movement.as_str(),
                at.to_string(),
            ],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                Err(StorageError::DuplicateSeatMovement {
                    booking_id,
                    movement,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Loads every seat movement journaled for a booking, oldest first.
pub fn load_ledger(conn: &Connection, booking_id: Uuid) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare(
        "SELECT booking_id, experience_id, movement, at FROM seat_ledger
         WHERE booking_id = ?1 ORDER BY movement = 'release', at",
    )?;
    let rows = stmt.query_map([booking_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (booking, experience, movement, at) = row?;
        let movement = match movement.as_str() {
            "reserve" => SeatMovement::Reserve,
            "release" => SeatMovement::Release,
            other => {
                return Err(StorageError::Corrupt(format!("unknown seat movement: {other}")));
            }
        };
        entries.push(LedgerEntry {
            booking_id: parse_uuid(&booking, "seat_ledger.booking_id")?,
            experience_id: parse_uuid(&experience, "seat_ledger.experience_id")?,
            movement,
            at: parse_timestamp(&at, "seat_ledger.at")?,
        });
    }
    Ok(entries)
}
