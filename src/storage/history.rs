//! History storage: append and load a booking's audit trail.

use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{BookingStatus, HistoryEntry, Role};

use super::{Result, StorageError, parse_timestamp};

/// Appends one entry to a booking's history.
pub fn append_history(conn: &Connection, entry: &HistoryEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO booking_history (booking_id, actor_id, role, from_status, to_status, note, at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            entry.booking_id.to_string(),
            &entry.actor_id,
            entry.role.as_str(),
            entry.from.map(BookingStatus::as_str),
            entry.to.as_str(),
            &entry.note,
            entry.at.to_string(),
        ],
    )?;
    Ok(())
}

/// Loads a booking's history in the order it was written.
pub fn load_history(conn: &Connection, booking_id: Uuid) -> Result<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT actor_id, role, from_status, to_status, note, at
         FROM booking_history WHERE booking_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt.query_map([booking_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (actor_id, role, from, to, note, at) = row?;
        entries.push(HistoryEntry {
            booking_id,
            actor_id,
            role: role.parse::<Role>().map_err(StorageError::Corrupt)?,
            from: from
                .map(|s| s.parse::<BookingStatus>())
                .transpose()
                .map_err(StorageError::Corrupt)?,
            to: to.parse::<BookingStatus>().map_err(StorageError::Corrupt)?,
            note,
            at: parse_timestamp(&at, "booking_history.at")?,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::storage::tests::test_storage;

    fn entry(booking_id: Uuid, from: Option<BookingStatus>, to: BookingStatus) -> HistoryEntry {
        HistoryEntry {
            booking_id,
            actor_id: "maya".into(),
            role: Role::Ngo,
            from,
            to,
            note: None,
            at: Timestamp::now(),
        }
    }

    #[test]
    fn history_is_returned_in_write_order() {
        let (_dir, storage) = test_storage();
        let id = Uuid::new_v4();
        let created = entry(id, None, BookingStatus::Pending);
        let confirmed = entry(id, Some(BookingStatus::Pending), BookingStatus::Confirmed);

        storage
            .transaction(|tx| {
                append_history(tx, &created)?;
                append_history(tx, &confirmed)?;
                append_history(tx, &entry(Uuid::new_v4(), None, BookingStatus::Pending))
            })
            .unwrap();

        let history = storage.read(|conn| load_history(conn, id)).unwrap();
        assert_eq!(history, [created, confirmed]);
    }

    #[test]
    fn unknown_booking_has_empty_history() {
        let (_dir, storage) = test_storage();
        let history = storage
            .read(|conn| load_history(conn, Uuid::new_v4()))
            .unwrap();

        assert!(history.is_empty());
    }
}
