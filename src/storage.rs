//! Local persistence for experiences, bookings, and their ledgers.
//!
//! Everything lives in one `SQLite` file:
//!
//! ```text
//! experience      # Seats offered, and how many are held
//! booking         # One row per application, never deleted
//! seat_ledger     # One reserve and at most one release per booking
//! booking_history # Append-only audit trail of status changes and check-ins
//! ```
//!
//! Writes go through [`Storage::transaction`], which takes the database write
//! lock up front. A booking update and its seat adjustment either commit
//! together or not at all.

mod booking;
mod experience;
mod history;
mod ledger;

use std::{fs, io, path::PathBuf, time::Duration};

use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use uuid::Uuid;

pub use booking::{
    BookingScope, insert_booking, list_awaiting_attendance, list_bookings, load_booking,
    update_booking,
};
pub use experience::{insert_experience, load_experience};
pub use history::{append_history, load_history};
pub use ledger::{Ledger, LedgerEntry, SeatMovement, load_ledger};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("experience not found: {0}")]
    ExperienceNotFound(Uuid),

    #[error("experience {0} is full")]
    ExperienceFull(Uuid),

    #[error("seat already {movement} for booking {booking_id}")]
    DuplicateSeatMovement {
        booking_id: Uuid,
        movement: SeatMovement,
    },

    #[error("database is busy: {0}")]
    Contention(rusqlite::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => Self::Contention(err),
            _ => Self::Sqlite(err),
        }
    }
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS experience (
    id                    TEXT PRIMARY KEY,
    ngo_id                TEXT NOT NULL,
    title                 TEXT NOT NULL,
    capacity              INTEGER NOT NULL CHECK (capacity >= 0),
    current_bookings      INTEGER NOT NULL DEFAULT 0
                          CHECK (current_bookings >= 0 AND current_bookings <= capacity),
    ends_at               TEXT NOT NULL,
    requires_admin_review INTEGER NOT NULL,
    created_at            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS booking (
    id                       TEXT PRIMARY KEY,
    experience_id            TEXT NOT NULL REFERENCES experience(id),
    user_id                  TEXT NOT NULL,
    ngo_id                   TEXT NOT NULL,
    status                   TEXT NOT NULL,
    applied_at               TEXT NOT NULL,
    admin_approved_at        TEXT,
    admin_rejected_at        TEXT,
    confirmed_at             TEXT,
    rejected_at              TEXT,
    cancelled_at             TEXT,
    completed_at             TEXT,
    rejection_reason         TEXT,
    admin_rejection_reason   TEXT,
    ngo_check_in_time        TEXT,
    ngo_check_in_notes       TEXT,
    volunteer_check_in_time  TEXT,
    volunteer_check_in_notes TEXT,
    attendance_disputed      INTEGER NOT NULL DEFAULT 0,
    application              TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS booking_by_user ON booking (user_id);
CREATE INDEX IF NOT EXISTS booking_by_ngo ON booking (ngo_id, status);

CREATE TABLE IF NOT EXISTS seat_ledger (
    booking_id    TEXT NOT NULL,
    experience_id TEXT NOT NULL,
    movement      TEXT NOT NULL CHECK (movement IN ('reserve', 'release')),
    at            TEXT NOT NULL,
    PRIMARY KEY (booking_id, movement)
);

CREATE TABLE IF NOT EXISTS booking_history (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    booking_id  TEXT NOT NULL,
    actor_id    TEXT NOT NULL,
    role        TEXT NOT NULL,
    from_status TEXT,
    to_status   TEXT NOT NULL,
    note        TEXT,
    at          TEXT NOT NULL
);
";

/// `SQLite`-backed storage for the booking engine.
///
/// Holds only the database path. Every operation opens its own connection,
/// so one `Storage` can be shared across threads.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Storage {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    ///
    /// `busy_timeout` bounds how long a connection waits on another writer's
    /// lock before reporting [`StorageError::Contention`].
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let storage = Self { path, busy_timeout };
        storage.connect()?.execute_batch(SCHEMA)?;
        Ok(storage)
    }

    /// Returns the default database path: `~/.roster/roster.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".roster").join("roster.sqlite"))
    }

    /// Runs `f` inside one immediate transaction and commits if it succeeds.
    ///
    /// Any error from `f` rolls everything back.
    pub fn transaction<T, E>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> core::result::Result<T, E>,
    ) -> core::result::Result<T, E>
    where
        E: From<StorageError>,
    {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }

    /// Runs a read-only query on a fresh connection.
    pub fn read<T, E>(
        &self,
        f: impl FnOnce(&Connection) -> core::result::Result<T, E>,
    ) -> core::result::Result<T, E>
    where
        E: From<StorageError>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }
}

/// Parses a stored RFC 3339 timestamp.
fn parse_timestamp(value: &str, column: &str) -> Result<jiff::Timestamp> {
    value
        .parse::<jiff::Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

fn parse_optional_timestamp(value: Option<&str>, column: &str) -> Result<Option<jiff::Timestamp>> {
    value.map(|v| parse_timestamp(v, column)).transpose()
}

fn parse_uuid(value: &str, column: &str) -> Result<Uuid> {
    value
        .parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}
