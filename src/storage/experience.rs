//! Experience storage: insert and load experiences.
//!
//! There is no update here: the seat counter moves only through
//! [`super::Ledger`].

use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::model::Experience;

use super::{Result, StorageError, parse_timestamp, parse_uuid};

/// Inserts a new experience row.
pub fn insert_experience(conn: &Connection, experience: &Experience) -> Result<()> {
    conn.execute(
        "INSERT INTO experience
         (id, ngo_id, title, capacity, current_bookings, ends_at, requires_admin_review, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            experience.id.to_string(),
            &experience.ngo_id,
            &experience.title,
            experience.capacity,
            experience.current_bookings,
            experience.ends_at.to_string(),
            experience.requires_admin_review,
            experience.created_at.to_string(),
        ],
    )?;
    Ok(())
}

/// Loads a single experience.
pub fn load_experience(conn: &Connection, id: Uuid) -> Result<Experience> {
    let row = conn
        .query_row(
            "SELECT id, ngo_id, title, capacity, current_bookings, ends_at,
                    requires_admin_review, created_at
             FROM experience WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, bool>(6)?,
                    row.get::<_, String>(7)?,
                ))
            },
        )
        .optional()?;

    let Some((id_str, ngo_id, title, capacity, current_bookings, ends_at, review, created_at)) =
        row
    else {
        return Err(StorageError::ExperienceNotFound(id));
    };

    Ok(Experience {
        id: parse_uuid(&id_str, "experience.id")?,
        ngo_id,
        title,
        capacity,
        current_bookings,
        ends_at: parse_timestamp(&ends_at, "experience.ends_at")?,
        requires_admin_review: review,
        created_at: parse_timestamp(&created_at, "experience.created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::NewExperience;
    use crate::storage::tests::test_storage;

    fn sample_experience() -> Experience {
        Experience::new(NewExperience {
            ngo_id: "reef-trust".into(),
            title: "Coral survey".into(),
            capacity: 6,
            ends_at: Timestamp::new(2_000_000_000, 0).unwrap(),
            requires_admin_review: true,
        })
    }

    #[test]
    fn insert_and_load_experience() {
        let (_dir, storage) = test_storage();
        let experience = sample_experience();

        storage
            .transaction(|tx| insert_experience(tx, &experience))
            .unwrap();
        let loaded = storage
            .read(|conn| load_experience(conn, experience.id))
            .unwrap();

        assert_eq!(loaded, experience);
    }

    #[test]
    fn insert_duplicate_experience_fails() {
        let (_dir, storage) = test_storage();
        let experience = sample_experience();

        storage
            .transaction(|tx| insert_experience(tx, &experience))
            .unwrap();
        let err = storage
            .transaction(|tx| insert_experience(tx, &experience))
            .unwrap_err();

        assert!(matches!(err, StorageError::Sqlite(_)));
    }

    #[test]
    fn load_nonexistent_experience_fails() {
        let (_dir, storage) = test_storage();
        let err = storage
            .read(|conn| load_experience(conn, Uuid::new_v4()))
            .unwrap_err();

        assert!(matches!(err, StorageError::ExperienceNotFound(_)));
    }
}
