//! Booking engine: the operations that move bookings, and the reads around them.
//!
//! Every mutation is one store transaction that loads the booking, checks who
//! is asking, checks the move is legal, writes the booking, adjusts the seat
//! ledger, and appends history. If any step fails, nothing is written.
//! Contention on the store is retried under the engine's [`RetryPolicy`];
//! every other failure goes straight back to the caller.
//!
//! Notifications are sent only after the transaction commits.

use jiff::Timestamp;
use rusqlite::Transaction;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access;
use crate::error::{BookingError, Result};
use crate::lifecycle;
use crate::model::{
    Actor, Application, AttendanceStatus, Booking, BookingStatus, Experience, HistoryEntry,
    NewExperience, Party, Role,
};
use crate::notify::{Event, LogNotifier, Notifier};
use crate::retry::RetryPolicy;
use crate::storage::{
    BookingScope, Ledger, LedgerEntry, Storage, append_history, insert_booking, insert_experience,
    list_awaiting_attendance, list_bookings, load_booking, load_experience, load_history,
    load_ledger, update_booking,
};

/// Role-specific input to a status change.
#[derive(Debug, Clone, Default)]
pub struct StatusExtras {
    /// Why the booking is being rejected. Ignored by every other transition.
    pub reason: Option<String>,
}

pub struct Engine<N = LogNotifier> {
    storage: Storage,
    notifier: N,
    retry: RetryPolicy,
}

impl<N: Notifier> Engine<N> {
    pub fn new(storage: Storage, notifier: N, retry: RetryPolicy) -> Self {
        Self {
            storage,
            notifier,
            retry,
        }
    }

    // ── Experiences ──

    /// Lists a new experience. Operators may list for anyone, hosts only for their own organisation.
    pub fn add_experience(&self, actor: &Actor, new: NewExperience) -> Result<Experience> {
        let via = access::authorize_host(actor, &new.ngo_id, "list experiences")?;

        let experience = Experience::new(new);
        self.write(|tx| Ok(insert_experience(tx, &experience)?))?;

        info!(
            experience_id = %experience.id,
            ngo_id = %experience.ngo_id,
            capacity = experience.capacity,
            actor = %actor,
            ?via,
            "experience added"
        );
        Ok(experience)
    }

    pub fn experience(&self, experience_id: Uuid) -> Result<Experience> {
        Ok(self
            .storage
            .read(|conn| load_experience(conn, experience_id))?)
    }

    // ── Booking lifecycle ──

    /// A volunteer applies to an experience, taking one of its seats.
    ///
    /// Fails with [`BookingError::CapacityExceeded`] when the experience is
    /// full, in which case no booking is written and no seat moves.
    pub fn create_booking(
        &self,
        experience_id: Uuid,
        volunteer: &Actor,
        application: Application,
    ) -> Result<Booking> {
        if volunteer.role != Role::User {
            return Err(BookingError::unauthorized(volunteer, "apply to experiences"));
        }

        let booking = self.write(|tx| {
            let experience = load_experience(tx, experience_id)?;
            let booking = Booking::apply(&experience, &volunteer.id, application.clone());

            Ledger::new(tx).reserve_seat(experience.id, booking.id, booking.applied_at)?;
            insert_booking(tx, &booking)?;
            append_history(
                tx,
                &HistoryEntry {
                    booking_id: booking.id,
                    actor_id: volunteer.id.clone(),
                    role: volunteer.role,
                    from: None,
                    to: booking.status,
                    note: None,
                    at: booking.applied_at,
                },
            )?;
            Ok(booking)
        })?;

        info!(
            booking_id = %booking.id,
            %experience_id,
            user_id = %booking.user_id,
            status = %booking.status,
            "booking created"
        );
        self.dispatch(&[Event::Created], &booking);
        Ok(booking)
    }

    /// Moves a booking to `target` on behalf of `actor`.
    ///
    /// Checks, in order: the booking exists, the actor may touch it, the move
    /// is in the transition table for the actor's role, the experience exists.
    /// Rejections and cancellations give the seat back in the same transaction.
    pub fn update_booking_status(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        target: BookingStatus,
        extras: StatusExtras,
    ) -> Result<Booking> {
        let (booking, rule, from, via) = self.write(|tx| {
            let mut booking = load_booking(tx, booking_id)?;
            let via = access::authorize(actor, &booking, verb(target))?;
            let rule = lifecycle::find(booking.status, target, actor.role)?;
            let experience = load_experience(tx, booking.experience_id)?;

            let from = booking.status;
            let now = Timestamp::now();
            rule.apply(&mut booking, now, extras.reason.clone());

            if rule.releases_seat {
                Ledger::new(tx).release_seat(experience.id, booking.id, now)?;
            }
            update_booking(tx, &booking)?;
            append_history(
                tx,
                &HistoryEntry {
                    booking_id,
                    actor_id: actor.id.clone(),
                    role: actor.role,
                    from: Some(from),
                    to: booking.status,
                    note: rule.reason.and(extras.reason.clone()),
                    at: now,
                },
            )?;
            Ok((booking, rule, from, via))
        })?;

        info!(
            %booking_id,
            %from,
            to = %booking.status,
            actor = %actor,
            ?via,
            seat_released = rule.releases_seat,
            "booking status changed"
        );
        self.dispatch(&[rule.event()], &booking);
        Ok(booking)
    }

    /// Records that the acting party saw the volunteering take place.
    ///
    /// Repeating a check-in is a successful no-op. Otherwise the booking must
    /// be confirmed and its experience over. When the second party checks in,
    /// the booking is completed.
    pub fn check_in(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Booking> {
        let (booking, events, via) = self.write(|tx| {
            let mut booking = load_booking(tx, booking_id)?;
            let via = access::authorize(actor, &booking, "check in to")?;
            let party = Party::for_role(actor.role).ok_or_else(|| {
                BookingError::unauthorized(actor, "check in on behalf of host or volunteer")
            })?;

            if booking.attendance.checked_in(party) {
                return Ok((booking, Vec::new(), via));
            }
            if booking.status != BookingStatus::Confirmed {
                return Err(BookingError::AttendanceNotOpen {
                    booking_id,
                    reason: format!("booking is {}", booking.status),
                });
            }
            let experience = load_experience(tx, booking.experience_id)?;
            let now = Timestamp::now();
            if !experience.has_ended(now) {
                return Err(BookingError::AttendanceNotOpen {
                    booking_id,
                    reason: format!("experience runs until {}", experience.ends_at),
                });
            }

            booking.attendance.record(party, now, notes.clone());
            let mut events = vec![Event::CheckedIn];
            let mut entry = HistoryEntry {
                booking_id,
                actor_id: actor.id.clone(),
                role: actor.role,
                from: Some(BookingStatus::Confirmed),
                to: BookingStatus::Confirmed,
                note: Some(format!("{party} checked in")),
                at: now,
            };
            append_history(tx, &entry)?;

            if booking.attendance.status() == AttendanceStatus::Confirmed {
                booking.status = BookingStatus::Completed;
                booking.completed_at = Some(now);
                entry.to = BookingStatus::Completed;
                entry.note = Some("attendance confirmed by both parties".into());
                append_history(tx, &entry)?;
                events.push(Event::Completed);
            }

            update_booking(tx, &booking)?;
            Ok((booking, events, via))
        })?;

        if events.is_empty() {
            info!(%booking_id, actor = %actor, ?via, "check-in already recorded");
        } else {
            info!(
                %booking_id,
                actor = %actor,
                ?via,
                attendance = %booking.attendance.status(),
                status = %booking.status,
                "attendance checked in"
            );
        }
        self.dispatch(&events, &booking);
        Ok(booking)
    }

    // ── Reads ──

    pub fn booking(&self, booking_id: Uuid, actor: &Actor) -> Result<Booking> {
        let booking = self.storage.read(|conn| load_booking(conn, booking_id))?;
        access::authorize(actor, &booking, "view")?;
        Ok(booking)
    }

    /// Every booking the actor can see: their own as a volunteer, their
    /// organisation's as a host, all of them as an operator.
    pub fn bookings(&self, actor: &Actor) -> Result<Vec<Booking>> {
        let scope = match actor.role {
            Role::User => BookingScope::Volunteer(&actor.id),
            Role::Ngo => BookingScope::Organisation(actor.ngo_id.as_deref().ok_or_else(|| {
                BookingError::unauthorized(actor, "list bookings without an organisation")
            })?),
            Role::Admin => BookingScope::All,
        };
        Ok(self.storage.read(|conn| list_bookings(conn, scope))?)
    }

    /// The host's check-in queue: confirmed bookings whose experience is over
    /// and that are still waiting on at least one party.
    pub fn pending_attendance(&self, actor: &Actor, ngo_id: &str) -> Result<Vec<Booking>> {
        access::authorize_host(actor, ngo_id, "view the attendance queue")?;
        let now = Timestamp::now();
        Ok(self
            .storage
            .read(|conn| list_awaiting_attendance(conn, ngo_id, now))?)
    }

    pub fn history(&self, booking_id: Uuid, actor: &Actor) -> Result<Vec<HistoryEntry>> {
        self.booking(booking_id, actor)?;
        Ok(self.storage.read(|conn| load_history(conn, booking_id))?)
    }

    pub fn seat_movements(&self, booking_id: Uuid, actor: &Actor) -> Result<Vec<LedgerEntry>> {
        self.booking(booking_id, actor)?;
        Ok(self.storage.read(|conn| load_ledger(conn, booking_id))?)
    }

    // ── Internals ──

    /// Runs `op` in a write transaction, retrying while the store is contended.
    fn write<T>(&self, op: impl Fn(&Transaction<'_>) -> Result<T>) -> Result<T> {
        self.retry
            .run(BookingError::is_contention, || self.storage.transaction(&op))
    }

    fn dispatch(&self, events: &[Event], booking: &Booking) {
        for &event in events {
            if let Err(e) = self.notifier.notify(event, booking) {
                warn!(booking_id = %booking.id, error = %e, "notification failed");
            }
        }
    }
}

fn verb(target: BookingStatus) -> &'static str {
    match target {
        BookingStatus::Pending => "approve",
        BookingStatus::Confirmed => "confirm",
        BookingStatus::Rejected => "reject",
        BookingStatus::Cancelled => "cancel",
        BookingStatus::PendingAdmin | BookingStatus::Completed => "update",
    }
}
