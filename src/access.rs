//! Booking access control: who may read or move a given booking.
//!
//! Three kinds of actor have a claim on a booking: the volunteer who made it,
//! any member of the host organisation it belongs to, and platform operators.
//! Nobody else gets to see that the booking exists, let alone what state it is in.

use crate::error::BookingError;
use crate::model::{Actor, Booking, Role};

/// On what grounds an actor reaches a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The volunteer who applied.
    Owner,

    /// A member of the hosting organisation.
    Host,

    /// A platform operator.
    Operator,
}

/// Decides whether `actor` may act on `booking`.
///
/// `action` only shapes the error message.
pub fn authorize(actor: &Actor, booking: &Booking, action: &str) -> Result<Access, BookingError> {
    let access = match actor.role {
        Role::Admin => Some(Access::Operator),
        Role::Ngo if actor.is_member_of(&booking.ngo_id) => Some(Access::Host),
        Role::User if actor.id == booking.user_id => Some(Access::Owner),
        Role::Ngo | Role::User => None,
    };
    access.ok_or_else(|| {
        BookingError::unauthorized(actor, format!("{action} booking {}", booking.short_id()))
    })
}

/// Decides whether `actor` may manage experiences hosted by `ngo_id`.
pub fn authorize_host(actor: &Actor, ngo_id: &str, action: &str) -> Result<Access, BookingError> {
    match actor.role {
        Role::Admin => Ok(Access::Operator),
        Role::Ngo if actor.is_member_of(ngo_id) => Ok(Access::Host),
        _ => Err(BookingError::unauthorized(actor, format!("{action} for {ngo_id}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::{Application, Experience, NewExperience};

    fn sample_booking() -> Booking {
        let exp = Experience::new(NewExperience {
            ngo_id: "reef-trust".into(),
            title: "Coral survey".into(),
            capacity: 2,
            ends_at: Timestamp::now(),
            requires_admin_review: false,
        });
        Booking::apply(&exp, "ana", Application::default())
    }

    #[test]
    fn owner_host_and_operator_are_allowed() {
        let booking = sample_booking();

        assert_eq!(authorize(&Actor::user("ana"), &booking, "view").unwrap(), Access::Owner);
        assert_eq!(
            authorize(&Actor::ngo("maya", "reef-trust"), &booking, "view").unwrap(),
            Access::Host
        );
        assert_eq!(authorize(&Actor::admin("ops"), &booking, "view").unwrap(), Access::Operator);
    }

    #[test]
    fn other_volunteers_are_denied() {
        let err = authorize(&Actor::user("ben"), &sample_booking(), "cancel").unwrap_err();
        assert!(matches!(err, BookingError::Unauthorized { .. }));
        assert!(err.to_string().contains("cancel booking"));
    }

    #[test]
    fn other_organisations_are_denied() {
        let err = authorize(&Actor::ngo("raj", "forest-watch"), &sample_booking(), "confirm")
            .unwrap_err();
        assert!(matches!(err, BookingError::Unauthorized { .. }));
    }

    #[test]
    fn host_without_organisation_is_denied() {
        let mut actor = Actor::ngo("maya", "reef-trust");
        actor.ngo_id = None;
        assert!(authorize(&actor, &sample_booking(), "view").is_err());
    }

    #[test]
    fn volunteer_id_matching_a_host_org_grants_nothing() {
        let err = authorize(&Actor::user("reef-trust"), &sample_booking(), "view").unwrap_err();
        assert!(matches!(err, BookingError::Unauthorized { .. }));
    }

    #[test]
    fn host_management_is_limited_to_own_organisation() {
        assert_eq!(
            authorize_host(&Actor::ngo("maya", "reef-trust"), "reef-trust", "list").unwrap(),
            Access::Host
        );
        assert!(authorize_host(&Actor::ngo("maya", "reef-trust"), "forest-watch", "list").is_err());
        assert!(authorize_host(&Actor::user("ana"), "reef-trust", "list").is_err());
        assert_eq!(
            authorize_host(&Actor::admin("ops"), "reef-trust", "list").unwrap(),
            Access::Operator
        );
    }
}
