//! Actors: who is acting on a booking, and in what capacity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The capacity an actor acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A volunteer applying to and attending experiences.
    User,

    /// A member of the host organisation offering an experience.
    Ngo,

    /// A platform operator.
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ngo => "ngo",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "ngo" => Ok(Self::Ngo),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}' (expected user, ngo, or admin)")),
        }
    }
}

/// A resolved identity: who is acting, and for which organisation when hosting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,

    /// The host organisation this actor belongs to. Only meaningful for `Role::Ngo`.
    pub ngo_id: Option<String>,
}

impl Actor {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            ngo_id: None,
        }
    }

    pub fn ngo(id: impl Into<String>, ngo_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Ngo,
            ngo_id: Some(ngo_id.into()),
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Admin,
            ngo_id: None,
        }
    }

    /// Whether this actor hosts on behalf of the given organisation.
    pub fn is_member_of(&self, ngo_id: &str) -> bool {
        self.role == Role::Ngo && self.ngo_id.as_deref() == Some(ngo_id)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ngo_id {
            Some(ngo) if self.role == Role::Ngo => write!(f, "{}@{ngo} ({})", self.id, self.role),
            _ => write!(f, "{} ({})", self.id, self.role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::User, Role::Ngo, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "host".parse::<Role>().unwrap_err();
        assert!(err.contains("unknown role 'host'"));
    }

    #[test]
    fn membership_requires_ngo_role() {
        let host = Actor::ngo("maya", "reef-trust");
        assert!(host.is_member_of("reef-trust"));
        assert!(!host.is_member_of("other-org"));

        let mut impostor = Actor::user("maya");
        impostor.ngo_id = Some("reef-trust".into());
        assert!(!impostor.is_member_of("reef-trust"));
    }
}
