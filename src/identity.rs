//! Actor resolution for Roster commands.
//!
//! Every command acts as someone. Rather than requiring `--as` and `--role` on
//! every invocation, each part of the actor is resolved through a chain:
//!
//! 1. `--as <id> --role <role> --ngo <org>` flags for this command
//! 2. `ROSTER_ACTOR`, `ROSTER_ROLE`, `ROSTER_NGO` env vars for the session
//! 3. `actor`, `role`, `ngo` in `~/.roster/config.toml`
//!
//! A host actor must end up with an organisation. Volunteers and operators
//! never carry one, even if it is set somewhere along the chain.

use std::env;

use crate::config::Config;
use crate::model::{Actor, Role};

/// Error message shown when the actor cannot be resolved.
pub const ACTOR_REQUIRED: &str = "actor required: pass --as <id> --role <role>, \
    set ROSTER_ACTOR and ROSTER_ROLE, or add `actor` and `role` to ~/.roster/config.toml";

/// Error message shown when a host has no organisation.
pub const NGO_REQUIRED: &str = "ngo actors need an organisation: pass --ngo <id>, \
    set ROSTER_NGO, or add `ngo = \"...\"` to ~/.roster/config.toml";

/// Identity flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ActorFlags {
    pub id: Option<String>,
    pub role: Option<Role>,
    pub ngo: Option<String>,
}

/// Resolve the acting actor from flags, then the environment, then config.
pub fn resolve_actor(flags: &ActorFlags, config: &Config) -> Result<Actor, String> {
    resolve_with(flags, config, |key| env::var(key).ok())
}

fn resolve_with(
    flags: &ActorFlags,
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Actor, String> {
    let pick = |flag: Option<&String>, var: &str, configured: Option<&String>| {
        flag.cloned()
            .or_else(|| lookup(var))
            .or_else(|| configured.cloned())
            .filter(|s| !s.is_empty())
    };

    let id = pick(flags.id.as_ref(), "ROSTER_ACTOR", config.actor.as_ref())
        .ok_or(ACTOR_REQUIRED)?;

    let role = match flags.role {
        Some(role) => role,
        None => match lookup("ROSTER_ROLE").filter(|s| !s.is_empty()) {
            Some(role) => role.parse()?,
            None => config.role.ok_or(ACTOR_REQUIRED)?,
        },
    };

    Ok(match role {
        Role::User => Actor::user(id),
        Role::Admin => Actor::admin(id),
        Role::Ngo => {
            let ngo = pick(flags.ngo.as_ref(), "ROSTER_NGO", config.ngo.as_ref())
                .ok_or(NGO_REQUIRED)?;
            Actor::ngo(id, ngo)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn explicit_wins() {
        let flags = ActorFlags {
            id: Some("ana".into()),
            role: Some(Role::User),
            ngo: None,
        };
        let env = env_of(&[("ROSTER_ACTOR", "ben"), ("ROSTER_ROLE", "admin")]);
        let config = Config {
            actor: Some("cy".into()),
            role: Some(Role::Ngo),
            ..Config::default()
        };

        assert_eq!(resolve_with(&flags, &config, env).unwrap(), Actor::user("ana"));
    }

    #[test]
    fn env_beats_config() {
        let env = env_of(&[
            ("ROSTER_ACTOR", "maya"),
            ("ROSTER_ROLE", "ngo"),
            ("ROSTER_NGO", "reef-trust"),
        ]);
        let config = Config {
            actor: Some("cy".into()),
            role: Some(Role::User),
            ..Config::default()
        };

        assert_eq!(
            resolve_with(&ActorFlags::default(), &config, env).unwrap(),
            Actor::ngo("maya", "reef-trust")
        );
    }

    #[test]
    fn config_is_the_last_resort() {
        let config = Config {
            actor: Some("ops".into()),
            role: Some(Role::Admin),
            ngo: Some("reef-trust".into()),
            ..Config::default()
        };

        assert_eq!(
            resolve_with(&ActorFlags::default(), &config, env_of(&[])).unwrap(),
            Actor::admin("ops")
        );
    }

    #[test]
    fn parts_resolve_independently() {
        let flags = ActorFlags {
            role: Some(Role::Ngo),
            ..ActorFlags::default()
        };
        let env = env_of(&[("ROSTER_ACTOR", "maya")]);
        let config = Config {
            ngo: Some("reef-trust".into()),
            ..Config::default()
        };

        assert_eq!(
            resolve_with(&flags, &config, env).unwrap(),
            Actor::ngo("maya", "reef-trust")
        );
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let err = resolve_with(&ActorFlags::default(), &Config::default(), env_of(&[]))
            .unwrap_err();
        assert_eq!(err, ACTOR_REQUIRED);
    }

    #[test]
    fn host_without_organisation_is_rejected() {
        let flags = ActorFlags {
            id: Some("maya".into()),
            role: Some(Role::Ngo),
            ngo: None,
        };
        let err = resolve_with(&flags, &Config::default(), env_of(&[])).unwrap_err();
        assert_eq!(err, NGO_REQUIRED);
    }

    #[test]
    fn unknown_role_in_env_is_reported() {
        let env = env_of(&[("ROSTER_ACTOR", "ana"), ("ROSTER_ROLE", "volunteer")]);
        let err = resolve_with(&ActorFlags::default(), &Config::default(), env).unwrap_err();
        assert!(err.contains("unknown role 'volunteer'"));
    }
}
