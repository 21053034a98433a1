//! CLI interface for Roster.
//!
//! Designed for operators, hosts and volunteers alike, and for scripts acting
//! on their behalf. Each subcommand is non-interactive: arguments in, output
//! out. Records print as JSON on stdout, lists as one short line per item, and
//! status lines go to stderr.
//!
//! Commands split into three groups:
//!
//! - `roster experience add|show` seeds the experiences bookings hang off.
//! - `roster booking ...` drives the booking lifecycle.
//! - `roster attendance check-in|pending` runs the post-event check-in.
//!
//! Every command acts as someone; see [`crate::identity`] for how the actor is
//! resolved when `--as`/`--role`/`--ngo` are not given.

mod attendance;
mod booking;
mod experience;
mod format;

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::BookingError;
use crate::identity::{ActorFlags, resolve_actor};
use crate::model::{Actor, Role};
use crate::notify::LogNotifier;
use crate::storage::Storage;

use attendance::AttendanceCommand;
use booking::BookingCommand;
use experience::ExperienceCommand;

/// Roster: bookings, seats, and attendance for volunteering experiences.
#[derive(Debug, Parser)]
#[command(name = "roster", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// SQLite database to use instead of the configured one.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Who is acting (e.g. a volunteer or staff member id).
    #[arg(long = "as", global = true)]
    actor: Option<String>,

    /// The capacity the actor acts in: user, ngo, or admin.
    #[arg(long, global = true)]
    role: Option<Role>,

    /// The host organisation an ngo actor belongs to.
    #[arg(long, global = true)]
    ngo: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: from application to completion
  1. roster --as ops --role admin experience add "Coral survey" \
       --host reef-trust --capacity 8 --ends-at 2026-06-01T16:00:00Z
     → prints the experience ID
  2. roster --as ana --role user booking apply <experience-id> --motivation "..."
     → prints the booking as JSON
  3. roster --as maya --role ngo --ngo reef-trust booking confirm <booking-id>
  4. roster --as maya --role ngo --ngo reef-trust attendance pending
  5. roster --as maya --role ngo --ngo reef-trust attendance check-in <booking-id>
  6. roster --as ana --role user attendance check-in <booking-id>
     → booking is completed once both sides have checked in"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage experiences: add new ones, show existing.
    Experience {
        #[command(subcommand)]
        command: ExperienceCommand,
    },

    /// Apply to experiences and move bookings through their lifecycle.
    Booking {
        #[command(subcommand)]
        command: BookingCommand,
    },

    /// Record attendance once an experience has ended.
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommand,
    },
}

/// A failed command: what to tell the user, and the exit code to leave with.
#[derive(Debug)]
pub struct Failure {
    pub message: String,
    pub code: i32,
}

impl Failure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 1,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<BookingError> for Failure {
    fn from(err: BookingError) -> Self {
        let code = match &err {
            BookingError::NotFound(_) | BookingError::ExperienceNotFound(_) => 2,
            BookingError::Unauthorized { .. } => 3,
            BookingError::InvalidTransition { .. } | BookingError::AttendanceNotOpen { .. } => 4,
            BookingError::CapacityExceeded(_) => 5,
            BookingError::Storage(_) => 1,
        };
        Self {
            message: err.to_string(),
            code,
        }
    }
}

/// Run the CLI, returning a message and exit code on failure.
pub fn run(config: &Config) -> Result<(), Failure> {
    let cli = Cli::parse();

    let path = cli
        .db
        .clone()
        .or_else(|| config.database())
        .ok_or_else(|| Failure::new("could not determine home directory"))?;
    let storage = Storage::new(&path, config.busy_timeout())
        .map_err(|e| Failure::new(format!("failed to open {}: {e}", path.display())))?;
    let engine = Engine::new(storage, LogNotifier, config.retry_policy());

    let flags = ActorFlags {
        id: cli.actor,
        role: cli.role,
        ngo: cli.ngo,
    };
    let actor = resolve_actor(&flags, config)?;

    match cli.command {
        Command::Experience { command } => experience::run(&engine, &actor, command),
        Command::Booking { command } => booking::run(&engine, &actor, command),
        Command::Attendance { command } => attendance::run(&engine, &actor, command),
    }
}

/// The organisation a host command applies to: the one given, or the actor's own.
fn organisation<'a>(actor: &'a Actor, given: Option<&'a str>) -> Result<&'a str, Failure> {
    given
        .or(actor.ngo_id.as_deref())
        .ok_or_else(|| Failure::new("this command requires an organisation: pass --host <ngo-id>"))
}

/// Print a record as pretty JSON on stdout.
fn print_json(value: &impl serde::Serialize) -> Result<(), Failure> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Failure::new(format!("failed to serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}
