//! Booking lifecycle commands.
//!
//! `apply` creates a booking; `approve`, `confirm`, `reject` and `cancel` each
//! ask the engine for one status change. Whether the acting role may make that
//! change is the engine's call, not the CLI's.

use clap::Subcommand;
use uuid::Uuid;

use crate::engine::{Engine, StatusExtras};
use crate::model::{Actor, Application, BookingStatus};

use super::format::{format_booking_line, format_history_line, format_seat_line};
use super::{Failure, print_json};

#[derive(Debug, Subcommand)]
pub enum BookingCommand {
    /// Apply to an experience. Takes a seat straight away.
    Apply {
        /// Experience ID.
        experience: Uuid,

        #[arg(long)]
        motivation: Option<String>,

        #[arg(long)]
        skills: Option<String>,

        #[arg(long)]
        dietary_needs: Option<String>,

        #[arg(long)]
        travel_dates: Option<String>,

        /// Any further answers, as a JSON object (e.g. `{"emergencyContact": "..."}`).
        /// The flags above win over the same keys given here.
        #[arg(long)]
        answers: Option<String>,
    },

    /// Pass operator screening (pending_admin → pending).
    Approve { id: Uuid },

    /// Accept the volunteer (pending → confirmed).
    Confirm { id: Uuid },

    /// Turn the application down. Gives the seat back.
    Reject {
        id: Uuid,

        /// Shown to the volunteer.
        #[arg(long)]
        reason: Option<String>,
    },

    /// Cancel a live booking. Gives the seat back.
    Cancel { id: Uuid },

    /// Show a booking.
    Show { id: Uuid },

    /// List the bookings visible to the acting user.
    List,

    /// Show every status change and seat movement of a booking.
    History { id: Uuid },
}

pub(super) fn run(engine: &Engine, actor: &Actor, command: BookingCommand) -> Result<(), Failure> {
    match command {
        BookingCommand::Apply {
            experience,
            motivation,
            skills,
            dietary_needs,
            travel_dates,
            answers,
        } => {
            let mut application = Application::from_answers(parse_answers(answers.as_deref())?);
            for (key, flag) in [
                (Application::MOTIVATION, motivation),
                (Application::SKILLS, skills),
                (Application::DIETARY_NEEDS, dietary_needs),
                (Application::TRAVEL_DATES, travel_dates),
            ] {
                if let Some(value) = flag {
                    application = application.with(key, value);
                }
            }
            let booking = engine.create_booking(experience, actor, application)?;
            eprintln!("Booking {} is {}", booking.short_id(), booking.status);
            print_json(&booking)
        }
        BookingCommand::Approve { id } => transition(engine, actor, id, BookingStatus::Pending, None),
        BookingCommand::Confirm { id } => transition(engine, actor, id, BookingStatus::Confirmed, None),
        BookingCommand::Reject { id, reason } => {
            transition(engine, actor, id, BookingStatus::Rejected, reason)
        }
        BookingCommand::Cancel { id } => transition(engine, actor, id, BookingStatus::Cancelled, None),
        BookingCommand::Show { id } => print_json(&engine.booking(id, actor)?),
        BookingCommand::List => {
            let bookings = engine.bookings(actor)?;
            if bookings.is_empty() {
                println!("No bookings");
                return Ok(());
            }
            for b in &bookings {
                println!("{}", format_booking_line(b));
            }
            Ok(())
        }
        BookingCommand::History { id } => {
            for entry in engine.history(id, actor)? {
                println!("{}", format_history_line(&entry));
            }
            for movement in engine.seat_movements(id, actor)? {
                println!("{}", format_seat_line(&movement));
            }
            Ok(())
        }
    }
}

fn transition(
    engine: &Engine,
    actor: &Actor,
    id: Uuid,
    target: BookingStatus,
    reason: Option<String>,
) -> Result<(), Failure> {
    let booking = engine.update_booking_status(id, actor, target, StatusExtras { reason })?;
    eprintln!("Booking {} is {}", booking.short_id(), booking.status);
    Ok(())
}

fn parse_answers(
    answers: Option<&str>,
) -> Result<serde_json::Map<String, serde_json::Value>, Failure> {
    let Some(answers) = answers else {
        return Ok(serde_json::Map::new());
    };
    serde_json::from_str(answers)
        .map_err(|e| Failure::from(format!("--answers must be a JSON object: {e}")))
}
