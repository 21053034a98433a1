//! Attendance commands: check-in, pending.

use clap::Subcommand;
use uuid::Uuid;

use crate::engine::Engine;
use crate::model::Actor;

use super::format::format_booking_line;
use super::{Failure, organisation, print_json};

#[derive(Debug, Subcommand)]
pub enum AttendanceCommand {
    /// Confirm, as host or volunteer, that the volunteering took place.
    ///
    /// Opens once the experience has ended. Repeating it changes nothing.
    CheckIn {
        /// Booking ID.
        id: Uuid,

        /// Free-text notes kept with this side's check-in.
        #[arg(long)]
        notes: Option<String>,
    },

    /// List confirmed bookings of ended experiences still waiting on a check-in.
    Pending {
        /// Host organisation. Defaults to the acting host's own.
        #[arg(long)]
        host: Option<String>,
    },
}

pub(super) fn run(engine: &Engine, actor: &Actor, command: AttendanceCommand) -> Result<(), Failure> {
    match command {
        AttendanceCommand::CheckIn { id, notes } => {
            let booking = engine.check_in(id, actor, notes)?;
            eprintln!(
                "Booking {}: attendance {}",
                booking.short_id(),
                booking.attendance.status()
            );
            print_json(&booking)
        }
        AttendanceCommand::Pending { host } => {
            let ngo_id = organisation(actor, host.as_deref())?;
            let waiting = engine.pending_attendance(actor, ngo_id)?;
            if waiting.is_empty() {
                println!("Nothing awaiting check-in");
                return Ok(());
            }
            for b in &waiting {
                println!("{}", format_booking_line(b));
            }
            Ok(())
        }
    }
}
