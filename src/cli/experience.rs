//! Experience commands: add, show.

use clap::Subcommand;
use jiff::Timestamp;
use uuid::Uuid;

use crate::engine::Engine;
use crate::model::{Actor, NewExperience};

use super::{Failure, organisation, print_json};

#[derive(Debug, Subcommand)]
pub enum ExperienceCommand {
    /// List a new experience. Prints the experience ID.
    Add {
        /// What volunteers will be doing.
        title: String,

        /// Host organisation. Defaults to the acting host's own.
        #[arg(long)]
        host: Option<String>,

        /// How many volunteers can hold a seat at once.
        #[arg(long)]
        capacity: u32,

        /// When the experience ends (RFC 3339). Check-in opens after this.
        #[arg(long)]
        ends_at: Timestamp,

        /// Hold new applications for operator screening before the host sees them.
        #[arg(long)]
        review: bool,
    },

    /// Show an experience and its seat count.
    Show {
        /// Experience ID.
        id: Uuid,
    },
}

pub(super) fn run(engine: &Engine, actor: &Actor, command: ExperienceCommand) -> Result<(), Failure> {
    match command {
        ExperienceCommand::Add {
            title,
            host,
            capacity,
            ends_at,
            review,
        } => {
            let ngo_id = organisation(actor, host.as_deref())?.to_string();
            let experience = engine.add_experience(
                actor,
                NewExperience {
                    ngo_id,
                    title,
                    capacity,
                    ends_at,
                    requires_admin_review: review,
                },
            )?;
            println!("{}", experience.id);
            Ok(())
        }
        ExperienceCommand::Show { id } => {
            let experience = engine.experience(id)?;
            if experience.is_full() {
                eprintln!("Full: all {} seats taken", experience.capacity);
            } else {
                eprintln!("{} of {} seats left", experience.seats_left(), experience.capacity);
            }
            print_json(&experience)
        }
    }
}
