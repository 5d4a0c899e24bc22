//! skyroster: flight scheduling and crew assignment over a local SQLite roster.
//!
//! An operator records destinations (with their terminals), pilots and
//! flights, assigns pilots to scheduled flights, and runs read-only reports
//! over the result.
//!
//! # Architecture
//!
//! ## The Thin Waist
//!
//! Every database access goes through `DbBroker`:
//! - one connection per operation, closed on return
//! - one transaction per write, committed whole or rolled back whole
//! - one audit line per operation (`roster.events.jsonl`)
//!
//! Integrity (keys, references, allowed status values, the rule that
//! non-scheduled flights are fully crewed) is enforced by the schema. Rejected
//! writes surface as `RosterError::IntegrityViolation` with the cause
//! classified.
//!
//! ## Plugins
//!
//! - `destination`: destinations and terminals
//! - `pilot`: pilots and role qualifications
//! - `flight`: flight records, criteria search, projection
//! - `crew`: crew assignment, pilot availability
//! - `punctuality`: derived on-time/delayed status
//! - `report`: workload, terminal traffic and punctuality aggregates
//!
//! # Examples
//!
//! ```bash
//! skyroster init
//! skyroster destination add --id LHR --name Heathrow --country UK --city London
//! skyroster pilot add --name "Ada Park" --email ada@example.com --dob 1984-02-11 --captain
//! skyroster crew available --from "2025-03-01 06:00" --until "2025-03-01 10:00"
//! skyroster report terminals --format json
//! ```

pub mod core;
pub mod plugins;

mod cli;
mod subsystems;

pub use subsystems::initialize_db;

use crate::cli::{Cli, Command};
use crate::core::broker;
use crate::core::error::RosterError;
use crate::core::output;
use crate::core::store::{self, Store};
use crate::plugins::{crew, destination, flight, pilot, report};

use clap::Parser;

pub fn run() -> Result<(), RosterError> {
    let cli = Cli::parse();
    let root = store::resolve_root(cli.root)?;
    let store = Store::open(&root)?;
    let format = cli.format;

    match cli.command {
        Command::Init(init) => {
            let steps = initialize_db(&store, init.reset)?;
            let message = format!(
                "Roster initialized at {} ({}).",
                store.db_path().display(),
                steps.join(", ")
            );
            output::print_write("init", steps.len(), &message, format);
        }
        Command::Destination(cli) => destination::run_destination_cli(&store, cli, format)?,
        Command::Pilot(cli) => pilot::run_pilot_cli(&store, cli, format)?,
        Command::Flight(cli) => flight::run_flight_cli(&store, cli, format)?,
        Command::Crew(cli) => crew::run_crew_cli(&store, cli, format)?,
        Command::Report(cli) => report::run_report_cli(&store, cli, format)?,
        Command::Audit(audit) => {
            let mut events = broker::read_audit_log(&store)?;
            if let Some(n) = audit.tail {
                let skip = events.len().saturating_sub(n);
                events.drain(..skip);
            }
            output::print_rows(&events, "audit", format);
        }
    }
    Ok(())
}
