//! CLI struct definitions for the skyroster command-line interface.
//!
//! Top-level clap types live here; each plugin owns its own subcommand tree.

use crate::core::output::OutputFormat;
use crate::plugins::{crew, destination, flight, pilot, report};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "skyroster",
    version = env!("CARGO_PKG_VERSION"),
    about = "Flight scheduling and crew assignment over a local SQLite roster."
)]
pub(crate) struct Cli {
    /// Store root (defaults to $SKYROSTER_ROOT, then ./.skyroster).
    #[clap(long, global = true)]
    pub root: Option<PathBuf>,
    /// Output format for listings, reports and write results.
    #[clap(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub(crate) struct InitCli {
    /// Drop all roster tables and views before creating them.
    #[clap(long)]
    pub reset: bool,
}

#[derive(clap::Args, Debug)]
pub(crate) struct AuditCli {
    /// Show only the most recent N events.
    #[clap(long)]
    pub tail: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create the roster database schema
    #[clap(name = "init", visible_alias = "i")]
    Init(InitCli),

    /// Destinations and their terminals
    #[clap(name = "destination", visible_alias = "dest")]
    Destination(destination::DestinationCli),

    /// Pilot records and qualifications
    #[clap(name = "pilot", visible_alias = "p")]
    Pilot(pilot::PilotCli),

    /// Flight records, search and projection
    #[clap(name = "flight", visible_alias = "f")]
    Flight(flight::FlightCli),

    /// Crew assignment and pilot availability
    #[clap(name = "crew", visible_alias = "c")]
    Crew(crew::CrewCli),

    /// Aggregate reports
    #[clap(name = "report", visible_alias = "r")]
    Report(report::ReportCli),

    /// Show the operation audit log
    #[clap(name = "audit")]
    Audit(AuditCli),
}
