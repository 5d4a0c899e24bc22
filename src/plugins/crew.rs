//! Crew assignment and pilot availability.
//!
//! A pilot is busy during `[scheduled_departure, scheduled_arrival]` of every
//! flight on which they hold either crew role. Intervals that only touch at an
//! endpoint do not overlap.

use crate::core::error::RosterError;
use crate::core::output::{self, OutputFormat};
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::flight::{self, Flight, FlightFilter, FlightKey, FlightKeyArgs, SortOrder};
use crate::plugins::pilot::{self, Pilot, PilotId};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum CrewRole {
    Captain,
    FirstOfficer,
}

impl CrewRole {
    pub fn column(&self) -> &'static str {
        match self {
            CrewRole::Captain => "captain_id",
            CrewRole::FirstOfficer => "first_officer_id",
        }
    }

    /// Whether the pilot's qualification flags cover this role.
    pub fn is_qualified(&self, pilot: &Pilot) -> bool {
        match self {
            CrewRole::Captain => pilot.is_captain_qualified,
            CrewRole::FirstOfficer => pilot.is_first_officer_qualified,
        }
    }
}

impl std::fmt::Display for CrewRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrewRole::Captain => write!(f, "Captain"),
            CrewRole::FirstOfficer => write!(f, "First Officer"),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AssignOutcome {
    /// 0 when no scheduled flight matched the key.
    pub rows_affected: usize,
    /// Set when the pilot lacks the qualification flag for the role.
    /// Assignment is not blocked by it.
    pub qualification_warning: Option<String>,
}

impl AssignOutcome {
    pub fn is_assigned(&self) -> bool {
        self.rows_affected > 0
    }
}

/// Put `pilot_id` into `role` on the flight with `key`.
///
/// Only flights whose status is exactly `Scheduled` accept assignment; for
/// any other status, or an unknown key, nothing changes and
/// `rows_affected` is 0. A pilot id with no pilot behind it fails as
/// `IntegrityViolation`.
pub fn assign_pilot_to_flight(
    store: &Store,
    key: &FlightKey,
    pilot_id: PilotId,
    role: CrewRole,
) -> Result<AssignOutcome, RosterError> {
    let sql = format!(
        "UPDATE flights SET {} = ?1
         WHERE flight_id = ?2 AND scheduled_departure = ?3 AND status = 'Scheduled'",
        role.column()
    );
    store.broker().with_write("crew.assign", |conn| {
        let rows_affected = conn
            .execute(&sql, params![pilot_id, key.flight_id, key.scheduled_departure])
            .map_err(RosterError::from_write)?;

        let qualification_warning = if rows_affected > 0 {
            pilot::find_pilot(conn, pilot_id)?
                .filter(|p| !role.is_qualified(p))
                .map(|p| {
                    format!(
                        "pilot {} ({}) is not flagged as {} qualified",
                        p.pilot_id, p.name, role
                    )
                })
        } else {
            None
        };

        Ok(AssignOutcome {
            rows_affected,
            qualification_warning,
        })
    })
}

/// Closed-interval overlap with strict comparison: `[a, b]` and `[c, d]`
/// overlap iff `a < d && c < b`.
pub fn intervals_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Pilots holding any crew role on a flight that overlaps `[start, end]`.
pub fn busy_pilots(flights: &[Flight], start: NaiveDateTime, end: NaiveDateTime) -> BTreeSet<PilotId> {
    flights
        .iter()
        .filter(|f| intervals_overlap(f.scheduled_departure, f.scheduled_arrival, start, end))
        .flat_map(|f| [f.captain_id, f.first_officer_id])
        .flatten()
        .collect()
}

/// Every pilot not in `busy_pilots`, ordered by pilot id.
pub fn available_pilots(
    pilots: &[Pilot],
    flights: &[Flight],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Pilot> {
    let busy = busy_pilots(flights, start, end);
    let mut available: Vec<Pilot> = pilots
        .iter()
        .filter(|p| !busy.contains(&p.pilot_id))
        .cloned()
        .collect();
    available.sort_by_key(|p| p.pilot_id);
    available
}

pub fn find_available_pilots(
    store: &Store,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<Pilot>, RosterError> {
    if end < start {
        return Err(RosterError::InvalidInput(format!(
            "period end {} is before period start {}",
            time::format_datetime(&end),
            time::format_datetime(&start)
        )));
    }
    store.broker().with_read("crew.available", |conn| {
        let pilots = pilot::load_pilots(conn)?;
        let flights = flight::load_flights(conn, &FlightFilter::default(), SortOrder::default())?;
        Ok(available_pilots(&pilots, &flights, start, end))
    })
}

/// Scheduled flights with at least one empty crew role.
pub fn find_unassigned_flights(store: &Store) -> Result<Vec<Flight>, RosterError> {
    let filter = FlightFilter {
        unassigned: true,
        ..FlightFilter::default()
    };
    store.broker().with_read("crew.unassigned", |conn| {
        flight::load_flights(conn, &filter, SortOrder::default())
    })
}

#[derive(Parser, Debug)]
#[clap(name = "crew", about = "Assign pilots to flights and check availability.")]
pub struct CrewCli {
    #[clap(subcommand)]
    pub command: CrewCommand,
}

#[derive(Subcommand, Debug)]
pub enum CrewCommand {
    /// Assign a pilot to a scheduled flight.
    Assign {
        #[clap(flatten)]
        key: FlightKeyArgs,
        #[clap(long)]
        pilot: PilotId,
        #[clap(long, value_enum)]
        role: CrewRole,
    },
    /// List pilots with no crew role on any flight overlapping the period.
    Available {
        /// Period start, YYYY-MM-DD HH:MM[:SS].
        #[clap(long)]
        from: String,
        /// Period end, YYYY-MM-DD HH:MM[:SS].
        #[clap(long)]
        until: String,
    },
    /// List scheduled flights missing a captain or first officer.
    Unassigned,
}

pub fn run_crew_cli(store: &Store, cli: CrewCli, format: OutputFormat) -> Result<(), RosterError> {
    match cli.command {
        CrewCommand::Assign { key, pilot, role } => {
            let key = key.key()?;
            let outcome = assign_pilot_to_flight(store, &key, pilot, role)?;
            let message = if outcome.is_assigned() {
                format!("Pilot {} assigned as {} on {}.", pilot, role, key)
            } else {
                format!(
                    "No scheduled flight {}; nothing assigned (flights that are in-air, landed or cancelled cannot be reassigned).",
                    key
                )
            };
            output::print_write("crew.assign", outcome.rows_affected, &message, format);
            if let Some(warning) = outcome.qualification_warning {
                output::print_error(&format!("warning: {}", warning));
            }
        }
        CrewCommand::Available { from, until } => {
            let start = time::parse_datetime(&from)?;
            let end = time::parse_datetime(&until)?;
            let pilots = find_available_pilots(store, start, end)?;
            output::print_rows(&pilots, "crew.available", format);
        }
        CrewCommand::Unassigned => {
            let flights = find_unassigned_flights(store)?;
            output::print_rows(&flights, "crew.unassigned", format);
        }
    }
    Ok(())
}
