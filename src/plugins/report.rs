//! Read-only aggregate reports over flights and pilots.
//!
//! Pilot-centric reports work on the role-unioned flight set: one entry per
//! (pilot, role, flight), so captain and first-officer assignments are counted
//! the same way.

use crate::core::error::RosterError;
use crate::core::output::{self, OutputFormat, Tabular};
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::crew::CrewRole;
use crate::plugins::flight::{self, Flight, FlightFilter, SortOrder};
use crate::plugins::pilot::{self, Pilot, PilotId};
use crate::plugins::punctuality::{self, Punctuality};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct CrewAssignment<'a> {
    pub pilot_id: PilotId,
    pub role: CrewRole,
    pub flight: &'a Flight,
}

/// Captain assignments followed by first-officer assignments.
pub fn role_unioned(flights: &[Flight]) -> Vec<CrewAssignment<'_>> {
    let captains = flights.iter().filter_map(|f| {
        f.captain_id.map(|pilot_id| CrewAssignment {
            pilot_id,
            role: CrewRole::Captain,
            flight: f,
        })
    });
    let first_officers = flights.iter().filter_map(|f| {
        f.first_officer_id.map(|pilot_id| CrewAssignment {
            pilot_id,
            role: CrewRole::FirstOfficer,
            flight: f,
        })
    });
    captains.chain(first_officers).collect()
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PilotFlightCount {
    pub pilot_id: PilotId,
    pub pilot_name: String,
    pub flight_count: usize,
}

/// Flights per pilot, every pilot included (0 when unassigned), busiest first.
pub fn pilot_flight_counts(pilots: &[Pilot], flights: &[Flight]) -> Vec<PilotFlightCount> {
    let mut counts: FxHashMap<PilotId, usize> = FxHashMap::default();
    for assignment in role_unioned(flights) {
        *counts.entry(assignment.pilot_id).or_default() += 1;
    }
    let mut report: Vec<PilotFlightCount> = pilots
        .iter()
        .map(|p| PilotFlightCount {
            pilot_id: p.pilot_id,
            pilot_name: p.name.clone(),
            flight_count: counts.get(&p.pilot_id).copied().unwrap_or(0),
        })
        .collect();
    report.sort_by(|a, b| {
        b.flight_count
            .cmp(&a.flight_count)
            .then(a.pilot_id.cmp(&b.pilot_id))
    });
    report
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MonthlyWorkload {
    /// `YYYY-MM` of the scheduled departure.
    pub month: String,
    pub pilot_name: String,
    pub flight_count: usize,
}

/// Flights per (month, pilot name); months ascending, busiest first within a month.
pub fn monthly_workload(pilots: &[Pilot], flights: &[Flight]) -> Vec<MonthlyWorkload> {
    let names: FxHashMap<PilotId, &str> =
        pilots.iter().map(|p| (p.pilot_id, p.name.as_str())).collect();
    let mut counts: FxHashMap<(String, String), usize> = FxHashMap::default();
    for assignment in role_unioned(flights) {
        let Some(name) = names.get(&assignment.pilot_id) else {
            continue;
        };
        let month = time::year_month(&assignment.flight.scheduled_departure);
        *counts.entry((month, name.to_string())).or_default() += 1;
    }
    let mut report: Vec<MonthlyWorkload> = counts
        .into_iter()
        .map(|((month, pilot_name), flight_count)| MonthlyWorkload {
            month,
            pilot_name,
            flight_count,
        })
        .collect();
    report.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then(b.flight_count.cmp(&a.flight_count))
            .then(a.pilot_name.cmp(&b.pilot_name))
    });
    report
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TerminalTraffic {
    pub destination_id: String,
    pub terminal_id: String,
    pub usage_count: usize,
}

/// Terminal usage across departure, arrival and diversion roles. A flight
/// that uses the same terminal in two roles counts twice.
pub fn terminal_traffic(flights: &[Flight]) -> Vec<TerminalTraffic> {
    let mut counts: FxHashMap<(&str, &str), usize> = FxHashMap::default();
    for f in flights {
        let usages = [
            Some((
                f.departure_destination_id.as_str(),
                f.departure_terminal_id.as_str(),
            )),
            f.arrival_terminal_id
                .as_deref()
                .map(|t| (f.arrival_destination_id.as_str(), t)),
            f.diversion_destination_id
                .as_deref()
                .zip(f.diversion_terminal_id.as_deref()),
        ];
        for usage in usages.into_iter().flatten() {
            *counts.entry(usage).or_default() += 1;
        }
    }
    let mut report: Vec<TerminalTraffic> = counts
        .into_iter()
        .map(|((destination_id, terminal_id), usage_count)| TerminalTraffic {
            destination_id: destination_id.to_string(),
            terminal_id: terminal_id.to_string(),
            usage_count,
        })
        .collect();
    report.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.destination_id.cmp(&b.destination_id))
            .then_with(|| a.terminal_id.cmp(&b.terminal_id))
    });
    report
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PilotPunctuality {
    pub pilot_id: PilotId,
    pub pilot_name: String,
    pub on_time_departures: usize,
    pub delayed_departures: usize,
    pub on_time_arrivals: usize,
    pub delayed_arrivals: usize,
}

/// Departure and arrival punctuality per pilot, counting only flights with at
/// least one actual timestamp. Most on-time departures first.
pub fn pilot_punctuality(pilots: &[Pilot], flights: &[Flight]) -> Vec<PilotPunctuality> {
    let names: FxHashMap<PilotId, &str> =
        pilots.iter().map(|p| (p.pilot_id, p.name.as_str())).collect();
    let mut tallies: FxHashMap<PilotId, PilotPunctuality> = FxHashMap::default();

    for assignment in role_unioned(flights) {
        if !assignment.flight.has_actuals() {
            continue;
        }
        let Some(name) = names.get(&assignment.pilot_id) else {
            continue;
        };
        let tally = tallies
            .entry(assignment.pilot_id)
            .or_insert_with(|| PilotPunctuality {
                pilot_id: assignment.pilot_id,
                pilot_name: name.to_string(),
                ..PilotPunctuality::default()
            });
        match punctuality::departure_status(assignment.flight) {
            Punctuality::OnTime => tally.on_time_departures += 1,
            Punctuality::Delayed => tally.delayed_departures += 1,
        }
        match punctuality::arrival_status(assignment.flight) {
            Punctuality::OnTime => tally.on_time_arrivals += 1,
            Punctuality::Delayed => tally.delayed_arrivals += 1,
        }
    }

    let mut report: Vec<PilotPunctuality> = tallies.into_values().collect();
    report.sort_by(|a, b| {
        b.on_time_departures
            .cmp(&a.on_time_departures)
            .then(a.pilot_id.cmp(&b.pilot_id))
    });
    report
}

fn load_roster(store: &Store, op: &str) -> Result<(Vec<Pilot>, Vec<Flight>), RosterError> {
    store.broker().with_read(op, |conn| {
        let pilots = pilot::load_pilots(conn)?;
        let flights = flight::load_flights(conn, &FlightFilter::default(), SortOrder::default())?;
        Ok((pilots, flights))
    })
}

pub fn report_pilot_flight_counts(store: &Store) -> Result<Vec<PilotFlightCount>, RosterError> {
    let (pilots, flights) = load_roster(store, "report.pilot_counts")?;
    Ok(pilot_flight_counts(&pilots, &flights))
}

pub fn report_monthly_workload(store: &Store) -> Result<Vec<MonthlyWorkload>, RosterError> {
    let (pilots, flights) = load_roster(store, "report.monthly")?;
    Ok(monthly_workload(&pilots, &flights))
}

pub fn report_terminal_traffic(store: &Store) -> Result<Vec<TerminalTraffic>, RosterError> {
    let flights = store.broker().with_read("report.terminals", |conn| {
        flight::load_flights(conn, &FlightFilter::default(), SortOrder::default())
    })?;
    Ok(terminal_traffic(&flights))
}

pub fn report_pilot_punctuality(store: &Store) -> Result<Vec<PilotPunctuality>, RosterError> {
    let (pilots, flights) = load_roster(store, "report.punctuality")?;
    Ok(pilot_punctuality(&pilots, &flights))
}

/// Flights whose scheduled departure is within `[start, end]` inclusive,
/// optionally only those where `pilot` holds either crew role.
pub fn flights_in_timeframe(
    store: &Store,
    start: NaiveDateTime,
    end: NaiveDateTime,
    pilot: Option<PilotId>,
) -> Result<Vec<Flight>, RosterError> {
    let filter = FlightFilter {
        departs_between: Some((start, end)),
        pilot,
        ..FlightFilter::default()
    };
    store.broker().with_read("report.timeframe", |conn| {
        flight::load_flights(conn, &filter, SortOrder::default())
    })
}

impl Tabular for PilotFlightCount {
    fn headers() -> &'static [&'static str] {
        &["pilotID", "pilotName", "flightCount"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.pilot_id.to_string(),
            self.pilot_name.clone(),
            self.flight_count.to_string(),
        ]
    }
}

impl Tabular for MonthlyWorkload {
    fn headers() -> &'static [&'static str] {
        &["month", "pilotName", "flightCount"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.month.clone(),
            self.pilot_name.clone(),
            self.flight_count.to_string(),
        ]
    }
}

impl Tabular for TerminalTraffic {
    fn headers() -> &'static [&'static str] {
        &["destinationID", "terminalID", "usageCount"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.destination_id.clone(),
            self.terminal_id.clone(),
            self.usage_count.to_string(),
        ]
    }
}

impl Tabular for PilotPunctuality {
    fn headers() -> &'static [&'static str] {
        &[
            "pilotID",
            "pilotName",
            "onTimeDepartures",
            "delayedDepartures",
            "onTimeArrivals",
            "delayedArrivals",
        ]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.pilot_id.to_string(),
            self.pilot_name.clone(),
            self.on_time_departures.to_string(),
            self.delayed_departures.to_string(),
            self.on_time_arrivals.to_string(),
            self.delayed_arrivals.to_string(),
        ]
    }
}

#[derive(Parser, Debug)]
#[clap(name = "report", about = "Workload, traffic and punctuality reports.")]
pub struct ReportCli {
    #[clap(subcommand)]
    pub command: ReportCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Flights per pilot, including pilots with none.
    PilotCounts,
    /// Flights per pilot per month.
    Monthly,
    /// Terminal usage across departure, arrival and diversion.
    Terminals,
    /// On-time vs delayed departures and arrivals per pilot.
    Punctuality,
    /// Departure/arrival status per flight.
    Performance,
    /// Flights departing within an inclusive range, optionally for one pilot.
    Timeframe {
        /// Range start: YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS].
        #[clap(long)]
        from: String,
        /// Range end: YYYY-MM-DD (whole day) or YYYY-MM-DD HH:MM[:SS].
        #[clap(long)]
        until: String,
        #[clap(long)]
        pilot: Option<PilotId>,
    },
}

pub fn run_report_cli(store: &Store, cli: ReportCli, format: OutputFormat) -> Result<(), RosterError> {
    match cli.command {
        ReportCommand::PilotCounts => {
            output::print_rows(&report_pilot_flight_counts(store)?, "report.pilot_counts", format)
        }
        ReportCommand::Monthly => {
            output::print_rows(&report_monthly_workload(store)?, "report.monthly", format)
        }
        ReportCommand::Terminals => {
            output::print_rows(&report_terminal_traffic(store)?, "report.terminals", format)
        }
        ReportCommand::Punctuality => {
            output::print_rows(&report_pilot_punctuality(store)?, "report.punctuality", format)
        }
        ReportCommand::Performance => output::print_rows(
            &punctuality::performance_report(store)?,
            "report.performance",
            format,
        ),
        ReportCommand::Timeframe { from, until, pilot } => {
            let start = time::parse_range_start(&from)?;
            let end = time::parse_range_end(&until)?;
            let flights = flights_in_timeframe(store, start, end, pilot)?;
            output::print_rows(&flights, "report.timeframe", format);
        }
    }
    Ok(())
}
