//! Flights keyed on `(flight_id, scheduled_departure)`.
//!
//! The same flight number recurs at different scheduled times; each instance is
//! its own record. Every identifier that reaches SQL text comes from
//! `FlightColumn`; every value is a bound parameter.

use crate::core::error::RosterError;
use crate::core::output::{self, OutputFormat, Table, Tabular};
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::destination::validate_destination_code;
use crate::plugins::pilot::PilotId;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlightStatus {
    #[default]
    Scheduled,
    #[serde(rename = "In-air")]
    InAir,
    Landed,
    Cancelled,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 4] = [
        FlightStatus::Scheduled,
        FlightStatus::InAir,
        FlightStatus::Landed,
        FlightStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "Scheduled",
            FlightStatus::InAir => "In-air",
            FlightStatus::Landed => "Landed",
            FlightStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = RosterError;

    /// Case-insensitive; `in-air`, `in air` and `inair` all name the same status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "scheduled" => Ok(FlightStatus::Scheduled),
            "inair" => Ok(FlightStatus::InAir),
            "landed" => Ok(FlightStatus::Landed),
            "cancelled" => Ok(FlightStatus::Cancelled),
            _ => Err(RosterError::InvalidInput(format!(
                "'{}' is not a flight status (Scheduled, In-air, Landed, Cancelled)",
                s
            ))),
        }
    }
}

/// True when `value` names one of the four flight statuses.
pub fn validate_status(value: &str) -> bool {
    value.parse::<FlightStatus>().is_ok()
}

impl ToSql for FlightStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FlightStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse::<FlightStatus>()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightKey {
    pub flight_id: String,
    pub scheduled_departure: NaiveDateTime,
}

impl FlightKey {
    pub fn new(flight_id: &str, scheduled_departure: NaiveDateTime) -> Self {
        Self {
            flight_id: flight_id.trim().to_string(),
            scheduled_departure,
        }
    }

    /// Parse a key from raw CLI input.
    pub fn parse(flight_id: &str, scheduled_departure: &str) -> Result<Self, RosterError> {
        let flight_id = flight_id.trim();
        if flight_id.is_empty() {
            return Err(RosterError::InvalidInput(
                "flight id must not be empty".to_string(),
            ));
        }
        Ok(Self::new(flight_id, time::parse_datetime(scheduled_departure)?))
    }
}

impl std::fmt::Display for FlightKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {}",
            self.flight_id,
            time::format_datetime(&self.scheduled_departure)
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Flight {
    pub flight_id: String,
    pub scheduled_departure: NaiveDateTime,
    pub status: FlightStatus,
    pub captain_id: Option<PilotId>,
    pub first_officer_id: Option<PilotId>,
    pub arrival_destination_id: String,
    pub departure_destination_id: String,
    pub diversion_destination_id: Option<String>,
    pub departure_terminal_id: String,
    pub arrival_terminal_id: Option<String>,
    pub diversion_terminal_id: Option<String>,
    pub scheduled_arrival: NaiveDateTime,
    pub actual_arrival: Option<NaiveDateTime>,
    pub actual_departure: Option<NaiveDateTime>,
}

impl Flight {
    pub fn key(&self) -> FlightKey {
        FlightKey::new(&self.flight_id, self.scheduled_departure)
    }

    /// True while either crew role is still empty.
    pub fn is_unassigned(&self) -> bool {
        self.captain_id.is_none() || self.first_officer_id.is_none()
    }

    pub fn has_actuals(&self) -> bool {
        self.actual_departure.is_some() || self.actual_arrival.is_some()
    }
}

/// Every flight column, in table order. This is the allow-list for updates,
/// projections and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightColumn {
    FlightId,
    ScheduledDeparture,
    Status,
    CaptainId,
    FirstOfficerId,
    ArrivalDestinationId,
    DepartureDestinationId,
    DiversionDestinationId,
    DepartureTerminalId,
    ArrivalTerminalId,
    DiversionTerminalId,
    ScheduledArrival,
    ActualArrival,
    ActualDeparture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Status,
    DateTime,
    PilotRef,
    DestinationRef,
}

impl FlightColumn {
    pub const ALL: [FlightColumn; 14] = [
        FlightColumn::FlightId,
        FlightColumn::ScheduledDeparture,
        FlightColumn::Status,
        FlightColumn::CaptainId,
        FlightColumn::FirstOfficerId,
        FlightColumn::ArrivalDestinationId,
        FlightColumn::DepartureDestinationId,
        FlightColumn::DiversionDestinationId,
        FlightColumn::DepartureTerminalId,
        FlightColumn::ArrivalTerminalId,
        FlightColumn::DiversionTerminalId,
        FlightColumn::ScheduledArrival,
        FlightColumn::ActualArrival,
        FlightColumn::ActualDeparture,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            FlightColumn::FlightId => "flight_id",
            FlightColumn::ScheduledDeparture => "scheduled_departure",
            FlightColumn::Status => "status",
            FlightColumn::CaptainId => "captain_id",
            FlightColumn::FirstOfficerId => "first_officer_id",
            FlightColumn::ArrivalDestinationId => "arrival_destination_id",
            FlightColumn::DepartureDestinationId => "departure_destination_id",
            FlightColumn::DiversionDestinationId => "diversion_destination_id",
            FlightColumn::DepartureTerminalId => "departure_terminal_id",
            FlightColumn::ArrivalTerminalId => "arrival_terminal_id",
            FlightColumn::DiversionTerminalId => "diversion_terminal_id",
            FlightColumn::ScheduledArrival => "scheduled_arrival",
            FlightColumn::ActualArrival => "actual_arrival",
            FlightColumn::ActualDeparture => "actual_departure",
        }
    }

    /// Header label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            FlightColumn::FlightId => "flightID",
            FlightColumn::ScheduledDeparture => "scheduledDepartureDateTime",
            FlightColumn::Status => "status",
            FlightColumn::CaptainId => "captainID",
            FlightColumn::FirstOfficerId => "firstOfficerID",
            FlightColumn::ArrivalDestinationId => "arrivalDestinationID",
            FlightColumn::DepartureDestinationId => "departureDestinationID",
            FlightColumn::DiversionDestinationId => "diversionDestinationID",
            FlightColumn::DepartureTerminalId => "departureTerminalID",
            FlightColumn::ArrivalTerminalId => "arrivalTerminalID",
            FlightColumn::DiversionTerminalId => "diversionTerminalID",
            FlightColumn::ScheduledArrival => "scheduledArrivalDateTime",
            FlightColumn::ActualArrival => "actualArrivalDateTime",
            FlightColumn::ActualDeparture => "actualDepartureDateTime",
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            FlightColumn::CaptainId
                | FlightColumn::FirstOfficerId
                | FlightColumn::DiversionDestinationId
                | FlightColumn::ArrivalTerminalId
                | FlightColumn::DiversionTerminalId
                | FlightColumn::ActualArrival
                | FlightColumn::ActualDeparture
        )
    }

    fn kind(&self) -> ColumnKind {
        match self {
            FlightColumn::Status => ColumnKind::Status,
            FlightColumn::ScheduledDeparture
            | FlightColumn::ScheduledArrival
            | FlightColumn::ActualArrival
            | FlightColumn::ActualDeparture => ColumnKind::DateTime,
            FlightColumn::CaptainId | FlightColumn::FirstOfficerId => ColumnKind::PilotRef,
            FlightColumn::ArrivalDestinationId
            | FlightColumn::DepartureDestinationId
            | FlightColumn::DiversionDestinationId => ColumnKind::DestinationRef,
            FlightColumn::FlightId
            | FlightColumn::DepartureTerminalId
            | FlightColumn::ArrivalTerminalId
            | FlightColumn::DiversionTerminalId => ColumnKind::Text,
        }
    }

    /// Validate a raw value for this column and convert it to a bound parameter.
    /// An empty value or `null` clears a nullable column.
    pub fn parse_value(&self, raw: &str) -> Result<SqlValue, RosterError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            if self.is_nullable() {
                return Ok(SqlValue::Null);
            }
            return Err(RosterError::InvalidInput(format!(
                "{} is required and cannot be cleared",
                self.label()
            )));
        }
        let value = match self.kind() {
            ColumnKind::Text => SqlValue::Text(trimmed.to_string()),
            ColumnKind::Status => SqlValue::Text(trimmed.parse::<FlightStatus>()?.as_str().to_string()),
            ColumnKind::DateTime => {
                SqlValue::Text(time::format_datetime(&time::parse_datetime(trimmed)?))
            }
            ColumnKind::PilotRef => {
                let id = trimmed.parse::<PilotId>().map_err(|_| {
                    RosterError::InvalidInput(format!("'{}' is not a pilot id", trimmed))
                })?;
                SqlValue::Integer(id)
            }
            ColumnKind::DestinationRef => SqlValue::Text(validate_destination_code(trimmed)?),
        };
        Ok(value)
    }
}

impl FromStr for FlightColumn {
    type Err = RosterError;

    /// Accepts the snake_case column name or the camelCase header label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FlightColumn::ALL
            .into_iter()
            .find(|c| c.column().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                RosterError::InvalidInput(format!("'{}' is not a flight attribute", s))
            })
    }
}

/// Parse a comma-separated column list; an empty list means every column.
pub fn parse_columns(raw: Option<&str>) -> Result<Vec<FlightColumn>, RosterError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(FlightColumn::ALL.to_vec()),
        Some(list) => list.split(',').map(str::parse).collect(),
    }
}

/// Combinable flight filters. Every set field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct FlightFilter {
    pub status: Option<FlightStatus>,
    pub arrival_destination: Option<String>,
    pub departure_destination: Option<String>,
    pub departure_date: Option<NaiveDate>,
    /// Inclusive scheduled-departure range.
    pub departs_between: Option<(NaiveDateTime, NaiveDateTime)>,
    /// Flights where this pilot holds either crew role.
    pub pilot: Option<PilotId>,
    /// Scheduled flights with at least one empty crew role.
    pub unassigned: bool,
}

impl FlightFilter {
    fn where_clause(&self) -> Result<(String, Vec<Box<dyn ToSql>>), RosterError> {
        let mut clause = " WHERE 1=1".to_string();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = self.status {
            clause.push_str(" AND status = ?");
            params.push(Box::new(status));
        }
        if let Some(code) = &self.arrival_destination {
            clause.push_str(" AND arrival_destination_id = ?");
            params.push(Box::new(validate_destination_code(code)?));
        }
        if let Some(code) = &self.departure_destination {
            clause.push_str(" AND departure_destination_id = ?");
            params.push(Box::new(validate_destination_code(code)?));
        }
        if let Some(date) = self.departure_date {
            clause.push_str(" AND substr(scheduled_departure, 1, 10) = ?");
            params.push(Box::new(date.format("%Y-%m-%d").to_string()));
        }
        if let Some((start, end)) = self.departs_between {
            if end < start {
                return Err(RosterError::InvalidInput(format!(
                    "range end {} is before start {}",
                    time::format_datetime(&end),
                    time::format_datetime(&start)
                )));
            }
            clause.push_str(" AND scheduled_departure >= ? AND scheduled_departure <= ?");
            params.push(Box::new(time::format_datetime(&start)));
            params.push(Box::new(time::format_datetime(&end)));
        }
        if let Some(pilot_id) = self.pilot {
            clause.push_str(" AND (captain_id = ? OR first_officer_id = ?)");
            params.push(Box::new(pilot_id));
            params.push(Box::new(pilot_id));
        }
        if self.unassigned {
            clause.push_str(
                " AND (captain_id IS NULL OR first_officer_id IS NULL) AND status = 'Scheduled'",
            );
        }
        Ok((clause, params))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: FlightColumn,
    pub descending: bool,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            column: FlightColumn::ScheduledDeparture,
            descending: false,
        }
    }
}

impl SortOrder {
    fn clause(&self) -> String {
        let dir = if self.descending { "DESC" } else { "ASC" };
        format!(
            " ORDER BY {} {}, scheduled_departure ASC, flight_id ASC",
            self.column.column(),
            dir
        )
    }
}

const FLIGHT_SELECT: &str = "SELECT flight_id, scheduled_departure, status, captain_id, first_officer_id,
    arrival_destination_id, departure_destination_id, diversion_destination_id,
    departure_terminal_id, arrival_terminal_id, diversion_terminal_id,
    scheduled_arrival, actual_arrival, actual_departure FROM flights";

fn flight_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Flight> {
    Ok(Flight {
        flight_id: row.get(0)?,
        scheduled_departure: row.get(1)?,
        status: row.get(2)?,
        captain_id: row.get(3)?,
        first_officer_id: row.get(4)?,
        arrival_destination_id: row.get(5)?,
        departure_destination_id: row.get(6)?,
        diversion_destination_id: row.get(7)?,
        departure_terminal_id: row.get(8)?,
        arrival_terminal_id: row.get(9)?,
        diversion_terminal_id: row.get(10)?,
        scheduled_arrival: row.get(11)?,
        actual_arrival: row.get(12)?,
        actual_departure: row.get(13)?,
    })
}

fn normalize(flight: &Flight) -> Result<Flight, RosterError> {
    let flight_id = flight.flight_id.trim().to_string();
    if flight_id.is_empty() {
        return Err(RosterError::InvalidInput(
            "flight id must not be empty".to_string(),
        ));
    }
    let departure_terminal_id = flight.departure_terminal_id.trim().to_string();
    if departure_terminal_id.is_empty() {
        return Err(RosterError::InvalidInput(
            "departure terminal must not be empty".to_string(),
        ));
    }
    if flight.scheduled_arrival < flight.scheduled_departure {
        return Err(RosterError::InvalidInput(format!(
            "scheduled arrival {} is before scheduled departure {}",
            time::format_datetime(&flight.scheduled_arrival),
            time::format_datetime(&flight.scheduled_departure)
        )));
    }
    let optional_text = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Ok(Flight {
        flight_id,
        scheduled_departure: flight.scheduled_departure,
        status: flight.status,
        captain_id: flight.captain_id,
        first_officer_id: flight.first_officer_id,
        arrival_destination_id: validate_destination_code(&flight.arrival_destination_id)?,
        departure_destination_id: validate_destination_code(&flight.departure_destination_id)?,
        diversion_destination_id: flight
            .diversion_destination_id
            .as_deref()
            .map(validate_destination_code)
            .transpose()?,
        departure_terminal_id,
        arrival_terminal_id: optional_text(&flight.arrival_terminal_id),
        diversion_terminal_id: optional_text(&flight.diversion_terminal_id),
        scheduled_arrival: flight.scheduled_arrival,
        actual_arrival: flight.actual_arrival,
        actual_departure: flight.actual_departure,
    })
}

/// Insert a flight. Duplicate keys and dangling references fail as
/// `IntegrityViolation` and leave nothing behind.
pub fn add_flight(store: &Store, flight: &Flight) -> Result<FlightKey, RosterError> {
    let f = normalize(flight)?;
    store.broker().with_write("flight.add", |conn| {
        conn.execute(
            "INSERT INTO flights(flight_id, scheduled_departure, status, captain_id, first_officer_id,
                arrival_destination_id, departure_destination_id, diversion_destination_id,
                departure_terminal_id, arrival_terminal_id, diversion_terminal_id,
                scheduled_arrival, actual_arrival, actual_departure)
             VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                f.flight_id,
                f.scheduled_departure,
                f.status,
                f.captain_id,
                f.first_officer_id,
                f.arrival_destination_id,
                f.departure_destination_id,
                f.diversion_destination_id,
                f.departure_terminal_id,
                f.arrival_terminal_id,
                f.diversion_terminal_id,
                f.scheduled_arrival,
                f.actual_arrival,
                f.actual_departure
            ],
        )
        .map_err(RosterError::from_write)?;
        Ok(f.key())
    })
}

pub fn get_flight(store: &Store, key: &FlightKey) -> Result<Option<Flight>, RosterError> {
    store
        .broker()
        .with_read("flight.get", |conn| find_flight(conn, key))
}

pub(crate) fn find_flight(conn: &Connection, key: &FlightKey) -> Result<Option<Flight>, RosterError> {
    let sql = format!(
        "{} WHERE flight_id = ?1 AND scheduled_departure = ?2",
        FLIGHT_SELECT
    );
    let flight = conn
        .query_row(
            &sql,
            params![key.flight_id, key.scheduled_departure],
            flight_from_row,
        )
        .optional()?;
    Ok(flight)
}

pub fn list_flights(
    store: &Store,
    filter: &FlightFilter,
    order: SortOrder,
) -> Result<Vec<Flight>, RosterError> {
    store
        .broker()
        .with_read("flight.list", |conn| load_flights(conn, filter, order))
}

pub(crate) fn load_flights(
    conn: &Connection,
    filter: &FlightFilter,
    order: SortOrder,
) -> Result<Vec<Flight>, RosterError> {
    let (clause, params) = filter.where_clause()?;
    let sql = format!("{}{}{}", FLIGHT_SELECT, clause, order.clause());
    let mut stmt = conn.prepare(&sql)?;
    let params_as_dyn: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(&params_as_dyn[..], flight_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Query flights returning only the chosen columns, labelled for display.
pub fn project_flights(
    store: &Store,
    filter: &FlightFilter,
    columns: &[FlightColumn],
    order: SortOrder,
) -> Result<Table, RosterError> {
    let columns = if columns.is_empty() {
        FlightColumn::ALL.to_vec()
    } else {
        columns.to_vec()
    };
    let (clause, params) = filter.where_clause()?;
    let select = columns
        .iter()
        .map(FlightColumn::column)
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {} FROM flights{}{}", select, clause, order.clause());

    store.broker().with_read("flight.project", |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let params_as_dyn: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let width = columns.len();
        let rows = stmt.query_map(&params_as_dyn[..], |row| {
            (0..width)
                .map(|i| row.get::<_, SqlValue>(i).map(|v| display_value(&v)))
                .collect::<rusqlite::Result<Vec<String>>>()
        })?;
        Ok(Table {
            headers: columns.iter().map(|c| c.label().to_string()).collect(),
            rows: rows.collect::<Result<Vec<_>, _>>()?,
        })
    })
}

fn display_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(r) => r.to_string(),
        SqlValue::Text(t) => t.clone(),
        SqlValue::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Update one attribute of the flight with this key. Returns rows affected;
/// 0 means no flight has the key.
pub fn update_flight(
    store: &Store,
    key: &FlightKey,
    column: FlightColumn,
    raw_value: &str,
) -> Result<usize, RosterError> {
    let value = column.parse_value(raw_value)?;
    let sql = format!(
        "UPDATE flights SET {} = ?1 WHERE flight_id = ?2 AND scheduled_departure = ?3",
        column.column()
    );
    store.broker().with_write("flight.update", |conn| {
        conn.execute(&sql, params![value, key.flight_id, key.scheduled_departure])
            .map_err(RosterError::from_write)
    })
}

/// Delete the flight with this key. Returns rows affected.
pub fn delete_flight(store: &Store, key: &FlightKey) -> Result<usize, RosterError> {
    store.broker().with_write("flight.delete", |conn| {
        conn.execute(
            "DELETE FROM flights WHERE flight_id = ?1 AND scheduled_departure = ?2",
            params![key.flight_id, key.scheduled_departure],
        )
        .map_err(RosterError::from_write)
    })
}

impl Tabular for Flight {
    fn headers() -> &'static [&'static str] {
        &[
            "flightID",
            "scheduledDepartureDateTime",
            "status",
            "captainID",
            "firstOfficerID",
            "departureDestinationID",
            "departureTerminalID",
            "arrivalDestinationID",
            "arrivalTerminalID",
            "diversionDestinationID",
            "diversionTerminalID",
            "scheduledArrivalDateTime",
            "actualDepartureDateTime",
            "actualArrivalDateTime",
        ]
    }
    fn cells(&self) -> Vec<String> {
        let id = |v: Option<PilotId>| v.map(|i| i.to_string()).unwrap_or_default();
        vec![
            self.flight_id.clone(),
            time::format_datetime(&self.scheduled_departure),
            self.status.to_string(),
            id(self.captain_id),
            id(self.first_officer_id),
            self.departure_destination_id.clone(),
            self.departure_terminal_id.clone(),
            self.arrival_destination_id.clone(),
            self.arrival_terminal_id.clone().unwrap_or_default(),
            self.diversion_destination_id.clone().unwrap_or_default(),
            self.diversion_terminal_id.clone().unwrap_or_default(),
            time::format_datetime(&self.scheduled_arrival),
            time::format_optional(&self.actual_departure),
            time::format_optional(&self.actual_arrival),
        ]
    }
}

#[derive(Parser, Debug)]
#[clap(name = "flight", about = "Manage flights keyed on flight number and scheduled departure.")]
pub struct FlightCli {
    #[clap(subcommand)]
    pub command: FlightCommand,
}

#[derive(clap::Args, Debug)]
pub struct FlightKeyArgs {
    /// Flight number, e.g. EZY2101.
    #[clap(long)]
    pub flight_id: String,
    /// Scheduled departure, YYYY-MM-DD HH:MM[:SS].
    #[clap(long)]
    pub departs: String,
}

impl FlightKeyArgs {
    pub fn key(&self) -> Result<FlightKey, RosterError> {
        FlightKey::parse(&self.flight_id, &self.departs)
    }
}

#[derive(Subcommand, Debug)]
pub enum FlightCommand {
    /// Add a flight.
    Add {
        #[clap(flatten)]
        key: FlightKeyArgs,
        /// Scheduled arrival, YYYY-MM-DD HH:MM[:SS].
        #[clap(long)]
        arrives: String,
        #[clap(long, default_value = "Scheduled")]
        status: String,
        #[clap(long)]
        captain: Option<PilotId>,
        #[clap(long)]
        first_officer: Option<PilotId>,
        /// Departure destination code.
        #[clap(long)]
        from: String,
        /// Arrival destination code.
        #[clap(long)]
        to: String,
        #[clap(long)]
        diversion: Option<String>,
        #[clap(long)]
        departure_terminal: String,
        #[clap(long)]
        arrival_terminal: Option<String>,
        #[clap(long)]
        diversion_terminal: Option<String>,
        #[clap(long)]
        actual_departure: Option<String>,
        #[clap(long)]
        actual_arrival: Option<String>,
    },
    /// Show one flight.
    Get {
        #[clap(flatten)]
        key: FlightKeyArgs,
    },
    /// View flights by criteria; filters combine.
    List {
        #[clap(long)]
        status: Option<String>,
        /// Arrival destination code.
        #[clap(long)]
        arrival: Option<String>,
        /// Departure destination code.
        #[clap(long)]
        departure: Option<String>,
        /// Scheduled departure date, YYYY-MM-DD.
        #[clap(long)]
        date: Option<String>,
        /// Only scheduled flights with an empty crew role.
        #[clap(long)]
        unassigned: bool,
        /// Comma-separated columns to show (default: all).
        #[clap(long)]
        columns: Option<String>,
        #[clap(long)]
        order_by: Option<String>,
        #[clap(long)]
        desc: bool,
    },
    /// Update one attribute of a flight.
    Update {
        #[clap(flatten)]
        key: FlightKeyArgs,
        #[clap(long)]
        field: String,
        /// New value; empty or `null` clears an optional attribute.
        #[clap(long)]
        value: String,
    },
    /// Delete a flight.
    Delete {
        #[clap(flatten)]
        key: FlightKeyArgs,
    },
}

fn optional_datetime(raw: Option<String>) -> Result<Option<NaiveDateTime>, RosterError> {
    raw.as_deref().map(time::parse_datetime).transpose()
}

pub fn run_flight_cli(store: &Store, cli: FlightCli, format: OutputFormat) -> Result<(), RosterError> {
    match cli.command {
        FlightCommand::Add {
            key,
            arrives,
            status,
            captain,
            first_officer,
            from,
            to,
            diversion,
            departure_terminal,
            arrival_terminal,
            diversion_terminal,
            actual_departure,
            actual_arrival,
        } => {
            let key = key.key()?;
            let flight = Flight {
                flight_id: key.flight_id,
                scheduled_departure: key.scheduled_departure,
                status: status.parse()?,
                captain_id: captain,
                first_officer_id: first_officer,
                arrival_destination_id: to,
                departure_destination_id: from,
                diversion_destination_id: diversion,
                departure_terminal_id: departure_terminal,
                arrival_terminal_id: arrival_terminal,
                diversion_terminal_id: diversion_terminal,
                scheduled_arrival: time::parse_datetime(&arrives)?,
                actual_arrival: optional_datetime(actual_arrival)?,
                actual_departure: optional_datetime(actual_departure)?,
            };
            let key = add_flight(store, &flight)?;
            output::print_write("flight.add", 1, &format!("Flight {} added.", key), format);
        }
        FlightCommand::Get { key } => {
            let key = key.key()?;
            let flight = get_flight(store, &key)?
                .ok_or_else(|| RosterError::NotFound(format!("flight {}", key)))?;
            output::print_rows(&[flight], "flight.get", format);
        }
        FlightCommand::List {
            status,
            arrival,
            departure,
            date,
            unassigned,
            columns,
            order_by,
            desc,
        } => {
            let filter = FlightFilter {
                status: status.as_deref().map(str::parse).transpose()?,
                arrival_destination: arrival,
                departure_destination: departure,
                departure_date: date.as_deref().map(time::parse_date).transpose()?,
                unassigned,
                ..FlightFilter::default()
            };
            let columns = parse_columns(columns.as_deref())?;
            let order = SortOrder {
                column: match order_by.as_deref() {
                    Some(c) => c.parse()?,
                    None => FlightColumn::ScheduledDeparture,
                },
                descending: desc,
            };
            let table = project_flights(store, &filter, &columns, order)?;
            output::print_table(&table, "flight.list", format);
        }
        FlightCommand::Update { key, field, value } => {
            let key = key.key()?;
            let column = field.parse::<FlightColumn>()?;
            let rows = update_flight(store, &key, column, &value)?;
            let message = if rows == 0 {
                format!("No flight {}; nothing updated.", key)
            } else {
                format!("Flight {} updated ({}).", key, column.label())
            };
            output::print_write("flight.update", rows, &message, format);
        }
        FlightCommand::Delete { key } => {
            let key = key.key()?;
            let rows = delete_flight(store, &key)?;
            let message = if rows == 0 {
                format!("No flight {}; nothing deleted.", key)
            } else {
                format!("Flight {} deleted.", key)
            };
            output::print_write("flight.delete", rows, &message, format);
        }
    }
    Ok(())
}
