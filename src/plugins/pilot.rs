//! Pilots: system-numbered crew members with role qualifications.
//!
//! Pilot ids come from SQLite AUTOINCREMENT, so they are monotonic and never
//! reused. Pilots are updated in place and never deleted.

use crate::core::error::RosterError;
use crate::core::output::{self, OutputFormat, Tabular};
use crate::core::store::Store;
use crate::core::time;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use regex::Regex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));

pub type PilotId = i64;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pilot {
    pub pilot_id: PilotId,
    pub name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub is_captain_qualified: bool,
    pub is_first_officer_qualified: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewPilot {
    pub name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub is_captain_qualified: bool,
    pub is_first_officer_qualified: bool,
}

/// Pilot attributes that may be updated. `pilot_id` is never writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotField {
    Name,
    Email,
    DateOfBirth,
    CaptainQualified,
    FirstOfficerQualified,
}

impl PilotField {
    pub fn column(&self) -> &'static str {
        match self {
            PilotField::Name => "name",
            PilotField::Email => "email",
            PilotField::DateOfBirth => "date_of_birth",
            PilotField::CaptainQualified => "is_captain_qualified",
            PilotField::FirstOfficerQualified => "is_first_officer_qualified",
        }
    }

    /// Validate and convert a raw value into the bound parameter for this column.
    pub fn parse_value(&self, raw: &str) -> Result<SqlValue, RosterError> {
        match self {
            PilotField::Name => Ok(SqlValue::Text(require_name(raw)?)),
            PilotField::Email => Ok(SqlValue::Text(validate_email(raw)?)),
            PilotField::DateOfBirth => {
                let dob = time::parse_date(raw)?;
                Ok(SqlValue::Text(dob.format("%Y-%m-%d").to_string()))
            }
            PilotField::CaptainQualified | PilotField::FirstOfficerQualified => {
                Ok(SqlValue::Integer(parse_flag(raw)? as i64))
            }
        }
    }
}

impl FromStr for PilotField {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "name" | "pilotname" => Ok(PilotField::Name),
            "email" => Ok(PilotField::Email),
            "dateofbirth" | "dob" => Ok(PilotField::DateOfBirth),
            "iscaptainqualified" | "captainqualified" => Ok(PilotField::CaptainQualified),
            "isfirstofficerqualified" | "firstofficerqualified" => {
                Ok(PilotField::FirstOfficerQualified)
            }
            _ => Err(RosterError::InvalidInput(format!(
                "'{}' is not an updatable pilot attribute",
                s
            ))),
        }
    }
}

impl Tabular for Pilot {
    fn headers() -> &'static [&'static str] {
        &[
            "pilotID",
            "name",
            "email",
            "dateOfBirth",
            "isCaptainQualified",
            "isFirstOfficerQualified",
        ]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.pilot_id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.date_of_birth.format("%Y-%m-%d").to_string(),
            self.is_captain_qualified.to_string(),
            self.is_first_officer_qualified.to_string(),
        ]
    }
}

fn require_name(raw: &str) -> Result<String, RosterError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RosterError::InvalidInput(
            "pilot name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

pub fn validate_email(raw: &str) -> Result<String, RosterError> {
    let email = raw.trim();
    if EMAIL.is_match(email) {
        Ok(email.to_string())
    } else {
        Err(RosterError::InvalidInput(format!(
            "'{}' is not an email address",
            raw
        )))
    }
}

pub fn parse_flag(raw: &str) -> Result<bool, RosterError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(RosterError::InvalidInput(format!(
            "'{}' is not a yes/no value",
            other
        ))),
    }
}

/// Insert a pilot and return the generated id.
pub fn add_pilot(store: &Store, pilot: &NewPilot) -> Result<PilotId, RosterError> {
    let name = require_name(&pilot.name)?;
    let email = validate_email(&pilot.email)?;

    store.broker().with_write("pilot.add", |conn| {
        conn.execute(
            "INSERT INTO pilots(name, email, date_of_birth, is_captain_qualified, is_first_officer_qualified)
             VALUES(?1, ?2, ?3, ?4, ?5)",
            params![
                name,
                email,
                pilot.date_of_birth,
                pilot.is_captain_qualified,
                pilot.is_first_officer_qualified
            ],
        )
        .map_err(RosterError::from_write)?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn get_pilot(store: &Store, pilot_id: PilotId) -> Result<Option<Pilot>, RosterError> {
    store
        .broker()
        .with_read("pilot.get", |conn| find_pilot(conn, pilot_id))
}

pub(crate) fn find_pilot(conn: &Connection, pilot_id: PilotId) -> Result<Option<Pilot>, RosterError> {
    let pilot = conn
        .query_row(
            "SELECT pilot_id, name, email, date_of_birth, is_captain_qualified, is_first_officer_qualified
             FROM pilots WHERE pilot_id = ?1",
            [pilot_id],
            pilot_from_row,
        )
        .optional()?;
    Ok(pilot)
}

pub fn list_pilots(store: &Store) -> Result<Vec<Pilot>, RosterError> {
    store.broker().with_read("pilot.list", load_pilots)
}

/// All pilots ordered by id.
pub(crate) fn load_pilots(conn: &Connection) -> Result<Vec<Pilot>, RosterError> {
    let mut stmt = conn.prepare(
        "SELECT pilot_id, name, email, date_of_birth, is_captain_qualified, is_first_officer_qualified
         FROM pilots ORDER BY pilot_id",
    )?;
    let rows = stmt.query_map([], pilot_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn pilot_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Pilot> {
    Ok(Pilot {
        pilot_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        date_of_birth: row.get(3)?,
        is_captain_qualified: row.get(4)?,
        is_first_officer_qualified: row.get(5)?,
    })
}

/// Update one attribute of the pilot identified by `(pilot_id, pilot_name)`.
///
/// The name is a soft cross-check against a mistyped numeric id; it is
/// compared case-insensitively. Returns rows affected (0 when id and name do
/// not match the same pilot).
pub fn update_pilot(
    store: &Store,
    pilot_id: PilotId,
    pilot_name: &str,
    field: PilotField,
    raw_value: &str,
) -> Result<usize, RosterError> {
    let value = field.parse_value(raw_value)?;
    let sql = format!(
        "UPDATE pilots SET {} = ?1 WHERE pilot_id = ?2 AND lower(name) = lower(?3)",
        field.column()
    );
    store.broker().with_write("pilot.update", |conn| {
        conn.execute(&sql, params![value, pilot_id, pilot_name.trim()])
            .map_err(RosterError::from_write)
    })
}

#[derive(Parser, Debug)]
#[clap(name = "pilot", about = "Manage pilots.")]
pub struct PilotCli {
    #[clap(subcommand)]
    pub command: PilotCommand,
}

#[derive(Subcommand, Debug)]
pub enum PilotCommand {
    /// Add a pilot; prints the generated pilot id.
    Add {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        /// Date of birth, YYYY-MM-DD.
        #[clap(long)]
        dob: String,
        #[clap(long)]
        captain: bool,
        #[clap(long)]
        first_officer: bool,
    },
    /// Show one pilot.
    Get {
        #[clap(long)]
        id: PilotId,
    },
    /// List all pilots.
    List,
    /// Update one attribute; the pilot name must match the id.
    Update {
        #[clap(long)]
        id: PilotId,
        #[clap(long)]
        name: String,
        /// One of: name, email, dob, captain_qualified, first_officer_qualified.
        #[clap(long)]
        field: String,
        #[clap(long)]
        value: String,
    },
}

pub fn run_pilot_cli(store: &Store, cli: PilotCli, format: OutputFormat) -> Result<(), RosterError> {
    match cli.command {
        PilotCommand::Add {
            name,
            email,
            dob,
            captain,
            first_officer,
        } => {
            let pilot = NewPilot {
                name,
                email,
                date_of_birth: time::parse_date(&dob)?,
                is_captain_qualified: captain,
                is_first_officer_qualified: first_officer,
            };
            let pilot_id = add_pilot(store, &pilot)?;
            output::print_write(
                "pilot.add",
                1,
                &format!("Pilot {} added with id {}.", pilot.name.trim(), pilot_id),
                format,
            );
        }
        PilotCommand::Get { id } => {
            let pilot = get_pilot(store, id)?
                .ok_or_else(|| RosterError::NotFound(format!("pilot {}", id)))?;
            output::print_rows(&[pilot], "pilot.get", format);
        }
        PilotCommand::List => {
            let pilots = list_pilots(store)?;
            output::print_rows(&pilots, "pilot.list", format);
        }
        PilotCommand::Update {
            id,
            name,
            field,
            value,
        } => {
            let field = field.parse::<PilotField>()?;
            let rows = update_pilot(store, id, &name, field, &value)?;
            let message = if rows == 0 {
                format!("No pilot matches id {} and name '{}'; nothing updated.", id, name)
            } else {
                format!("Pilot {} updated ({}).", id, field.column())
            };
            output::print_write("pilot.update", rows, &message, format);
        }
    }
    Ok(())
}
