//! Destinations (airports) and their terminals.
//!
//! Reference data: created by an operator, rarely updated, never deleted.

use crate::core::error::RosterError;
use crate::core::output::{self, OutputFormat, Tabular};
use crate::core::store::Store;
use clap::{Parser, Subcommand};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

static DESTINATION_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{3}$").expect("destination code pattern"));

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub country: String,
    pub city: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub terminal_id: String,
    pub destination_id: String,
    pub name: Option<String>,
}

/// Destination attributes that may be updated in place. The code is the key
/// and is not in this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationField {
    Name,
    Country,
    City,
}

impl DestinationField {
    pub fn column(&self) -> &'static str {
        match self {
            DestinationField::Name => "name",
            DestinationField::Country => "country",
            DestinationField::City => "city",
        }
    }
}

impl FromStr for DestinationField {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(DestinationField::Name),
            "country" => Ok(DestinationField::Country),
            "city" => Ok(DestinationField::City),
            other => Err(RosterError::InvalidInput(format!(
                "'{}' is not an updatable destination attribute (name, country, city)",
                other
            ))),
        }
    }
}

impl Tabular for Destination {
    fn headers() -> &'static [&'static str] {
        &["destinationID", "name", "country", "city"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.country.clone(),
            self.city.clone(),
        ]
    }
}

impl Tabular for Terminal {
    fn headers() -> &'static [&'static str] {
        &["terminalID", "destinationID", "name"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.terminal_id.clone(),
            self.destination_id.clone(),
            self.name.clone().unwrap_or_default(),
        ]
    }
}

/// Normalize a destination code to upper case and check it is three alphanumerics.
pub fn validate_destination_code(code: &str) -> Result<String, RosterError> {
    let normalized = code.trim().to_ascii_uppercase();
    if DESTINATION_CODE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(RosterError::InvalidInput(format!(
            "destination code '{}' must be exactly three letters or digits",
            code
        )))
    }
}

fn require_text(label: &str, value: &str) -> Result<String, RosterError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RosterError::InvalidInput(format!("{} must not be empty", label)));
    }
    Ok(trimmed.to_string())
}

pub fn add_destination(store: &Store, destination: &Destination) -> Result<(), RosterError> {
    let id = validate_destination_code(&destination.id)?;
    let name = require_text("name", &destination.name)?;
    let country = require_text("country", &destination.country)?;
    let city = require_text("city", &destination.city)?;

    store.broker().with_write("destination.add", |conn| {
        conn.execute(
            "INSERT INTO destinations(destination_id, name, country, city) VALUES(?1, ?2, ?3, ?4)",
            params![id, name, country, city],
        )
        .map_err(RosterError::from_write)?;
        Ok(())
    })
}

pub fn get_destination(store: &Store, id: &str) -> Result<Option<Destination>, RosterError> {
    let id = validate_destination_code(id)?;
    store.broker().with_read("destination.get", |conn| {
        let destination = conn
            .query_row(
                "SELECT destination_id, name, country, city FROM destinations WHERE destination_id = ?1",
                [&id],
                destination_from_row,
            )
            .optional()?;
        Ok(destination)
    })
}

pub fn list_destinations(store: &Store) -> Result<Vec<Destination>, RosterError> {
    store
        .broker()
        .with_read("destination.list", load_destinations)
}

pub(crate) fn load_destinations(conn: &Connection) -> Result<Vec<Destination>, RosterError> {
    let mut stmt = conn.prepare(
        "SELECT destination_id, name, country, city FROM destinations ORDER BY destination_id",
    )?;
    let rows = stmt.query_map([], destination_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn destination_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Destination> {
    Ok(Destination {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        city: row.get(3)?,
    })
}

/// Update one attribute. Returns rows affected; 0 means no destination has that code.
pub fn update_destination(
    store: &Store,
    id: &str,
    field: DestinationField,
    value: &str,
) -> Result<usize, RosterError> {
    let id = validate_destination_code(id)?;
    let value = require_text(field.column(), value)?;
    let sql = format!(
        "UPDATE destinations SET {} = ?1 WHERE destination_id = ?2",
        field.column()
    );
    store.broker().with_write("destination.update", |conn| {
        conn.execute(&sql, params![value, id])
            .map_err(RosterError::from_write)
    })
}

pub fn add_terminal(store: &Store, terminal: &Terminal) -> Result<(), RosterError> {
    let terminal_id = require_text("terminal id", &terminal.terminal_id)?;
    let destination_id = validate_destination_code(&terminal.destination_id)?;
    let name = terminal
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    store.broker().with_write("terminal.add", |conn| {
        conn.execute(
            "INSERT INTO terminals(terminal_id, destination_id, name) VALUES(?1, ?2, ?3)",
            params![terminal_id, destination_id, name],
        )
        .map_err(RosterError::from_write)?;
        Ok(())
    })
}

pub fn list_terminals(
    store: &Store,
    destination_id: Option<&str>,
) -> Result<Vec<Terminal>, RosterError> {
    let destination_id = destination_id.map(validate_destination_code).transpose()?;
    store.broker().with_read("terminal.list", |conn| {
        let mut stmt = conn.prepare(
            "SELECT terminal_id, destination_id, name FROM terminals
             WHERE ?1 IS NULL OR destination_id = ?1
             ORDER BY destination_id, terminal_id",
        )?;
        let rows = stmt.query_map([&destination_id], |row| {
            Ok(Terminal {
                terminal_id: row.get(0)?,
                destination_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    })
}

#[derive(Parser, Debug)]
#[clap(name = "destination", about = "Manage destinations (airports) and their terminals.")]
pub struct DestinationCli {
    #[clap(subcommand)]
    pub command: DestinationCommand,
}

#[derive(Subcommand, Debug)]
pub enum DestinationCommand {
    /// Add a destination.
    Add {
        /// Three-character destination code (e.g. LHR).
        #[clap(long)]
        id: String,
        #[clap(long)]
        name: String,
        #[clap(long)]
        country: String,
        #[clap(long)]
        city: String,
    },
    /// List all destinations.
    List,
    /// Update one attribute of a destination.
    Update {
        #[clap(long)]
        id: String,
        /// One of: name, country, city.
        #[clap(long)]
        field: String,
        #[clap(long)]
        value: String,
    },
    /// Add a terminal at a destination.
    AddTerminal {
        #[clap(long)]
        terminal: String,
        #[clap(long)]
        destination: String,
        #[clap(long)]
        name: Option<String>,
    },
    /// List terminals, optionally for one destination.
    Terminals {
        #[clap(long)]
        destination: Option<String>,
    },
}

pub fn run_destination_cli(
    store: &Store,
    cli: DestinationCli,
    format: OutputFormat,
) -> Result<(), RosterError> {
    match cli.command {
        DestinationCommand::Add {
            id,
            name,
            country,
            city,
        } => {
            let destination = Destination {
                id,
                name,
                country,
                city,
            };
            add_destination(store, &destination)?;
            output::print_write(
                "destination.add",
                1,
                &format!("Destination {} added.", destination.id.to_ascii_uppercase()),
                format,
            );
        }
        DestinationCommand::List => {
            let destinations = list_destinations(store)?;
            output::print_rows(&destinations, "destination.list", format);
        }
        DestinationCommand::Update { id, field, value } => {
            let field = field.parse::<DestinationField>()?;
            let rows = update_destination(store, &id, field, &value)?;
            let message = if rows == 0 {
                format!("No destination with code {}; nothing updated.", id)
            } else {
                format!("Destination {} updated ({}).", id, field.column())
            };
            output::print_write("destination.update", rows, &message, format);
        }
        DestinationCommand::AddTerminal {
            terminal,
            destination,
            name,
        } => {
            let terminal = Terminal {
                terminal_id: terminal,
                destination_id: destination,
                name,
            };
            add_terminal(store, &terminal)?;
            output::print_write(
                "terminal.add",
                1,
                &format!(
                    "Terminal {} added at {}.",
                    terminal.terminal_id,
                    terminal.destination_id.to_ascii_uppercase()
                ),
                format,
            );
        }
        DestinationCommand::Terminals { destination } => {
            let terminals = list_terminals(store, destination.as_deref())?;
            output::print_rows(&terminals, "terminal.list", format);
        }
    }
    Ok(())
}
