//! Centralized schema definitions for the roster database.
//!
//! Four base tables in dependency order (destinations, terminals, pilots,
//! flights) plus two derived performance views. Punctuality is never stored.

pub const DESTINATIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS destinations (
        destination_id TEXT NOT NULL PRIMARY KEY CHECK (length(destination_id) = 3),
        name TEXT NOT NULL,
        country TEXT NOT NULL,
        city TEXT NOT NULL
    )
";

pub const TERMINALS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS terminals (
        terminal_id TEXT NOT NULL,
        destination_id TEXT NOT NULL,
        name TEXT,
        PRIMARY KEY (terminal_id, destination_id),
        FOREIGN KEY (destination_id) REFERENCES destinations(destination_id)
    )
";

pub const PILOTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS pilots (
        pilot_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        date_of_birth TEXT NOT NULL,
        is_captain_qualified INTEGER NOT NULL CHECK (is_captain_qualified IN (0, 1)),
        is_first_officer_qualified INTEGER NOT NULL CHECK (is_first_officer_qualified IN (0, 1))
    )
";

// Terminal references are composite so a terminal code is always resolved
// against the destination it is used at. SQLite skips the check when any
// column of the reference is NULL, which is what optional terminals need.
pub const FLIGHTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS flights (
        flight_id TEXT NOT NULL,
        scheduled_departure TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Scheduled'
            CHECK (status IN ('Scheduled', 'In-air', 'Landed', 'Cancelled')),
        captain_id INTEGER,
        first_officer_id INTEGER,
        arrival_destination_id TEXT NOT NULL,
        departure_destination_id TEXT NOT NULL,
        diversion_destination_id TEXT,
        departure_terminal_id TEXT NOT NULL,
        arrival_terminal_id TEXT,
        diversion_terminal_id TEXT,
        scheduled_arrival TEXT NOT NULL,
        actual_arrival TEXT,
        actual_departure TEXT,
        PRIMARY KEY (flight_id, scheduled_departure),
        CHECK (status = 'Scheduled' OR (captain_id IS NOT NULL AND first_officer_id IS NOT NULL)),
        CHECK (scheduled_arrival >= scheduled_departure),
        FOREIGN KEY (captain_id) REFERENCES pilots(pilot_id),
        FOREIGN KEY (first_officer_id) REFERENCES pilots(pilot_id),
        FOREIGN KEY (arrival_destination_id) REFERENCES destinations(destination_id),
        FOREIGN KEY (departure_destination_id) REFERENCES destinations(destination_id),
        FOREIGN KEY (diversion_destination_id) REFERENCES destinations(destination_id),
        FOREIGN KEY (departure_terminal_id, departure_destination_id)
            REFERENCES terminals(terminal_id, destination_id),
        FOREIGN KEY (arrival_terminal_id, arrival_destination_id)
            REFERENCES terminals(terminal_id, destination_id),
        FOREIGN KEY (diversion_terminal_id, diversion_destination_id)
            REFERENCES terminals(terminal_id, destination_id)
    )
";

pub const FLIGHTS_INDEX_CAPTAIN: &str =
    "CREATE INDEX IF NOT EXISTS idx_flights_captain ON flights(captain_id)";
pub const FLIGHTS_INDEX_FIRST_OFFICER: &str =
    "CREATE INDEX IF NOT EXISTS idx_flights_first_officer ON flights(first_officer_id)";

// Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text, so text comparison is
// chronological comparison.
pub const DEPARTURE_PERFORMANCE_VIEW: &str = "
    CREATE VIEW IF NOT EXISTS departure_performance AS
    SELECT flight_id,
           scheduled_departure,
           actual_departure,
           CASE
               WHEN actual_departure IS NULL OR actual_departure <= scheduled_departure
                   THEN 'On Time'
               ELSE 'Delayed'
           END AS departure_status
    FROM flights
";

pub const ARRIVAL_PERFORMANCE_VIEW: &str = "
    CREATE VIEW IF NOT EXISTS arrival_performance AS
    SELECT flight_id,
           scheduled_departure,
           scheduled_arrival,
           actual_arrival,
           CASE
               WHEN actual_arrival IS NULL OR actual_arrival <= scheduled_arrival
                   THEN 'On Time'
               ELSE 'Delayed'
           END AS arrival_status
    FROM flights
";

/// Drop order for a reset: views first, then tables from dependent to independent.
pub const DROP_STATEMENTS: &[&str] = &[
    "DROP VIEW IF EXISTS arrival_performance",
    "DROP VIEW IF EXISTS departure_performance",
    "DROP TABLE IF EXISTS flights",
    "DROP TABLE IF EXISTS terminals",
    "DROP TABLE IF EXISTS pilots",
    "DROP TABLE IF EXISTS destinations",
];
