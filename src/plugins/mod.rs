//! Roster subsystems. Each plugin owns its record types, its store
//! operations and its CLI subcommand tree.

pub mod crew;
pub mod destination;
pub mod flight;
pub mod pilot;
pub mod punctuality;
pub mod report;
