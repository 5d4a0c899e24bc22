//! Derived departure/arrival status. Never stored; always computed from the
//! raw timestamps.
//!
//! A missing actual time counts as on time. At the flight-level report a
//! flight with no actual timestamp at all is shown as `Pending` instead.

use crate::core::error::RosterError;
use crate::core::output::Tabular;
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::flight::Flight;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuality {
    #[serde(rename = "On Time")]
    OnTime,
    Delayed,
}

impl Punctuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuality::OnTime => "On Time",
            Punctuality::Delayed => "Delayed",
        }
    }
}

impl std::fmt::Display for Punctuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Punctuality {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "On Time" => Ok(Punctuality::OnTime),
            "Delayed" => Ok(Punctuality::Delayed),
            other => Err(RosterError::InvalidInput(format!(
                "'{}' is not a punctuality label",
                other
            ))),
        }
    }
}

/// On time when nothing has happened yet or it happened no later than scheduled.
pub fn classify(scheduled: NaiveDateTime, actual: Option<NaiveDateTime>) -> Punctuality {
    match actual {
        Some(actual) if actual > scheduled => Punctuality::Delayed,
        _ => Punctuality::OnTime,
    }
}

pub fn departure_status(flight: &Flight) -> Punctuality {
    classify(flight.scheduled_departure, flight.actual_departure)
}

pub fn arrival_status(flight: &Flight) -> Punctuality {
    classify(flight.scheduled_arrival, flight.actual_arrival)
}

/// Flight-level label: the per-field status, or `Pending` when the flight has
/// no actual timestamp at all.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLabel {
    Status(Punctuality),
    Pending,
}

impl std::fmt::Display for PerformanceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceLabel::Status(p) => write!(f, "{}", p),
            PerformanceLabel::Pending => write!(f, "Pending"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlightPerformance {
    pub flight_id: String,
    pub scheduled_departure: NaiveDateTime,
    pub departure: PerformanceLabel,
    pub arrival: PerformanceLabel,
}

fn label(has_actuals: bool, status: Punctuality) -> PerformanceLabel {
    if has_actuals {
        PerformanceLabel::Status(status)
    } else {
        PerformanceLabel::Pending
    }
}

pub fn flight_performance(flight: &Flight) -> FlightPerformance {
    let has_actuals = flight.has_actuals();
    FlightPerformance {
        flight_id: flight.flight_id.clone(),
        scheduled_departure: flight.scheduled_departure,
        departure: label(has_actuals, departure_status(flight)),
        arrival: label(has_actuals, arrival_status(flight)),
    }
}

/// Per-flight performance read from the `departure_performance` and
/// `arrival_performance` views.
pub fn performance_report(store: &Store) -> Result<Vec<FlightPerformance>, RosterError> {
    store.broker().with_read("report.performance", |conn| {
        let mut stmt = conn.prepare(
            "SELECT d.flight_id, d.scheduled_departure, d.actual_departure, a.actual_arrival,
                    d.departure_status, a.arrival_status
             FROM departure_performance d
             JOIN arrival_performance a
               ON a.flight_id = d.flight_id AND a.scheduled_departure = d.scheduled_departure
             ORDER BY d.scheduled_departure, d.flight_id",
        )?;
        let rows = stmt.query_map([], |row| {
            let actual_departure: Option<String> = row.get(2)?;
            let actual_arrival: Option<String> = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, NaiveDateTime>(1)?,
                actual_departure.is_some() || actual_arrival.is_some(),
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut report = Vec::new();
        for row in rows {
            let (flight_id, scheduled_departure, has_actuals, departure, arrival) = row?;
            report.push(FlightPerformance {
                flight_id,
                scheduled_departure,
                departure: label(has_actuals, departure.parse()?),
                arrival: label(has_actuals, arrival.parse()?),
            });
        }
        Ok(report)
    })
}

impl Tabular for FlightPerformance {
    fn headers() -> &'static [&'static str] {
        &[
            "flightID",
            "scheduledDepartureDateTime",
            "departureStatus",
            "arrivalStatus",
        ]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.flight_id.clone(),
            time::format_datetime(&self.scheduled_departure),
            self.departure.to_string(),
            self.arrival.to_string(),
        ]
    }
}
