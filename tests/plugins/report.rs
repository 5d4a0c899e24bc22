use chrono::{NaiveDate, NaiveDateTime};
use skyroster::core::store::Store;
use skyroster::core::time::{parse_datetime, parse_range_end, parse_range_start};
use skyroster::initialize_db;
use skyroster::plugins::destination::{Destination, Terminal, add_destination, add_terminal};
use skyroster::plugins::flight::{
    Flight, FlightFilter, FlightStatus, SortOrder, add_flight, list_flights,
};
use skyroster::plugins::pilot::{NewPilot, PilotId, add_pilot};
use skyroster::plugins::punctuality::{self, PerformanceLabel, Punctuality, performance_report};
use skyroster::plugins::report::{
    flights_in_timeframe, report_monthly_workload, report_pilot_flight_counts,
    report_pilot_punctuality, report_terminal_traffic,
};
use tempfile::tempdir;

fn dt(s: &str) -> NaiveDateTime {
    parse_datetime(s).unwrap()
}

fn seeded_store(root: &std::path::Path) -> (Store, Vec<PilotId>) {
    let store = Store::open(root).unwrap();
    initialize_db(&store, false).unwrap();
    for (code, terminals) in [("LHR", &["T2", "T5"][..]), ("EDI", &["1"][..])] {
        add_destination(
            &store,
            &Destination {
                id: code.to_string(),
                name: code.to_string(),
                country: "United Kingdom".to_string(),
                city: code.to_string(),
            },
        )
        .unwrap();
        for t in terminals {
            add_terminal(
                &store,
                &Terminal {
                    terminal_id: t.to_string(),
                    destination_id: code.to_string(),
                    name: None,
                },
            )
            .unwrap();
        }
    }
    let pilots = ["Ada Park", "Ben Cole", "Cy Dunn"]
        .iter()
        .map(|name| {
            add_pilot(
                &store,
                &NewPilot {
                    name: name.to_string(),
                    email: "crew@example.com".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1982, 7, 1).unwrap(),
                    is_captain_qualified: true,
                    is_first_officer_qualified: true,
                },
            )
            .unwrap()
        })
        .collect();
    (store, pilots)
}

fn flight(id: &str, departs: &str, arrives: &str, crew: (Option<PilotId>, Option<PilotId>)) -> Flight {
    Flight {
        flight_id: id.to_string(),
        scheduled_departure: dt(departs),
        status: FlightStatus::Scheduled,
        captain_id: crew.0,
        first_officer_id: crew.1,
        arrival_destination_id: "LHR".to_string(),
        departure_destination_id: "EDI".to_string(),
        diversion_destination_id: None,
        departure_terminal_id: "1".to_string(),
        arrival_terminal_id: Some("T2".to_string()),
        diversion_terminal_id: None,
        scheduled_arrival: dt(arrives),
        actual_arrival: None,
        actual_departure: None,
    }
}

#[test]
fn test_terminal_used_for_departure_and_arrival_counts_twice() {
    let tmp = tempdir().unwrap();
    let (store, _) = seeded_store(tmp.path());

    let mut shuttle = flight("BA9", "2025-03-01 09:00", "2025-03-01 10:00", (None, None));
    shuttle.departure_destination_id = "LHR".to_string();
    shuttle.departure_terminal_id = "T5".to_string();
    shuttle.arrival_terminal_id = Some("T5".to_string());
    add_flight(&store, &shuttle).unwrap();

    let report = report_terminal_traffic(&store).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].destination_id, "LHR");
    assert_eq!(report[0].terminal_id, "T5");
    assert_eq!(report[0].usage_count, 2);
}

#[test]
fn test_pilot_counts_include_pilots_without_flights() {
    let tmp = tempdir().unwrap();
    let (store, p) = seeded_store(tmp.path());

    add_flight(&store, &flight("A1", "2025-03-01 06:00", "2025-03-01 07:00", (Some(p[0]), Some(p[1])))).unwrap();
    add_flight(&store, &flight("A2", "2025-03-02 06:00", "2025-03-02 07:00", (Some(p[1]), None))).unwrap();

    let report = report_pilot_flight_counts(&store).unwrap();
    let view: Vec<(PilotId, usize)> = report.iter().map(|r| (r.pilot_id, r.flight_count)).collect();
    assert_eq!(view, vec![(p[1], 2), (p[0], 1), (p[2], 0)]);
}

#[test]
fn test_monthly_workload_groups_by_month() {
    let tmp = tempdir().unwrap();
    let (store, p) = seeded_store(tmp.path());

    add_flight(&store, &flight("M1", "2025-01-31 22:00", "2025-01-31 23:30", (Some(p[0]), None))).unwrap();
    add_flight(&store, &flight("M2", "2025-02-01 06:00", "2025-02-01 07:00", (Some(p[0]), None))).unwrap();
    add_flight(&store, &flight("M3", "2025-02-02 06:00", "2025-02-02 07:00", (None, Some(p[0])))).unwrap();

    let report = report_monthly_workload(&store).unwrap();
    let view: Vec<(&str, usize)> = report
        .iter()
        .map(|r| (r.month.as_str(), r.flight_count))
        .collect();
    assert_eq!(view, vec![("2025-01", 1), ("2025-02", 2)]);
    assert!(report.iter().all(|r| r.pilot_name == "Ada Park"));
}

#[test]
fn test_timeframe_bare_dates_are_inclusive() {
    let tmp = tempdir().unwrap();
    let (store, p) = seeded_store(tmp.path());

    add_flight(&store, &flight("T1", "2025-03-01 00:00", "2025-03-01 01:00", (Some(p[0]), None))).unwrap();
    add_flight(&store, &flight("T2", "2025-03-02 23:59", "2025-03-03 01:00", (None, Some(p[0])))).unwrap();
    add_flight(&store, &flight("T3", "2025-03-03 00:00", "2025-03-03 01:00", (Some(p[0]), None))).unwrap();
    add_flight(&store, &flight("T4", "2025-03-02 12:00", "2025-03-02 13:00", (Some(p[1]), None))).unwrap();

    let start = parse_range_start("2025-03-01").unwrap();
    let end = parse_range_end("2025-03-02").unwrap();

    let all: Vec<String> = flights_in_timeframe(&store, start, end, None)
        .unwrap()
        .into_iter()
        .map(|f| f.flight_id)
        .collect();
    assert_eq!(all, vec!["T1", "T4", "T2"]);

    let mine: Vec<String> = flights_in_timeframe(&store, start, end, Some(p[0]))
        .unwrap()
        .into_iter()
        .map(|f| f.flight_id)
        .collect();
    assert_eq!(mine, vec!["T1", "T2"]);
}

#[test]
fn test_pilot_punctuality_counts_flown_flights_only() {
    let tmp = tempdir().unwrap();
    let (store, p) = seeded_store(tmp.path());

    let mut late = flight("P1", "2025-03-01 06:00", "2025-03-01 07:00", (Some(p[0]), Some(p[1])));
    late.status = FlightStatus::Landed;
    late.actual_departure = Some(dt("2025-03-01 06:25"));
    late.actual_arrival = Some(dt("2025-03-01 06:55"));
    add_flight(&store, &late).unwrap();
    add_flight(&store, &flight("P2", "2025-03-02 06:00", "2025-03-02 07:00", (Some(p[2]), None))).unwrap();

    let report = report_pilot_punctuality(&store).unwrap();
    assert_eq!(report.len(), 2);
    for row in &report {
        assert_eq!(row.delayed_departures, 1);
        assert_eq!(row.on_time_arrivals, 1);
    }
    assert!(report.iter().all(|r| r.pilot_id != p[2]));
}

#[test]
fn test_performance_views_agree_with_derived_status() {
    let tmp = tempdir().unwrap();
    let (store, p) = seeded_store(tmp.path());

    let mut delayed = flight("EZY2101", "2025-03-01 06:15:00", "2025-03-01 11:45:00", (Some(p[0]), Some(p[1])));
    delayed.status = FlightStatus::InAir;
    delayed.actual_departure = Some(dt("2025-03-01 06:20:00"));
    add_flight(&store, &delayed).unwrap();
    add_flight(&store, &flight("EZY2102", "2025-03-01 13:00", "2025-03-01 18:00", (None, None))).unwrap();

    let report = performance_report(&store).unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].flight_id, "EZY2101");
    assert_eq!(report[0].departure, PerformanceLabel::Status(Punctuality::Delayed));
    assert_eq!(report[0].arrival, PerformanceLabel::Status(Punctuality::OnTime));
    assert_eq!(report[1].departure, PerformanceLabel::Pending);

    let flights = list_flights(&store, &FlightFilter::default(), SortOrder::default()).unwrap();
    for (row, f) in report.iter().zip(&flights) {
        assert_eq!(*row, punctuality::flight_performance(f));
    }
}
