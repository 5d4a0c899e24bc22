use chrono::{NaiveDate, NaiveDateTime};
use skyroster::core::error::{IntegrityCause, RosterError};
use skyroster::core::store::Store;
use skyroster::core::time::parse_datetime;
use skyroster::initialize_db;
use skyroster::plugins::destination::{Destination, Terminal, add_destination, add_terminal};
use skyroster::plugins::flight::{
    Flight, FlightColumn, FlightFilter, FlightKey, FlightStatus, SortOrder, add_flight,
    delete_flight, get_flight, list_flights, parse_columns, project_flights, update_flight,
};
use skyroster::plugins::pilot::{NewPilot, PilotId, add_pilot};
use tempfile::tempdir;

fn dt(s: &str) -> NaiveDateTime {
    parse_datetime(s).unwrap()
}

fn seeded_store(root: &std::path::Path) -> (Store, Vec<PilotId>) {
    let store = Store::open(root).unwrap();
    initialize_db(&store, false).unwrap();
    for (code, city) in [("BRS", "Bristol"), ("LCA", "Larnaca"), ("LHR", "London")] {
        add_destination(
            &store,
            &Destination {
                id: code.to_string(),
                name: format!("{} Airport", city),
                country: "Somewhere".to_string(),
                city: city.to_string(),
            },
        )
        .unwrap();
        add_terminal(
            &store,
            &Terminal {
                terminal_id: "1".to_string(),
                destination_id: code.to_string(),
                name: None,
            },
        )
        .unwrap();
    }
    let pilots = ["Ada Park", "Ben Cole"]
        .iter()
        .map(|name| {
            add_pilot(
                &store,
                &NewPilot {
                    name: name.to_string(),
                    email: "crew@example.com".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1980, 5, 5).unwrap(),
                    is_captain_qualified: true,
                    is_first_officer_qualified: true,
                },
            )
            .unwrap()
        })
        .collect();
    (store, pilots)
}

fn flight(id: &str, departs: &str, arrives: &str, from: &str, to: &str) -> Flight {
    Flight {
        flight_id: id.to_string(),
        scheduled_departure: dt(departs),
        status: FlightStatus::Scheduled,
        captain_id: None,
        first_officer_id: None,
        arrival_destination_id: to.to_string(),
        departure_destination_id: from.to_string(),
        diversion_destination_id: None,
        departure_terminal_id: "1".to_string(),
        arrival_terminal_id: Some("1".to_string()),
        diversion_terminal_id: None,
        scheduled_arrival: dt(arrives),
        actual_arrival: None,
        actual_departure: None,
    }
}

#[test]
fn test_flight_number_recurs_at_different_times() {
    let tmp = tempdir().unwrap();
    let (store, _) = seeded_store(tmp.path());

    let morning = flight("EZY2101", "2025-03-01 06:15", "2025-03-01 11:45", "BRS", "LCA");
    let evening = flight("EZY2101", "2025-03-01 18:15", "2025-03-01 23:45", "BRS", "LCA");
    add_flight(&store, &morning).unwrap();
    add_flight(&store, &evening).unwrap();

    let err = add_flight(&store, &morning).unwrap_err();
    assert_eq!(err.integrity_cause(), Some(IntegrityCause::DuplicateKey));

    let stored = get_flight(&store, &morning.key()).unwrap().unwrap();
    assert_eq!(stored, morning);
    assert_eq!(
        list_flights(&store, &FlightFilter::default(), SortOrder::default())
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_unknown_captain_leaves_no_partial_record() {
    let tmp = tempdir().unwrap();
    let (store, _) = seeded_store(tmp.path());

    let mut f = flight("BA123", "2025-03-02 09:00", "2025-03-02 10:30", "LHR", "BRS");
    f.captain_id = Some(999);
    let err = add_flight(&store, &f).unwrap_err();
    assert!(err.is_integrity_violation());
    assert_eq!(err.integrity_cause(), Some(IntegrityCause::MissingReference));
    assert!(get_flight(&store, &f.key()).unwrap().is_none());
}

#[test]
fn test_terminal_must_belong_to_its_destination() {
    let tmp = tempdir().unwrap();
    let (store, _) = seeded_store(tmp.path());

    let mut f = flight("BA124", "2025-03-02 09:00", "2025-03-02 10:30", "LHR", "BRS");
    f.departure_terminal_id = "T5".to_string();
    let err = add_flight(&store, &f).unwrap_err();
    assert_eq!(err.integrity_cause(), Some(IntegrityCause::MissingReference));
}

#[test]
fn test_non_scheduled_flight_needs_full_crew() {
    let tmp = tempdir().unwrap();
    let (store, pilots) = seeded_store(tmp.path());

    let mut f = flight("BA125", "2025-03-02 09:00", "2025-03-02 10:30", "LHR", "BRS");
    f.status = FlightStatus::InAir;
    f.captain_id = Some(pilots[0]);
    let err = add_flight(&store, &f).unwrap_err();
    assert_eq!(err.integrity_cause(), Some(IntegrityCause::DomainConstraint));

    f.first_officer_id = Some(pilots[1]);
    add_flight(&store, &f).unwrap();

    // Clearing a crew role on an in-air flight is refused by the same rule.
    let err = update_flight(&store, &f.key(), FlightColumn::FirstOfficerId, "null").unwrap_err();
    assert_eq!(err.integrity_cause(), Some(IntegrityCause::DomainConstraint));
}

#[test]
fn test_arrival_before_departure_is_rejected() {
    let tmp = tempdir().unwrap();
    let (store, _) = seeded_store(tmp.path());

    let f = flight("BA127", "2025-03-02 10:30", "2025-03-02 09:00", "LHR", "BRS");
    assert!(matches!(add_flight(&store, &f), Err(RosterError::InvalidInput(_))));
    assert!(get_flight(&store, &f.key()).unwrap().is_none());

    let zero_length = flight("BA128", "2025-03-02 10:30", "2025-03-02 10:30", "LHR", "BRS");
    add_flight(&store, &zero_length).unwrap();

    let err = update_flight(
        &store,
        &zero_length.key(),
        FlightColumn::ScheduledArrival,
        "2025-03-02 10:00",
    )
    .unwrap_err();
    assert_eq!(err.integrity_cause(), Some(IntegrityCause::DomainConstraint));
    let stored = get_flight(&store, &zero_length.key()).unwrap().unwrap();
    assert_eq!(stored.scheduled_arrival, dt("2025-03-02 10:30"));
}

#[test]
fn test_update_and_delete_report_rows_affected() {
    let tmp = tempdir().unwrap();
    let (store, _) = seeded_store(tmp.path());
    let f = flight("BA126", "2025-03-03 07:00", "2025-03-03 08:30", "LHR", "BRS");
    add_flight(&store, &f).unwrap();

    let rows = update_flight(&store, &f.key(), FlightColumn::ActualDeparture, "2025-03-03 07:20").unwrap();
    assert_eq!(rows, 1);
    let stored = get_flight(&store, &f.key()).unwrap().unwrap();
    assert_eq!(stored.actual_departure, Some(dt("2025-03-03 07:20:00")));

    let missing = FlightKey::new("BA126", dt("2025-03-04 07:00"));
    assert_eq!(
        update_flight(&store, &missing, FlightColumn::Status, "Cancelled").unwrap(),
        0
    );

    assert!(matches!(
        update_flight(&store, &f.key(), FlightColumn::Status, "Boarding"),
        Err(RosterError::InvalidInput(_))
    ));

    assert_eq!(delete_flight(&store, &missing).unwrap(), 0);
    assert_eq!(delete_flight(&store, &f.key()).unwrap(), 1);
    assert!(get_flight(&store, &f.key()).unwrap().is_none());
}

#[test]
fn test_filters_combine() {
    let tmp = tempdir().unwrap();
    let (store, pilots) = seeded_store(tmp.path());

    add_flight(&store, &flight("A1", "2025-03-01 06:00", "2025-03-01 08:00", "BRS", "LCA")).unwrap();
    add_flight(&store, &flight("A2", "2025-03-01 12:00", "2025-03-01 14:00", "LHR", "LCA")).unwrap();
    let mut crewed = flight("A3", "2025-03-02 06:00", "2025-03-02 08:00", "BRS", "LCA");
    crewed.captain_id = Some(pilots[0]);
    crewed.first_officer_id = Some(pilots[1]);
    add_flight(&store, &crewed).unwrap();

    let filter = FlightFilter {
        arrival_destination: Some("lca".to_string()),
        departure_destination: Some("BRS".to_string()),
        ..FlightFilter::default()
    };
    let ids: Vec<String> = list_flights(&store, &filter, SortOrder::default())
        .unwrap()
        .into_iter()
        .map(|f| f.flight_id)
        .collect();
    assert_eq!(ids, vec!["A1", "A3"]);

    let filter = FlightFilter {
        departure_date: Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
        ..FlightFilter::default()
    };
    let order = SortOrder {
        column: FlightColumn::FlightId,
        descending: true,
    };
    let ids: Vec<String> = list_flights(&store, &filter, order)
        .unwrap()
        .into_iter()
        .map(|f| f.flight_id)
        .collect();
    assert_eq!(ids, vec!["A2", "A1"]);

    let filter = FlightFilter {
        unassigned: true,
        ..FlightFilter::default()
    };
    assert_eq!(list_flights(&store, &filter, SortOrder::default()).unwrap().len(), 2);

    let filter = FlightFilter {
        status: Some(FlightStatus::Landed),
        ..FlightFilter::default()
    };
    assert!(list_flights(&store, &filter, SortOrder::default()).unwrap().is_empty());
}

#[test]
fn test_projection_uses_chosen_columns() {
    let tmp = tempdir().unwrap();
    let (store, _) = seeded_store(tmp.path());
    add_flight(&store, &flight("A1", "2025-03-01 06:00", "2025-03-01 08:00", "BRS", "LCA")).unwrap();

    let columns = parse_columns(Some("flight_id, status,captainID")).unwrap();
    let table = project_flights(&store, &FlightFilter::default(), &columns, SortOrder::default()).unwrap();
    assert_eq!(table.headers, vec!["flightID", "status", "captainID"]);
    assert_eq!(table.rows, vec![vec!["A1".to_string(), "Scheduled".to_string(), String::new()]]);

    assert!(parse_columns(Some("flight_id; DROP TABLE flights")).is_err());
}

#[test]
fn test_empty_result_is_not_an_error() {
    let tmp = tempdir().unwrap();
    let (store, _) = seeded_store(tmp.path());
    let filter = FlightFilter {
        arrival_destination: Some("LHR".to_string()),
        ..FlightFilter::default()
    };
    let table = project_flights(&store, &filter, &[], SortOrder::default()).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.headers.len(), FlightColumn::ALL.len());
}
