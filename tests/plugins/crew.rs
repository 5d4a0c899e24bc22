use chrono::{NaiveDate, NaiveDateTime};
use skyroster::core::error::IntegrityCause;
use skyroster::core::store::Store;
use skyroster::core::time::parse_datetime;
use skyroster::initialize_db;
use skyroster::plugins::crew::{
    CrewRole, assign_pilot_to_flight, find_available_pilots, find_unassigned_flights,
};
use skyroster::plugins::destination::{Destination, Terminal, add_destination, add_terminal};
use skyroster::plugins::flight::{Flight, FlightStatus, add_flight, get_flight};
use skyroster::plugins::pilot::{NewPilot, PilotId, add_pilot};
use tempfile::tempdir;

fn dt(s: &str) -> NaiveDateTime {
    parse_datetime(s).unwrap()
}

fn seeded_store(root: &std::path::Path) -> Store {
    let store = Store::open(root).unwrap();
    initialize_db(&store, false).unwrap();
    for code in ["EDI", "LHR"] {
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
    store
}

fn pilot(store: &Store, name: &str, captain: bool) -> PilotId {
    add_pilot(
        store,
        &NewPilot {
            name: name.to_string(),
            email: "crew@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1979, 9, 9).unwrap(),
            is_captain_qualified: captain,
            is_first_officer_qualified: true,
        },
    )
    .unwrap()
}

fn flight(id: &str, departs: &str, arrives: &str) -> Flight {
    Flight {
        flight_id: id.to_string(),
        scheduled_departure: dt(departs),
        status: FlightStatus::Scheduled,
        captain_id: None,
        first_officer_id: None,
        arrival_destination_id: "LHR".to_string(),
        departure_destination_id: "EDI".to_string(),
        diversion_destination_id: None,
        departure_terminal_id: "1".to_string(),
        arrival_terminal_id: None,
        diversion_terminal_id: None,
        scheduled_arrival: dt(arrives),
        actual_arrival: None,
        actual_departure: None,
    }
}

#[test]
fn test_assigned_pilots_unavailable_during_overlap_only() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(tmp.path());
    let p1 = pilot(&store, "Ada Park", true);
    let p2 = pilot(&store, "Ben Cole", true);
    let p3 = pilot(&store, "Cy Dunn", true);

    let f = flight("BA1441", "2025-03-01 08:00", "2025-03-01 10:00");
    add_flight(&store, &f).unwrap();
    assert!(assign_pilot_to_flight(&store, &f.key(), p1, CrewRole::Captain).unwrap().is_assigned());
    assert!(
        assign_pilot_to_flight(&store, &f.key(), p2, CrewRole::FirstOfficer)
            .unwrap()
            .is_assigned()
    );

    let during = find_available_pilots(&store, dt("2025-03-01 09:00"), dt("2025-03-01 09:30")).unwrap();
    assert_eq!(during.iter().map(|p| p.pilot_id).collect::<Vec<_>>(), vec![p3]);

    let after = find_available_pilots(&store, dt("2025-03-01 10:00"), dt("2025-03-01 11:00")).unwrap();
    assert_eq!(
        after.iter().map(|p| p.pilot_id).collect::<Vec<_>>(),
        vec![p1, p2, p3]
    );
}

#[test]
fn test_landed_flight_refuses_reassignment() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(tmp.path());
    let p1 = pilot(&store, "Ada Park", true);
    let p2 = pilot(&store, "Ben Cole", true);
    let p3 = pilot(&store, "Cy Dunn", true);

    let mut f = flight("BA1442", "2025-03-01 12:00", "2025-03-01 13:30");
    f.status = FlightStatus::Landed;
    f.captain_id = Some(p1);
    f.first_officer_id = Some(p2);
    add_flight(&store, &f).unwrap();

    let outcome = assign_pilot_to_flight(&store, &f.key(), p3, CrewRole::Captain).unwrap();
    assert_eq!(outcome.rows_affected, 0);
    assert!(outcome.qualification_warning.is_none());
    assert_eq!(get_flight(&store, &f.key()).unwrap().unwrap().captain_id, Some(p1));
}

#[test]
fn test_assigning_unknown_pilot_is_integrity_violation() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(tmp.path());
    let f = flight("BA1443", "2025-03-01 12:00", "2025-03-01 13:30");
    add_flight(&store, &f).unwrap();

    let err = assign_pilot_to_flight(&store, &f.key(), 404, CrewRole::FirstOfficer).unwrap_err();
    assert_eq!(err.integrity_cause(), Some(IntegrityCause::MissingReference));
    assert_eq!(get_flight(&store, &f.key()).unwrap().unwrap().first_officer_id, None);
}

#[test]
fn test_unqualified_captain_is_assigned_with_warning() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(tmp.path());
    let junior = pilot(&store, "Dee Ng", false);
    let f = flight("BA1444", "2025-03-01 12:00", "2025-03-01 13:30");
    add_flight(&store, &f).unwrap();

    let outcome = assign_pilot_to_flight(&store, &f.key(), junior, CrewRole::Captain).unwrap();
    assert!(outcome.is_assigned());
    let warning = outcome.qualification_warning.expect("warning expected");
    assert!(warning.contains("Dee Ng"));
}

#[test]
fn test_unassigned_flights_are_scheduled_with_an_empty_role() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(tmp.path());
    let p1 = pilot(&store, "Ada Park", true);
    let p2 = pilot(&store, "Ben Cole", true);

    let half = flight("U1", "2025-03-01 06:00", "2025-03-01 07:00");
    let full = flight("U2", "2025-03-01 08:00", "2025-03-01 09:00");
    let empty = flight("U3", "2025-03-01 10:00", "2025-03-01 11:00");
    for f in [&half, &full, &empty] {
        add_flight(&store, f).unwrap();
    }
    assign_pilot_to_flight(&store, &half.key(), p1, CrewRole::Captain).unwrap();
    assign_pilot_to_flight(&store, &full.key(), p1, CrewRole::Captain).unwrap();
    assign_pilot_to_flight(&store, &full.key(), p2, CrewRole::FirstOfficer).unwrap();

    let unassigned = find_unassigned_flights(&store).unwrap();
    assert!(unassigned.iter().all(Flight::is_unassigned));
    let ids: Vec<&str> = unassigned.iter().map(|f| f.flight_id.as_str()).collect();
    assert_eq!(ids, vec!["U1", "U3"]);
    assert!(!get_flight(&store, &full.key()).unwrap().unwrap().is_unassigned());
}

#[test]
fn test_inverted_period_is_rejected() {
    let tmp = tempdir().unwrap();
    let store = seeded_store(tmp.path());
    assert!(find_available_pilots(&store, dt("2025-03-01 10:00"), dt("2025-03-01 09:00")).is_err());
}
