use chrono::NaiveDate;
use skyroster::core::error::RosterError;
use skyroster::core::store::Store;
use skyroster::initialize_db;
use skyroster::plugins::pilot::{
    NewPilot, PilotField, add_pilot, get_pilot, list_pilots, update_pilot,
};
use tempfile::tempdir;

fn open_store(root: &std::path::Path) -> Store {
    let store = Store::open(root).unwrap();
    initialize_db(&store, false).unwrap();
    store
}

fn new_pilot(name: &str, captain: bool) -> NewPilot {
    NewPilot {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        date_of_birth: NaiveDate::from_ymd_opt(1984, 2, 11).unwrap(),
        is_captain_qualified: captain,
        is_first_officer_qualified: true,
    }
}

#[test]
fn test_pilot_ids_are_generated_in_order() {
    let tmp = tempdir().unwrap();
    let store = open_store(tmp.path());

    let first = add_pilot(&store, &new_pilot("Ada Park", true)).unwrap();
    let second = add_pilot(&store, &new_pilot("Ben Cole", false)).unwrap();
    assert!(second > first);

    let pilots = list_pilots(&store).unwrap();
    assert_eq!(pilots.len(), 2);
    assert_eq!(pilots[0].pilot_id, first);
    assert!(pilots[0].is_captain_qualified);
    assert!(!pilots[1].is_captain_qualified);
    assert_eq!(
        pilots[0].date_of_birth,
        NaiveDate::from_ymd_opt(1984, 2, 11).unwrap()
    );
}

#[test]
fn test_update_requires_matching_id_and_name() {
    let tmp = tempdir().unwrap();
    let store = open_store(tmp.path());
    let id = add_pilot(&store, &new_pilot("Ada Park", false)).unwrap();

    let rows = update_pilot(&store, id, "Someone Else", PilotField::CaptainQualified, "yes").unwrap();
    assert_eq!(rows, 0);
    assert!(!get_pilot(&store, id).unwrap().unwrap().is_captain_qualified);

    let rows = update_pilot(&store, id, "ada park", PilotField::CaptainQualified, "yes").unwrap();
    assert_eq!(rows, 1);
    assert!(get_pilot(&store, id).unwrap().unwrap().is_captain_qualified);

    let rows = update_pilot(&store, id, "Ada Park", PilotField::Email, "ada.p@example.org").unwrap();
    assert_eq!(rows, 1);
    assert_eq!(get_pilot(&store, id).unwrap().unwrap().email, "ada.p@example.org");
}

#[test]
fn test_invalid_values_rejected_before_write() {
    let tmp = tempdir().unwrap();
    let store = open_store(tmp.path());
    let id = add_pilot(&store, &new_pilot("Ada Park", true)).unwrap();

    let err = update_pilot(&store, id, "Ada Park", PilotField::DateOfBirth, "11/02/1984").unwrap_err();
    assert!(matches!(err, RosterError::InvalidInput(_)));

    let mut bad = new_pilot("Cy Dunn", true);
    bad.email = "cy-at-example".to_string();
    assert!(matches!(
        add_pilot(&store, &bad),
        Err(RosterError::InvalidInput(_))
    ));
    assert_eq!(list_pilots(&store).unwrap().len(), 1);
}

#[test]
fn test_unknown_pilot_is_none() {
    let tmp = tempdir().unwrap();
    let store = open_store(tmp.path());
    assert!(get_pilot(&store, 42).unwrap().is_none());
}
