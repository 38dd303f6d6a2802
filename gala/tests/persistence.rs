//! Snapshot persistence through the file store and bootstrap.

#![allow(clippy::unwrap_used)]

mod common;

use common::{SECOND_YEAR, STAFF, STAFF_MEMBER, STUDENTS, date};
use gala::{
    BootstrapError, GalaCommand, GalaConfig, ParticipationStatus, RosterError, TableId, open_store,
};
use gala_core::snapshot::SnapshotError;
use gala_testing::test_clock;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn config_in(dir: &Path) -> GalaConfig {
    let students = dir.join("students.tsv");
    let staff = dir.join("staff.tsv");
    fs::write(&students, STUDENTS).unwrap();
    fs::write(&staff, STAFF).unwrap();

    let mut config = GalaConfig::default();
    config.snapshot_path = dir.join("state").join("gala.snapshot");
    config.roster.students = students;
    config.roster.staff = staff;
    config
}

#[test]
fn fresh_start_writes_first_snapshot() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());

    let store = open_store(&config, Arc::new(test_clock())).unwrap();

    assert!(config.snapshot_path.exists());
    assert_eq!(store.state(|e| e.registry().len()).unwrap(), 6);
    assert_eq!(store.state(|e| e.days_until_event()).unwrap(), 15);
}

#[test]
fn state_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());

    {
        let store = open_store(&config, Arc::new(test_clock())).unwrap();
        store.send(GalaCommand::Subscribe { member_id: SECOND_YEAR }).unwrap();
        store.send(GalaCommand::Subscribe { member_id: STAFF_MEMBER }).unwrap();
        store
            .send(GalaCommand::Reserve {
                member_id: SECOND_YEAR,
                accompanists: 1,
                table: Some(TableId::new(3)),
            })
            .unwrap();
        store
            .send(GalaCommand::Reserve {
                member_id: STAFF_MEMBER,
                accompanists: 0,
                table: None,
            })
            .unwrap();
        store
            .send(GalaCommand::SetCurrentDate { date: date(2021, 12, 1) })
            .unwrap();
    }

    // Rosters are only read on a fresh start
    fs::remove_file(&config.roster.students).unwrap();

    let store = open_store(&config, Arc::new(test_clock())).unwrap();
    let (hold, accepted, seats, days) = store
        .state(|e| {
            (
                e.participation(SECOND_YEAR),
                e.participation(STAFF_MEMBER),
                e.tables().get(TableId::new(3)).unwrap().seats_remaining(),
                e.days_until_event(),
            )
        })
        .unwrap();
    assert_eq!(hold, ParticipationStatus::OnHold);
    assert_eq!(accepted, ParticipationStatus::Accepted);
    assert_eq!(seats, 6);
    assert_eq!(days, 31);
    assert!(store.state(|e| e.check_invariants()).unwrap().is_ok());
}

#[test]
fn missing_roster_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    fs::remove_file(&config.roster.staff).unwrap();

    let result = open_store(&config, Arc::new(test_clock()));

    assert!(matches!(
        result,
        Err(BootstrapError::Roster(RosterError::Io { .. }))
    ));
    assert!(!config.snapshot_path.exists());
}

#[test]
fn corrupt_snapshot_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    fs::create_dir_all(config.snapshot_path.parent().unwrap()).unwrap();
    fs::write(&config.snapshot_path, b"not a snapshot").unwrap();

    let result = open_store(&config, Arc::new(test_clock()));

    assert!(matches!(
        result,
        Err(BootstrapError::Snapshot(SnapshotError::Deserialization(_)))
    ));
}

#[test]
fn invalid_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.venue.table_capacity = 0;

    assert!(matches!(
        open_store(&config, Arc::new(test_clock())),
        Err(BootstrapError::Config(_))
    ));
}
