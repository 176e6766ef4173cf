use super::common::*;
use std::sync::Arc;

use rust_decimal_macros::dec;
use serde_json::Value;

use crate::workflows::intake::domain::{ApplicationForm, Progress, Section};
use crate::workflows::intake::gateway::generate_application_id;
use crate::workflows::intake::persistence::{
    FileSnapshotStore, MemorySnapshotStore, PersistenceError, SnapshotPersistence, SnapshotStore,
    STORAGE_KEY,
};
use crate::workflows::intake::snapshot::FormSnapshot;

fn sample_snapshot() -> FormSnapshot {
    let mut progress = Progress::default();
    progress.mark_completed(Section::Identity);
    progress.set_current_step(Section::Household);
    FormSnapshot::capture(&valid_form(), &progress)
}

#[test]
fn save_then_load_round_trips() {
    let (_, persistence) = memory_persistence();
    let snapshot = sample_snapshot();

    persistence.save(&snapshot).expect("save");
    assert_eq!(persistence.load(), Some(snapshot));
}

#[test]
fn high_precision_income_survives_the_round_trip() {
    let (backend, persistence) = memory_persistence();
    let mut form = valid_form();
    form.household.monthly_income = dec!(4250.123456789012345678);
    let snapshot = FormSnapshot::capture(&form, &Progress::default());

    persistence.save(&snapshot).expect("save");
    let raw = backend
        .read(STORAGE_KEY)
        .expect("readable")
        .expect("snapshot written");
    assert!(raw.contains("\"monthlyIncome\":4250.123456789012345678"), "{raw}");

    let loaded = persistence.load().expect("snapshot loads");
    assert_eq!(loaded, snapshot);
    let (restored, _) = loaded.into_parts().expect("valid snapshot");
    assert_eq!(
        restored.household.monthly_income.to_string(),
        "4250.123456789012345678"
    );
}

#[test]
fn load_without_snapshot_is_absent() {
    let (_, persistence) = memory_persistence();
    assert_eq!(persistence.load(), None);
}

#[test]
fn malformed_content_loads_as_absent() {
    let (backend, persistence) = memory_persistence();
    for raw in [
        "not json",
        "{\"personalInfo\": {}}",
        "{\"currentStep\": \"two\"}",
    ] {
        backend.insert_raw(STORAGE_KEY, raw).expect("seed");
        assert_eq!(persistence.load(), None, "{raw} should be ignored");
        assert!(persistence.load_checked().is_err());
    }
}

#[test]
fn step_outside_wizard_loads_as_absent() {
    let (backend, persistence) = memory_persistence();
    let mut snapshot = sample_snapshot();
    snapshot.completed_steps = vec![1, 7];
    let raw = serde_json::to_string(&snapshot).expect("encode");
    backend.insert_raw(STORAGE_KEY, &raw).expect("seed");

    assert_eq!(persistence.load(), None);
}

#[test]
fn clear_is_idempotent() {
    let (_, persistence) = memory_persistence();
    persistence.save(&sample_snapshot()).expect("save");

    persistence.clear().expect("first clear");
    persistence.clear().expect("second clear");
    assert_eq!(persistence.load(), None);
}

#[test]
fn quota_exhaustion_is_reported() {
    let store = Arc::new(MemorySnapshotStore::with_quota(64));
    let persistence = SnapshotPersistence::new(store);

    let err = persistence
        .save(&sample_snapshot())
        .expect_err("snapshot larger than quota");
    assert!(matches!(err, PersistenceError::QuotaExceeded { .. }));
    assert_eq!(persistence.load(), None);
}

#[test]
fn snapshot_uses_the_documented_field_names() {
    let raw = sample_snapshot().to_json().expect("encode");
    let value: Value = serde_json::from_str(&raw).expect("json");

    assert_eq!(value["currentStep"], 2);
    assert_eq!(value["completedSteps"], serde_json::json!([1]));
    assert_eq!(value["personalInfo"]["fullName"], "Mariam Haddad");
    assert_eq!(value["personalInfo"]["dateOfBirth"], "1990-04-12");
    assert_eq!(value["personalInfo"]["address"], "14 Al Wasl Road");
    assert_eq!(value["personalInfo"]["state"], "Dubai");
    assert_eq!(value["familyFinancialInfo"]["maritalStatus"], "married");
    assert!(value["familyFinancialInfo"]["monthlyIncome"].is_number());
    assert_eq!(
        value["situationDescriptions"]["reasonForApplying"],
        REASON_FOR_APPLYING
    );
}

#[test]
fn empty_birth_date_is_written_as_empty_string() {
    let snapshot = FormSnapshot::capture(&ApplicationForm::default(), &Progress::default());
    let value: Value = serde_json::from_str(&snapshot.to_json().expect("encode")).expect("json");
    assert_eq!(value["personalInfo"]["dateOfBirth"], "");
    assert_eq!(value["currentStep"], 1);
}

#[test]
fn file_store_round_trips_and_clears() {
    let root = std::env::temp_dir().join(format!("intake-{}", generate_application_id()));
    let store = Arc::new(FileSnapshotStore::new(&root));
    let persistence = SnapshotPersistence::new(Arc::clone(&store));

    assert_eq!(persistence.load(), None);
    let snapshot = sample_snapshot();
    persistence.save(&snapshot).expect("save");
    assert!(root.join(format!("{STORAGE_KEY}.json")).exists());
    assert_eq!(persistence.load(), Some(snapshot));

    persistence.clear().expect("clear");
    persistence.clear().expect("clear again");
    assert_eq!(persistence.load(), None);

    let _ = std::fs::remove_dir_all(root);
}
