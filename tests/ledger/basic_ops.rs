//! Basic Operation Tests
//!
//! - create_lot / add_step / get_lot happy paths
//! - The documented example scenarios
//! - Error cases: unknown lot, zero id, blank description

use crate::*;

// =============================================================================
// EXAMPLE SCENARIOS
// =============================================================================

#[test]
fn test_create_then_single_step() {
    let (ledger, _) = ephemeral_with_clock();

    let lot = ledger.create_lot().unwrap();
    assert_eq!(lot, LotId::new(1));

    ledger.add_step(lot, "Siembra").unwrap();
    let snap = ledger.get_lot(lot).unwrap();
    assert_eq!(snap.id, LotId::new(1));
    assert_eq!(snap.steps, vec!["Siembra"]);
    assert_eq!(snap.timestamps, vec![Timestamp::from_secs(T0)]);
}

#[test]
fn test_second_lot_gets_next_id() {
    let (ledger, _) = ephemeral_with_clock();
    assert_eq!(ledger.create_lot().unwrap(), LotId::new(1));
    assert_eq!(ledger.create_lot().unwrap(), LotId::new(2));
    assert_eq!(ledger.lot_ids(), vec![LotId::new(1), LotId::new(2)]);
}

#[test]
fn test_add_step_to_unknown_lot_is_not_found() {
    let (ledger, _) = ephemeral_with_clock();
    ledger.create_lot().unwrap();

    let err = ledger.add_step(LotId::new(99), "X").unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {:?}", err);
    assert_eq!(ledger.lot_count(), 1);
    assert!(!ledger.contains(LotId::new(99)));
}

#[test]
fn test_two_steps_keep_order() {
    let (ledger, clock) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();

    ledger.add_step(lot, "Siembra").unwrap();
    clock.advance(86_400);
    ledger.add_step(lot, "Cosecha").unwrap();

    let snap = ledger.get_lot(lot).unwrap();
    assert_eq!(snap.steps, vec!["Siembra", "Cosecha"]);
    assert!(snap.timestamps[0] <= snap.timestamps[1]);
    assert_eq!(snap.timestamps[1].as_secs() - snap.timestamps[0].as_secs(), 86_400);
}

#[test]
fn test_empty_description_rejected_without_mutation() {
    let (ledger, _) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();
    ledger.add_step(lot, "Siembra").unwrap();
    let before = ledger.get_lot(lot).unwrap();

    let err = ledger.add_step(lot, "").unwrap_err();
    assert!(err.is_invalid_argument(), "expected InvalidArgument, got {:?}", err);
    let err = ledger.add_step(lot, "   ").unwrap_err();
    assert!(err.is_invalid_argument());

    assert_eq!(ledger.get_lot(lot).unwrap(), before);
}

// =============================================================================
// READS
// =============================================================================

#[test]
fn test_new_lot_has_empty_history() {
    let (ledger, _) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();
    let snap = ledger.get_lot(lot).unwrap();
    assert!(snap.is_empty());
    assert!(snap.timestamps.is_empty());
}

#[test]
fn test_get_unknown_lot_is_not_found() {
    let (ledger, _) = ephemeral_with_clock();
    assert!(ledger.get_lot(LotId::new(1)).unwrap_err().is_not_found());

    ledger.create_lot().unwrap();
    assert!(ledger.get_lot(LotId::new(2)).unwrap_err().is_not_found());
}

#[test]
fn test_zero_id_is_invalid_argument() {
    let (ledger, _) = ephemeral_with_clock();
    ledger.create_lot().unwrap();
    assert!(ledger.get_lot(LotId::new(0)).unwrap_err().is_invalid_argument());
    assert!(ledger
        .add_step(LotId::new(0), "Siembra")
        .unwrap_err()
        .is_invalid_argument());
}

#[test]
fn test_repeated_reads_are_identical() {
    let (ledger, clock) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();
    ledger.add_step(lot, "Siembra").unwrap();
    clock.advance(5);

    let a = ledger.get_lot(lot).unwrap();
    let b = ledger.get_lot(lot).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_snapshot_unaffected_by_later_appends() {
    let (ledger, _) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();
    ledger.add_step(lot, "Siembra").unwrap();

    let snap = ledger.get_lot(lot).unwrap();
    ledger.add_step(lot, "Cosecha").unwrap();

    assert_eq!(snap.steps, vec!["Siembra"]);
    assert_eq!(ledger.get_lot(lot).unwrap().len(), 2);
}

#[test]
fn test_lots_are_independent() {
    let (ledger, _) = ephemeral_with_clock();
    let a = ledger.create_lot().unwrap();
    let b = ledger.create_lot().unwrap();
    ledger.add_step(a, "Siembra").unwrap();
    ledger.add_step(b, "Secado").unwrap();
    ledger.add_step(a, "Cosecha").unwrap();

    assert_eq!(ledger.get_lot(a).unwrap().steps, vec!["Siembra", "Cosecha"]);
    assert_eq!(ledger.get_lot(b).unwrap().steps, vec!["Secado"]);
    assert_ne!(ledger.get_lot(a).unwrap().head, ledger.get_lot(b).unwrap().head);
}

#[test]
fn test_description_stored_verbatim() {
    let (ledger, _) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();
    ledger.add_step(lot, "  Beneficio húmedo  ").unwrap();
    assert_eq!(ledger.get_lot(lot).unwrap().steps[0], "  Beneficio húmedo  ");
}

#[test]
fn test_snapshot_serializes_as_json() {
    let (ledger, _) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();
    ledger.add_step(lot, "Siembra").unwrap();

    let json = serde_json::to_value(ledger.get_lot(lot).unwrap()).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["steps"], serde_json::json!(["Siembra"]));
    assert_eq!(json["timestamps"], serde_json::json!([T0]));
}

#[test]
fn test_verify_lot_after_many_steps() {
    let (ledger, clock) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();
    for step in ["Siembra", "Cosecha", "Despulpado", "Fermentado", "Secado", "Tueste"] {
        ledger.add_step(lot, step).unwrap();
        clock.advance(3_600);
    }
    let head = ledger.verify_lot(lot).unwrap();
    assert_eq!(head, ledger.get_lot(lot).unwrap().head);
    assert!(ledger.verify_lot(LotId::new(2)).unwrap_err().is_not_found());
}
