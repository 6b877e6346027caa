//! Durability Tests
//!
//! - Acknowledged writes survive a reopen
//! - Id sequence continues after reopen
//! - Torn or zero-filled tail dropped, mid-log corruption refused
//! - Ephemeral ledgers keep nothing

use crate::*;
use std::fs::OpenOptions;
use std::io::Write;

#[test]
fn test_history_survives_reopen() {
    let mut test = TestLedger::new();
    let a = test.ledger().create_lot().unwrap();
    let b = test.ledger().create_lot().unwrap();
    test.ledger().add_step(a, "Siembra").unwrap();
    test.clock.advance(3_600);
    test.ledger().add_step(a, "Cosecha").unwrap();
    test.ledger().add_step(b, "Secado").unwrap();

    let before_a = test.ledger().get_lot(a).unwrap();
    let before_b = test.ledger().get_lot(b).unwrap();

    test.reopen();

    assert_eq!(test.ledger().get_lot(a).unwrap(), before_a);
    assert_eq!(test.ledger().get_lot(b).unwrap(), before_b);
    assert_eq!(test.ledger().lot_count(), 2);
    assert!(test.ledger().verify_lot(a).is_ok());
}

#[test]
fn test_ids_continue_after_reopen() {
    let mut test = TestLedger::new();
    for _ in 0..3 {
        test.ledger().create_lot().unwrap();
    }
    test.reopen();

    assert_eq!(test.ledger().create_lot().unwrap(), LotId::new(4));
    test.reopen();
    assert_eq!(test.ledger().create_lot().unwrap(), LotId::new(5));
}

#[test]
fn test_appends_after_reopen_extend_history() {
    let mut test = TestLedger::new();
    let lot = test.ledger().create_lot().unwrap();
    test.ledger().add_step(lot, "Siembra").unwrap();
    test.reopen();

    test.ledger().add_step(lot, "Cosecha").unwrap();
    test.reopen();

    let snap = test.ledger().get_lot(lot).unwrap();
    assert_eq!(snap.steps, vec!["Siembra", "Cosecha"]);
    assert!(test.ledger().verify_lot(lot).is_ok());
}

#[test]
fn test_timestamps_stay_ordered_when_clock_regresses_across_reopen() {
    let mut test = TestLedger::new();
    let lot = test.ledger().create_lot().unwrap();
    test.clock.advance(1_000);
    test.ledger().add_step(lot, "Siembra").unwrap();
    test.reopen();

    test.clock.set(Timestamp::from_secs(T0 - 50_000));
    test.ledger().add_step(lot, "Cosecha").unwrap();

    let snap = test.ledger().get_lot(lot).unwrap();
    assert_eq!(snap.timestamps[0], Timestamp::from_secs(T0 + 1_000));
    assert!(snap.timestamps[0] <= snap.timestamps[1]);
}

#[test]
fn test_torn_tail_is_dropped_on_reopen() {
    let mut test = TestLedger::new();
    let lot = test.ledger().create_lot().unwrap();
    test.ledger().add_step(lot, "Siembra").unwrap();
    test.close();

    let clean_len = std::fs::metadata(test.wal_path()).unwrap().len();
    {
        // Header promises 64 bytes but only 3 follow
        let mut f = OpenOptions::new().append(true).open(test.wal_path()).unwrap();
        f.write_all(&[64, 0, 0, 0, 0xde, 0xad, 0xbe, 0xef, 1, 2, 3]).unwrap();
    }

    test.try_reopen().unwrap();
    let report = test.ledger().recovery().unwrap();
    assert_eq!(report.torn_tail_bytes, 11);
    assert_eq!(report.records_replayed, 2);
    assert_eq!(test.ledger().get_lot(lot).unwrap().steps, vec!["Siembra"]);
    assert_eq!(std::fs::metadata(test.wal_path()).unwrap().len(), clean_len);

    // The log is writable again after truncation
    test.ledger().add_step(lot, "Cosecha").unwrap();
    test.reopen();
    assert_eq!(test.ledger().get_lot(lot).unwrap().len(), 2);
}

#[test]
fn test_zero_filled_tail_is_dropped_on_reopen() {
    let mut test = TestLedger::new();
    let lot = test.ledger().create_lot().unwrap();
    test.ledger().add_step(lot, "Siembra").unwrap();
    test.close();

    let clean_len = std::fs::metadata(test.wal_path()).unwrap().len();
    {
        let mut f = OpenOptions::new().append(true).open(test.wal_path()).unwrap();
        f.write_all(&[0u8; 64]).unwrap();
    }

    test.try_reopen().unwrap();
    assert_eq!(test.ledger().recovery().unwrap().torn_tail_bytes, 64);
    assert_eq!(test.ledger().get_lot(lot).unwrap().steps, vec!["Siembra"]);
    assert_eq!(std::fs::metadata(test.wal_path()).unwrap().len(), clean_len);

    test.ledger().add_step(lot, "Cosecha").unwrap();
    assert_eq!(test.ledger().create_lot().unwrap(), LotId::new(2));
    test.reopen();
    assert_eq!(test.ledger().get_lot(lot).unwrap().len(), 2);
}

#[test]
fn test_corrupted_record_fails_open() {
    let mut test = TestLedger::new();
    let lot = test.ledger().create_lot().unwrap();
    test.ledger().add_step(lot, "Siembra").unwrap();
    test.close();

    let mut bytes = std::fs::read(test.wal_path()).unwrap();
    // Inside the first record's payload, after the 8-byte frame header
    bytes[10] ^= 0xff;
    std::fs::write(test.wal_path(), &bytes).unwrap();

    let err = test.try_reopen().unwrap_err();
    assert!(err.is_storage(), "expected storage error, got {:?}", err);
    assert!(err.is_serious());
}

#[test]
fn test_wal_grows_with_writes() {
    let test = TestLedger::new();
    let start = test.ledger().metrics().wal_bytes.unwrap();
    let lot = test.ledger().create_lot().unwrap();
    let after_create = test.ledger().metrics().wal_bytes.unwrap();
    test.ledger().add_step(lot, "Siembra").unwrap();
    let after_step = test.ledger().metrics().wal_bytes.unwrap();

    assert!(start < after_create);
    assert!(after_create < after_step);
    assert_eq!(after_step, std::fs::metadata(test.wal_path()).unwrap().len());
}

#[test]
fn test_rejected_writes_leave_log_untouched() {
    let test = TestLedger::new();
    let lot = test.ledger().create_lot().unwrap();
    let before = test.ledger().metrics().wal_bytes;

    assert!(test.ledger().add_step(lot, " ").is_err());
    assert!(test.ledger().add_step(LotId::new(7), "Siembra").is_err());

    assert_eq!(test.ledger().metrics().wal_bytes, before);
}

#[test]
fn test_buffered_ledger_persists_after_flush() {
    init_tracing();
    let dir = tempfile::TempDir::new().unwrap();
    let lot = {
        let ledger = Ledger::builder()
            .path(dir.path())
            .buffered_with(60_000, 10_000)
            .open()
            .unwrap();
        assert!(matches!(
            ledger.durability_mode(),
            DurabilityMode::Batched { .. }
        ));
        let lot = ledger.create_lot().unwrap();
        ledger.add_step(lot, "Tueste").unwrap();
        ledger.flush().unwrap();
        ledger.close().unwrap();
        lot
    };

    let ledger = Ledger::open(dir.path()).unwrap();
    assert_eq!(ledger.get_lot(lot).unwrap().steps, vec!["Tueste"]);
}

#[test]
fn test_ephemeral_ledger_keeps_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let ledger = Ledger::builder()
            .path(dir.path())
            .no_durability()
            .open()
            .unwrap();
        assert!(ledger.is_ephemeral());
        let lot = ledger.create_lot().unwrap();
        ledger.add_step(lot, "Siembra").unwrap();
    }

    assert!(!dir.path().join("ledger.wal").exists());
    let ledger = Ledger::open(dir.path()).unwrap();
    assert_eq!(ledger.lot_count(), 0);
    assert_eq!(ledger.create_lot().unwrap(), LotId::new(1));
}
