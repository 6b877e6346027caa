//! Ledger Invariant Tests
//!
//! Property tests over arbitrary operation sequences:
//! - Ids are distinct and strictly increasing
//! - steps/timestamps stay aligned and timestamps never decrease
//! - The last appended description is the last step
//! - Ids never returned by create_lot are NotFound

use crate::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create,
    Append { lot: u64, desc: String, clock_delta: i64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Create),
        4 => (1u64..8, "[A-Za-z ]{0,12}", -100i64..1_000)
            .prop_map(|(lot, desc, clock_delta)| Op::Append { lot, desc, clock_delta }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ids_strictly_increasing(n in 1usize..50) {
        let (ledger, _) = ephemeral_with_clock();
        let ids: Vec<LotId> = (0..n).map(|_| ledger.create_lot().unwrap()).collect();
        for (i, id) in ids.iter().enumerate() {
            prop_assert_eq!(id.as_u64(), i as u64 + 1);
        }
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_history_invariants_hold(ops in proptest::collection::vec(op_strategy(), 1..80)) {
        let (ledger, clock) = ephemeral_with_clock();
        let mut created: u64 = 0;
        let mut expected: std::collections::HashMap<u64, Vec<String>> = Default::default();

        for op in ops {
            match op {
                Op::Create => {
                    let id = ledger.create_lot().unwrap();
                    created += 1;
                    prop_assert_eq!(id.as_u64(), created);
                    expected.insert(created, Vec::new());
                }
                Op::Append { lot, desc, clock_delta } => {
                    clock.advance(clock_delta);
                    let result = ledger.add_step(LotId::new(lot), &desc);
                    if lot > created {
                        prop_assert!(result.unwrap_err().is_not_found());
                    } else if desc.trim().is_empty() {
                        prop_assert!(result.unwrap_err().is_invalid_argument());
                    } else {
                        prop_assert!(result.is_ok());
                        expected.get_mut(&lot).unwrap().push(desc.clone());
                        let snap = ledger.get_lot(LotId::new(lot)).unwrap();
                        prop_assert_eq!(snap.steps.last(), Some(&desc));
                    }
                }
            }
        }

        for id in 1..=created {
            let snap = ledger.get_lot(LotId::new(id)).unwrap();
            prop_assert_eq!(snap.steps.len(), snap.timestamps.len());
            prop_assert!(snap.timestamps.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(&snap.steps, &expected[&id]);
            prop_assert!(ledger.verify_lot(LotId::new(id)).is_ok());
        }
        prop_assert!(ledger.get_lot(LotId::new(created + 1)).unwrap_err().is_not_found());
    }
}

#[test]
fn test_no_update_or_delete_surface() {
    // The only mutations are create_lot and add_step; a recorded step can
    // only be observed, never changed.
    let (ledger, _) = ephemeral_with_clock();
    let lot = ledger.create_lot().unwrap();
    ledger.add_step(lot, "Siembra").unwrap();

    let mut snap = ledger.get_lot(lot).unwrap();
    snap.steps[0] = "Tampered".to_string();

    assert_eq!(ledger.get_lot(lot).unwrap().steps, vec!["Siembra"]);
    assert!(ledger.verify_lot(lot).is_ok());
}
