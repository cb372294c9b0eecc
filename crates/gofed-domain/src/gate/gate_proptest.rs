//! Property-based tests for admission gate accounting.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::gate::AdmissionGate;

    /// An operation against the gate: take a slot, or give back the n-th held one.
    #[derive(Debug, Clone)]
    enum GateOp {
        Acquire,
        Release(usize),
    }

    fn gate_op_strategy() -> impl Strategy<Value = GateOp> {
        prop_oneof![
            Just(GateOp::Acquire),
            any::<usize>().prop_map(GateOp::Release),
        ]
    }

    proptest! {
        #[test]
        fn test_in_use_tracks_held_permits(
            capacity in 1usize..16,
            ops in prop::collection::vec(gate_op_strategy(), 0..200),
        ) {
            let gate = AdmissionGate::new(capacity).unwrap();
            let mut held = Vec::new();

            for op in ops {
                match op {
                    GateOp::Acquire => {
                        let permit = gate.try_acquire();
                        // A grant happens exactly when a slot was free
                        prop_assert_eq!(permit.is_some(), held.len() < capacity);
                        held.extend(permit);
                    }
                    GateOp::Release(n) if !held.is_empty() => {
                        let idx = n % held.len();
                        held.swap_remove(idx).release();
                    }
                    GateOp::Release(_) => {}
                }

                let stats = gate.stats();
                prop_assert!(stats.in_use <= capacity);
                prop_assert_eq!(stats.in_use, held.len());
                prop_assert_eq!(stats.available, capacity - stats.in_use);
            }

            drop(held);
            prop_assert_eq!(gate.stats().in_use, 0);
        }
    }
}
