//! Property tests for delay gates.

#![allow(clippy::unwrap_used)]

use delve_core::DelayGate;
use proptest::prelude::*;

proptest! {
    #[test]
    fn fires_exactly_on_multiples_of_max(max in 1_u32..64, calls in 1_u32..512) {
        let mut gate = DelayGate::new("property", max).unwrap();
        for call in 1..=calls {
            let fired = gate.trigger();
            prop_assert_eq!(fired, call % max == 0, "call {} with max {}", call, max);
        }
    }

    #[test]
    fn remaining_never_exceeds_max(max in 1_u32..64, calls in 0_u32..256) {
        let mut gate = DelayGate::new("bounded", max).unwrap();
        for _ in 0..calls {
            gate.trigger();
            prop_assert!(gate.remaining() >= 1);
            prop_assert!(gate.remaining() <= max);
        }
    }
}
