//! K-Operator tests.

use proptest::prelude::*;

use genesis_kernel::config::StabilizerConfig;
use genesis_kernel::math::stabilizer::{KOperator, StabilizerError, STABILIZER_DEPTH};

#[test]
fn depth_is_fixed_whatever_the_config() {
    let op = KOperator::from_config(&StabilizerConfig {
        seed_floor: 0.5,
        max_memory_mb: 1,
    });
    let outcome = op.recurse(10.0).expect("scalar fits");
    assert_eq!(outcome.depth, STABILIZER_DEPTH);
    assert_eq!(STABILIZER_DEPTH, 7);
    assert!(op.reached_depth_bound(&outcome));
}

#[test]
fn zero_memory_ceiling_trips_guard() {
    let op = KOperator::from_config(&StabilizerConfig {
        max_memory_mb: 0,
        ..StabilizerConfig::default()
    });
    assert!(matches!(
        op.recurse(1.0),
        Err(StabilizerError::ResourceLimit { ceiling_mb: 0, .. })
    ));
}

#[test]
fn seeds_below_floor_share_a_result() {
    let op = KOperator::default();
    let a = op.recurse(0.0).expect("scalar fits");
    let b = op.recurse(-1.0e9).expect("scalar fits");
    let c = op.recurse(f64::NEG_INFINITY).expect("scalar fits");
    assert_eq!(a, b);
    assert_eq!(b, c);
}

proptest! {
    #[test]
    fn result_is_finite_and_non_negative(seed in 0.001_f64..1.0e300) {
        let outcome = KOperator::default().recurse(seed).expect("scalar fits");
        prop_assert!(outcome.value.is_finite());
        prop_assert!(outcome.value >= 0.0);
        prop_assert_eq!(outcome.depth, STABILIZER_DEPTH);
    }
}
