// Property tests for the probability summary: bounds hold for any count.

use proptest::prelude::*;

use bitcents::models::pricer::{summarize, wilson_interval};

proptest! {
    #[test]
    fn summary_bounds_hold(n in 0u64..100_000, frac in 0.0f64..=1.0) {
        let hits = ((n as f64) * frac).floor() as u64;
        let summary = summarize(hits, n, 1.96);

        prop_assert!((0.0..=1.0).contains(&summary.p));
        prop_assert!(summary.ci.0 <= summary.p + 1e-12);
        prop_assert!(summary.p <= summary.ci.1 + 1e-12);
        prop_assert!(summary.ci.0 >= 0.0 && summary.ci.1 <= 1.0);
        prop_assert!(summary.fair_cents <= 100);
        prop_assert!(summary.stderr >= 0.0);
    }

    #[test]
    fn wider_z_never_narrows(hits in 0u64..1000, extra in 0u64..1000) {
        let n = hits + extra;
        prop_assume!(n > 0);
        let (lo95, hi95) = wilson_interval(hits, n, 1.96);
        let (lo99, hi99) = wilson_interval(hits, n, 2.576);
        prop_assert!(lo99 <= lo95 + 1e-12);
        prop_assert!(hi99 >= hi95 - 1e-12);
    }

    #[test]
    fn more_data_shrinks_the_interval(hits in 1u64..500) {
        let (lo_small, hi_small) = wilson_interval(hits, hits * 2, 1.96);
        let (lo_big, hi_big) = wilson_interval(hits * 100, hits * 200, 1.96);
        prop_assert!(hi_big - lo_big < hi_small - lo_small);
    }
}
