// The variance read by the price update must never be negative, across a
// wide sweep of parameter bundles inside the data-model invariants,
// including bundles that violate the Feller condition badly.

use bitcents::models::kernel::PathKernel;
use bitcents::models::rng::PathRng;
use bitcents::models::{
    HestonParams, JumpParams, Regime, RegimeParams, RegimeSet, RegimeSwitch, SimInputs,
};

fn random_inputs(rng: &mut PathRng) -> SimInputs {
    let heston = HestonParams {
        kappa: 0.1 + 4.9 * rng.uniform(),
        theta: 1e-4 + 0.25 * rng.uniform(),
        xi: 0.05 + 1.45 * rng.uniform(),
        rho: -1.0 + 2.0 * rng.uniform(),
    };
    let regime = RegimeParams {
        mu: (rng.uniform() - 0.5) * 0.01,
        heston,
    };
    SimInputs {
        s0: 1_000.0 + 99_000.0 * rng.uniform(),
        horizon_hours: 1.0,
        dt_hours: 1.0 / 60.0,
        regimes: RegimeSet {
            bull: regime,
            bear: regime,
        },
        switching: RegimeSwitch::pinned(Regime::Bull),
        jumps: JumpParams::none(),
    }
}

#[test]
fn variance_at_point_of_use_is_never_negative() {
    let mut param_rng = PathRng::new(2024);
    let mut total_steps = 0u64;

    for bundle in 0..1200 {
        let inputs = random_inputs(&mut param_rng);
        inputs.validate().expect("random bundle within invariants");
        let kernel = PathKernel::new(&inputs, false);

        for path in 0..15 {
            let mut rng = PathRng::for_stream(7, bundle, path);
            let outcome = kernel
                .simulate(&mut rng, false)
                .expect("in-invariant bundle must not fault");
            assert!(
                outcome.min_variance_used >= 0.0,
                "negative variance used: {} (bundle {})",
                outcome.min_variance_used,
                bundle
            );
            assert!(outcome.terminal.is_finite() && outcome.terminal > 0.0);
            total_steps += kernel.n_steps() as u64;
        }
    }

    assert!(total_steps >= 1_000_000, "sweep too small: {}", total_steps);
}
