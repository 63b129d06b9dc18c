use mfdash::analytics::metrics::daily_return_stats;
use mfdash::analytics::monte_carlo::{run_monte_carlo_bounded, run_monte_carlo_with_rng};
use mfdash::{AnalyticsError, MonteCarloParams, SimulationBounds, run_monte_carlo};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn params(vol: f64, n: usize, days: usize) -> MonteCarloParams {
    MonteCarloParams {
        seed_nav: 100.0,
        daily_mean: 0.001,
        daily_volatility: vol,
        num_simulations: n,
        horizon_days: days,
    }
}

#[test]
fn zero_volatility_collapses_to_deterministic_compounding() {
    let batch = run_monte_carlo(&params(0.0, 100, 30), Some(7)).expect("batch");
    assert_eq!(batch.num_paths(), 100);
    for path in &batch.paths {
        assert_eq!(path.len(), 31);
        for (t, v) in path.iter().enumerate() {
            let expected = 100.0 * 1.001f64.powi(t as i32);
            assert!((v - expected).abs() < 1e-9 * expected, "t={t}: {v} vs {expected}");
        }
    }
    assert!((batch.terminal.min - batch.terminal.max).abs() < 1e-9);
}

#[test]
fn fixed_seed_is_reproducible() {
    let p = params(0.02, 1000, 252);
    let a = run_monte_carlo(&p, Some(42)).expect("batch");
    let b = run_monte_carlo(&p, Some(42)).expect("batch");
    assert_eq!(a, b);

    let c = run_monte_carlo(&p, Some(43)).expect("batch");
    assert_ne!(a.terminal, c.terminal);
}

#[test]
fn terminal_mean_tracks_expected_drift() {
    let batch = run_monte_carlo(&params(0.02, 1000, 252), Some(42)).expect("batch");
    let drift = 100.0 * 1.001f64.powi(252);
    assert!(batch.terminal.mean > 0.85 * drift && batch.terminal.mean < 1.15 * drift);
    assert!(batch.terminal.min <= batch.terminal.mean);
    assert!(batch.terminal.mean <= batch.terminal.max);
    assert_eq!(batch.horizon_days(), 252);
    assert!(batch.paths.iter().all(|p| p[0] == 100.0));
}

#[test]
fn injected_rng_drives_the_batch() {
    let p = params(0.01, 100, 30);
    let bounds = SimulationBounds::default();
    let mut rng_a = StdRng::seed_from_u64(9);
    let mut rng_b = StdRng::seed_from_u64(9);
    let a = run_monte_carlo_with_rng(&p, &bounds, &mut rng_a).expect("batch");
    let b = run_monte_carlo_with_rng(&p, &bounds, &mut rng_b).expect("batch");
    assert_eq!(a, b);
    assert_eq!(a, run_monte_carlo(&p, Some(9)).expect("batch"));
}

#[test]
fn out_of_range_parameters_are_rejected() {
    let cases = [
        params(0.02, 99, 252),
        params(0.02, 5001, 252),
        params(0.02, 1000, 29),
        params(0.02, 1000, 366),
        params(-0.01, 1000, 252),
        params(f64::NAN, 1000, 252),
        MonteCarloParams {
            seed_nav: 0.0,
            ..params(0.02, 1000, 252)
        },
    ];
    for p in cases {
        let err = run_monte_carlo(&p, Some(1)).unwrap_err();
        assert!(
            matches!(err, AnalyticsError::InvalidParameter { .. }),
            "{p:?} -> {err:?}"
        );
    }
}

#[test]
fn custom_bounds_are_respected() {
    let bounds = SimulationBounds {
        min_simulations: 1,
        max_simulations: 10,
        min_horizon_days: 1,
        max_horizon_days: 5,
    };
    let batch = run_monte_carlo_bounded(&params(0.01, 3, 5), &bounds, Some(1)).expect("batch");
    assert_eq!(batch.num_paths(), 3);
    assert_eq!(batch.horizon_days(), 5);
    assert_eq!(batch.terminal_values().count(), 3);
    assert!(run_monte_carlo_bounded(&params(0.01, 11, 5), &bounds, Some(1)).is_err());
}

#[test]
fn params_can_be_seeded_from_estimated_daily_stats() {
    let daily = daily_return_stats(&[0.01, -0.005, 0.002]).expect("stats");
    let p = MonteCarloParams::from_daily_stats(50.0, &daily, 200, 60);
    assert_eq!(p.daily_mean, daily.mean);
    assert_eq!(p.daily_volatility, daily.volatility);
    let batch = run_monte_carlo(&p, Some(3)).expect("batch");
    assert_eq!(batch.paths[0][0], 50.0);
}
