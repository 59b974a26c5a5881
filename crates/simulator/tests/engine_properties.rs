use configuration::SimulationSettings;
use core_types::{Control, Estimate, Scenario, ThreatControlMapping};
use proptest::prelude::*;
use simulator::{CancellationToken, SimulationEngine, SimulationError, SimulationResult};

fn engine(seed: u64, workers: usize) -> SimulationEngine {
    SimulationEngine::new(SimulationSettings {
        seed: Some(seed),
        workers: Some(workers),
        chunk_size: 100,
        ..Default::default()
    })
}

fn fixed_scenario(frequency: f64, loss: f64) -> Scenario {
    Scenario::new("S-01", "T-01")
        .with_frequency(Estimate::point(frequency))
        .with_loss(Estimate::point(loss))
}

#[test]
fn zero_trials_is_an_empty_result() {
    let result = engine(1, 2)
        .run(&[fixed_scenario(5.0, 100.0)], &[], &[], 0)
        .unwrap();
    assert_eq!(result, SimulationResult::empty());
    assert_eq!(result.mean_eal, 0.0);
    assert_eq!(result.p95_eal, 0.0);
    assert_eq!(result.probability_one_plus_events, 0.0);
}

#[test]
fn fixed_inputs_converge_on_rate_times_loss() {
    let result = engine(42, 4)
        .run(&[fixed_scenario(5.0, 100.0)], &[], &[], 2000)
        .unwrap();

    assert_eq!(result.trial_count(), 2000);
    assert!(
        (result.mean_eal - 500.0).abs() < 75.0,
        "mean {} too far from 500",
        result.mean_eal
    );
    // P(no event) = e^-5 ~= 0.7%
    assert!(result.probability_one_plus_events > 0.98);
    assert!(result.annual_losses.iter().all(|loss| loss % 100.0 == 0.0));
}

#[test]
fn seeded_runs_match_across_worker_counts() {
    let scenarios = vec![
        Scenario::new("S-01", "T-01")
            .with_frequency(Estimate::new(0.5, 2.0, 6.0))
            .with_loss(Estimate::new(1_000.0, 5_000.0, 40_000.0)),
        Scenario::new("S-02", "T-02")
            .with_frequency(Estimate::new(0.1, 0.3, 1.0))
            .with_loss(Estimate::new(50_000.0, 100_000.0, 900_000.0)),
    ];

    let single = engine(7, 1).run(&scenarios, &[], &[], 1000).unwrap();
    let pooled = engine(7, 4).run(&scenarios, &[], &[], 1000).unwrap();
    assert_eq!(single, pooled);

    let reseeded = engine(8, 4).run(&scenarios, &[], &[], 1000).unwrap();
    assert_ne!(single.annual_losses, reseeded.annual_losses);
}

#[test]
fn cancelled_run_returns_no_result() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = engine(1, 2)
        .run_with_cancel(&[fixed_scenario(5.0, 100.0)], &[], &[], 1000, &cancel)
        .unwrap_err();
    assert!(matches!(err, SimulationError::Cancelled));
}

#[test]
fn controls_lower_the_expected_loss() {
    let scenarios = vec![fixed_scenario(5.0, 100.0)];
    let controls = vec![Control::new("C-01", 0.5)];
    let map = vec![ThreatControlMapping::new("T-01", "C-01")];

    let inherent = engine(3, 2).run(&scenarios, &[], &[], 2000).unwrap();
    let residual = engine(3, 2).run(&scenarios, &controls, &map, 2000).unwrap();

    assert!(residual.mean_eal < inherent.mean_eal);
    assert!(
        (residual.mean_eal - 250.0).abs() < 50.0,
        "residual mean {}",
        residual.mean_eal
    );
}

#[test]
fn scenario_without_threat_data_contributes_nothing() {
    // No frequency or loss was inherited, so both default to zero.
    let orphan = Scenario::new("S-09", "T-MISSING");
    let result = engine(5, 2).run(&[orphan], &[], &[], 500).unwrap();

    assert_eq!(result.trial_count(), 500);
    assert_eq!(result.mean_eal, 0.0);
    assert_eq!(result.max_loss(), 0.0);
    assert_eq!(result.probability_one_plus_events, 0.0);
}

#[test]
fn non_finite_estimate_is_rejected_before_any_trial() {
    let scenario = Scenario::new("S-01", "T-01")
        .with_frequency(Estimate::new(0.0, f64::NAN, 1.0))
        .with_loss(Estimate::point(10.0));
    let err = engine(1, 1).run(&[scenario], &[], &[], 10).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::InvalidEstimate { field: "frequency", .. }
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn percentiles_are_ordered(
        trials in 1usize..300,
        seed in any::<u64>(),
        frequency in 0.0f64..4.0,
        low in 1.0f64..1_000.0,
        spread in 0.0f64..10_000.0,
    ) {
        let scenario = Scenario::new("S-01", "T-01")
            .with_frequency(Estimate::new(0.0, frequency, frequency * 2.0))
            .with_loss(Estimate::new(low, low + spread / 4.0, low + spread));
        let result = engine(seed, 2).run(&[scenario], &[], &[], trials).unwrap();

        prop_assert_eq!(result.trial_count(), trials);
        prop_assert!(result.p90_eal <= result.p95_eal);
        prop_assert!(result.p95_eal <= result.max_loss());
        prop_assert!((0.0..=1.0).contains(&result.probability_one_plus_events));
        prop_assert!(result.annual_losses.windows(2).all(|w| w[0] <= w[1]));
    }
}
