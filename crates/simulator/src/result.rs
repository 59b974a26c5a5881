use crate::error::SimulationError;
use serde::{Deserialize, Serialize};

/// The outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    pub mean_eal: f64,
    pub p90_eal: f64,
    pub p95_eal: f64,
    /// Share of simulated years with at least one event in any scenario.
    pub probability_one_plus_events: f64,
    /// Annual loss of every trial, sorted ascending.
    pub annual_losses: Vec<f64>,
}

impl SimulationResult {
    /// The result of a run with no trials: no losses and every statistic at 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts the per-trial losses and derives the summary statistics.
    pub fn summarize(
        mut annual_losses: Vec<f64>,
        years_with_events: usize,
    ) -> Result<Self, SimulationError> {
        let trials = annual_losses.len();
        if trials == 0 {
            return Ok(Self::empty());
        }

        annual_losses.sort_by(f64::total_cmp);

        let mean_eal = annual_losses.iter().sum::<f64>() / trials as f64;
        if !mean_eal.is_finite() {
            return Err(SimulationError::NonFiniteSummary("mean_eal"));
        }

        Ok(Self {
            mean_eal,
            p90_eal: nearest_rank(&annual_losses, 0.90),
            p95_eal: nearest_rank(&annual_losses, 0.95),
            probability_one_plus_events: years_with_events as f64 / trials as f64,
            annual_losses,
        })
    }

    pub fn trial_count(&self) -> usize {
        self.annual_losses.len()
    }

    pub fn max_loss(&self) -> f64 {
        self.annual_losses.last().copied().unwrap_or(0.0)
    }
}

/// The value at index `floor(n * quantile)` of an ascending sample, with no
/// interpolation. An index past the end yields 0.
pub fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    let index = (sorted.len() as f64 * quantile).floor() as usize;
    sorted.get(index).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_known_sample() {
        let losses: Vec<f64> = (1..=20).rev().map(|v| v as f64).collect();
        let result = SimulationResult::summarize(losses, 15).unwrap();

        assert_eq!(result.annual_losses.first(), Some(&1.0));
        assert_eq!(result.mean_eal, 10.5);
        // floor(20 * 0.90) = 18 -> 19.0, floor(20 * 0.95) = 19 -> 20.0
        assert_eq!(result.p90_eal, 19.0);
        assert_eq!(result.p95_eal, 20.0);
        assert_eq!(result.probability_one_plus_events, 0.75);
        assert_eq!(result.max_loss(), 20.0);
    }

    #[test]
    fn single_trial_percentiles_use_the_only_value() {
        let result = SimulationResult::summarize(vec![42.0], 1).unwrap();
        // floor(1 * 0.9) = 0 -> the only value.
        assert_eq!(result.p90_eal, 42.0);
        assert_eq!(nearest_rank(&[], 0.9), 0.0);
    }

    #[test]
    fn empty_sample_is_all_zero() {
        let result = SimulationResult::summarize(Vec::new(), 0).unwrap();
        assert_eq!(result, SimulationResult::empty());
    }

    #[test]
    fn overflowing_mean_is_fatal() {
        let err = SimulationResult::summarize(vec![f64::MAX, f64::MAX], 2).unwrap_err();
        assert!(matches!(err, SimulationError::NonFiniteSummary("mean_eal")));
    }
}
