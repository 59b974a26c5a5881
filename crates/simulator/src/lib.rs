//! # Simulator
//!
//! The Monte Carlo loss engine. Each trial simulates one year: per scenario, a
//! frequency is drawn from its PERT estimate (uncertainty in the rate), reduced by
//! the scenario's residual factor, and turned into an event count by a Poisson draw
//! (randomness of occurrence). Every event then adds a PERT loss draw.
//!
//! Trials are independent. They are split into fixed-size chunks that run on a
//! bounded rayon pool, each chunk with its own generator seeded from the run seed
//! and the chunk index, so a seeded run gives the same result on any number of
//! workers.

use crate::prepared::{PreparedScenario, prepare_scenarios};
use configuration::SimulationSettings;
use core_types::{Control, Scenario, ThreatControlMapping};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use sampling::DistributionSampler;

pub mod cancel;
pub mod error;
pub mod prepared;
pub mod result;

pub use cancel::CancellationToken;
pub use error::SimulationError;
pub use result::{SimulationResult, nearest_rank};

/// What one chunk of trials hands back for merging.
#[derive(Debug, Default)]
struct ChunkOutcome {
    losses: Vec<f64>,
    years_with_events: usize,
}

pub struct SimulationEngine {
    settings: SimulationSettings,
    progress: Option<ProgressBar>,
}

impl SimulationEngine {
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings,
            progress: None,
        }
    }

    /// Draws a terminal progress bar that advances as chunks complete.
    pub fn with_progress_bar(mut self) -> Result<Self, SimulationError> {
        let progress_bar = ProgressBar::new(0);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trials ({eta})")?
                .progress_chars("=>-"),
        );
        self.progress = Some(progress_bar);
        Ok(self)
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Runs `trial_count` trials to completion.
    pub fn run(
        &self,
        scenarios: &[Scenario],
        controls: &[Control],
        map: &[ThreatControlMapping],
        trial_count: usize,
    ) -> Result<SimulationResult, SimulationError> {
        self.run_with_cancel(scenarios, controls, map, trial_count, &CancellationToken::new())
    }

    /// Runs `trial_count` trials, checking `cancel` before every chunk.
    ///
    /// A cancelled run returns [`SimulationError::Cancelled`]; whatever chunks had
    /// finished are dropped. A run with no trials returns an empty result.
    pub fn run_with_cancel(
        &self,
        scenarios: &[Scenario],
        controls: &[Control],
        map: &[ThreatControlMapping],
        trial_count: usize,
        cancel: &CancellationToken,
    ) -> Result<SimulationResult, SimulationError> {
        if trial_count == 0 {
            return Ok(SimulationResult::empty());
        }

        let prepared = prepare_scenarios(scenarios, controls, map)?;
        let seed = self.settings.seed.unwrap_or_else(rand::random);
        let chunk_size = self.settings.chunk_size.max(1);
        let workers = self.settings.worker_count();

        tracing::info!(
            trials = trial_count,
            scenarios = prepared.len(),
            workers,
            chunk_size,
            seed,
            "Starting Monte Carlo simulation."
        );

        if let Some(progress_bar) = &self.progress {
            progress_bar.set_length(trial_count as u64);
            progress_bar.set_position(0);
        }

        let chunks: Vec<(usize, usize)> = (0..trial_count)
            .step_by(chunk_size)
            .map(|first| (first, chunk_size.min(trial_count - first)))
            .collect();

        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;

        let outcomes = pool.install(|| {
            chunks
                .par_iter()
                .enumerate()
                .map(|(index, &(first, len))| {
                    if cancel.is_cancelled() {
                        return Err(SimulationError::Cancelled);
                    }
                    let outcome = simulate_chunk(&prepared, chunk_rng(seed, index as u64), first, len)?;
                    if let Some(progress_bar) = &self.progress {
                        progress_bar.inc(len as u64);
                    }
                    Ok(outcome)
                })
                .collect::<Result<Vec<ChunkOutcome>, SimulationError>>()
        });

        let outcomes = match outcomes {
            Ok(outcomes) => outcomes,
            Err(e) => {
                if let Some(progress_bar) = &self.progress {
                    progress_bar.abandon();
                }
                tracing::warn!(error = %e, "Simulation aborted.");
                return Err(e);
            }
        };

        let mut annual_losses = Vec::with_capacity(trial_count);
        let mut years_with_events = 0;
        for outcome in outcomes {
            annual_losses.extend(outcome.losses);
            years_with_events += outcome.years_with_events;
        }

        let result = SimulationResult::summarize(annual_losses, years_with_events)?;

        if let Some(progress_bar) = &self.progress {
            progress_bar.finish_and_clear();
        }

        tracing::info!(
            mean_eal = result.mean_eal,
            p90_eal = result.p90_eal,
            p95_eal = result.p95_eal,
            probability_one_plus_events = result.probability_one_plus_events,
            "Simulation complete."
        );

        Ok(result)
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(SimulationSettings::default())
    }
}

/// Independent generator for chunk `index` of a run seeded with `seed`.
///
/// The pair is mixed with SplitMix64 so neighbouring chunks get unrelated streams.
fn chunk_rng(seed: u64, index: u64) -> StdRng {
    let mut z = seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}

fn simulate_chunk<R: Rng>(
    scenarios: &[PreparedScenario],
    rng: R,
    first_trial: usize,
    trials: usize,
) -> Result<ChunkOutcome, SimulationError> {
    let mut sampler = DistributionSampler::new(rng);
    let mut outcome = ChunkOutcome {
        losses: Vec::with_capacity(trials),
        years_with_events: 0,
    };

    for offset in 0..trials {
        let (loss, had_event) = simulate_year(&mut sampler, scenarios);
        if !loss.is_finite() {
            return Err(SimulationError::NonFiniteLoss {
                trial: first_trial + offset,
            });
        }
        outcome.losses.push(loss);
        if had_event {
            outcome.years_with_events += 1;
        }
    }

    Ok(outcome)
}

/// One trial: the total loss over all scenarios and whether any event occurred.
fn simulate_year<R: Rng>(
    sampler: &mut DistributionSampler<R>,
    scenarios: &[PreparedScenario],
) -> (f64, bool) {
    let mut total_loss = 0.0;
    let mut had_event = false;

    for scenario in scenarios {
        let (f_min, f_ml, f_max) = scenario.frequency;
        let lambda = sampler.pert(f_min, f_ml, f_max) * scenario.residual_factor;

        let events = sampler.poisson(lambda);
        if events > 0 {
            had_event = true;
        }

        let (l_min, l_ml, l_max) = scenario.loss;
        for _ in 0..events {
            total_loss += sampler.pert(l_min, l_ml, l_max);
        }
    }

    (total_loss, had_event)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_scenario(freq: f64, loss: f64) -> PreparedScenario {
        PreparedScenario {
            id: "S-01".to_string(),
            residual_factor: 1.0,
            frequency: (freq, freq, freq),
            loss: (loss, loss, loss),
        }
    }

    #[test]
    fn chunk_streams_differ() {
        let a: u64 = chunk_rng(1, 0).r#gen();
        let b: u64 = chunk_rng(1, 1).r#gen();
        let c: u64 = chunk_rng(1, 0).r#gen();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn year_without_frequency_has_no_loss() {
        let mut sampler = DistributionSampler::new(chunk_rng(3, 0));
        let (loss, had_event) = simulate_year(&mut sampler, &[fixed_scenario(0.0, 1_000.0)]);
        assert_eq!(loss, 0.0);
        assert!(!had_event);
    }

    #[test]
    fn fixed_loss_is_a_multiple_of_event_loss() {
        let mut sampler = DistributionSampler::new(chunk_rng(4, 0));
        for _ in 0..100 {
            let (loss, had_event) = simulate_year(&mut sampler, &[fixed_scenario(3.0, 250.0)]);
            assert_eq!(loss % 250.0, 0.0);
            assert_eq!(had_event, loss > 0.0);
        }
    }

    #[test]
    fn chunk_reports_every_trial() {
        let outcome = simulate_chunk(&[fixed_scenario(2.0, 10.0)], chunk_rng(5, 0), 0, 37).unwrap();
        assert_eq!(outcome.losses.len(), 37);
        assert!(outcome.years_with_events <= 37);
    }
}
