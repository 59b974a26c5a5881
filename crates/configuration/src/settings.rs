use serde::Deserialize;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub logging: LoggingSettings,
    pub report: ReportSettings,
}

/// Contains parameters for the Monte Carlo engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of simulated years per run.
    pub trials: usize,
    /// Upper bound accepted for `trials`.
    pub max_trials: usize,
    /// Seed for reproducible runs. A fresh seed is drawn when absent.
    pub seed: Option<u64>,
    /// Trials per unit of parallel work. Cancellation is checked between chunks.
    pub chunk_size: usize,
    /// Size of the worker pool. Defaults to the number of logical CPUs.
    pub workers: Option<usize>,
}

impl SimulationSettings {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            trials: 1000,
            max_trials: 1000,
            seed: None,
            chunk_size: 250,
            workers: None,
        }
    }
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, e.g. `"info"` or `"simulator=debug"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Directory for a daily-rolling log file. Logs go to stderr when absent.
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "otrisk.log".to_string(),
        }
    }
}

/// Presentation of results in the CLI and exported reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub histogram_bins: usize,
    pub title: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            histogram_bins: 15,
            title: "OT Risk Assessment Report".to_string(),
        }
    }
}

/// Command-line overrides for the `[simulation]` section.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct SimulationOverrides {
    /// Number of trials to simulate.
    #[cfg_attr(feature = "clap", arg(long))]
    pub trials: Option<usize>,
    /// Seed for a reproducible run.
    #[cfg_attr(feature = "clap", arg(long))]
    pub seed: Option<u64>,
    /// Worker threads to use.
    #[cfg_attr(feature = "clap", arg(long))]
    pub workers: Option<usize>,
    /// Trials per chunk of parallel work.
    #[cfg_attr(feature = "clap", arg(long))]
    pub chunk_size: Option<usize>,
}

impl Settings {
    /// Applies command-line overrides on top of the file/environment values.
    pub fn apply_overrides(&mut self, overrides: &SimulationOverrides) {
        let sim = &mut self.simulation;
        if let Some(trials) = overrides.trials {
            sim.trials = trials;
        }
        if let Some(seed) = overrides.seed {
            sim.seed = Some(seed);
        }
        if let Some(workers) = overrides.workers {
            sim.workers = Some(workers);
        }
        if let Some(chunk_size) = overrides.chunk_size {
            sim.chunk_size = chunk_size;
        }
    }

    /// Checks that the loaded values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.max_trials == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.max_trials must be greater than 0".to_string(),
            ));
        }
        if sim.trials == 0 || sim.trials > sim.max_trials {
            return Err(ConfigError::ValidationError(format!(
                "simulation.trials must be between 1 and {}, got {}",
                sim.max_trials, sim.trials
            )));
        }
        if sim.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.chunk_size must be greater than 0".to_string(),
            ));
        }
        if sim.workers == Some(0) {
            return Err(ConfigError::ValidationError(
                "simulation.workers must be greater than 0".to_string(),
            ));
        }
        if self.report.histogram_bins == 0 {
            return Err(ConfigError::ValidationError(
                "report.histogram_bins must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
