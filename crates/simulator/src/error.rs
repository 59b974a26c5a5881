use indicatif::style::TemplateError;
use rayon::ThreadPoolBuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Simulation was cancelled; partial results were discarded.")]
    Cancelled,

    #[error("Scenario '{scenario}' has a non-finite {field} estimate.")]
    InvalidEstimate { scenario: String, field: &'static str },

    #[error("Scenario '{scenario}' has a non-finite residual factor.")]
    InvalidResidualFactor { scenario: String },

    #[error("Trial {trial} produced a non-finite annual loss.")]
    NonFiniteLoss { trial: usize },

    #[error("Summary statistic '{0}' is not finite.")]
    NonFiniteSummary(&'static str),

    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(String),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<TemplateError> for SimulationError {
    fn from(error: TemplateError) -> Self {
        SimulationError::ProgressBarTemplate(error.to_string())
    }
}

impl From<ThreadPoolBuildError> for SimulationError {
    fn from(error: ThreadPoolBuildError) -> Self {
        SimulationError::ThreadPool(error.to_string())
    }
}
