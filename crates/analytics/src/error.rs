use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Histogram needs at least one bin, got {0}")]
    InvalidBinCount(usize),

    #[error("Loss sample contains a non-finite value at index {0}")]
    NonFiniteSample(usize),
}
