use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Failed to read risk profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("Risk profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
