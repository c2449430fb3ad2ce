use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    /// A malformed target. Aborts that character only; the run continues.
    #[error("Invalid target for '{character}': {reason}")]
    InvalidTarget { character: String, reason: String },
}

pub type MfResult<T> = Result<T, ModForgeError>;

impl ModForgeError {
    pub fn invalid_target(character: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            character: character.to_string(),
            reason: reason.into(),
        }
    }
}
