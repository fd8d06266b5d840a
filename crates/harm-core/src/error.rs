use thiserror::Error;

/// Top-level error type for the HARM toolkit.
#[derive(Error, Debug)]
pub enum HarmError {
    #[error("Construction error: {0}")]
    Construction(String),

    #[error("Structural invariant violated: {0}")]
    Structure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
