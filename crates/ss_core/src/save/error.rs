use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid match document: {0}")]
    InvalidDocument(String),
}
