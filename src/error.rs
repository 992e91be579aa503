use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvosimError {
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Fitness value for specified genome is undefined: {0}")]
    FitnessLookup(String),

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("Simulator error: {0}")]
    Simulator(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvosimError>;
