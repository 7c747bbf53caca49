//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Out of bounds: ({row}, {col}) is outside a grid of size {size}")]
    OutOfBounds { row: i32, col: i32, size: usize },

    #[error("Invalid threshold: {0} is not within [0, 1]")]
    InvalidThreshold(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
