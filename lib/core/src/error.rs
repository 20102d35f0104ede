use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid or missing filename: {0}")]
    InvalidReference(String),

    #[error("No term vector available for: {0}")]
    VectorUnavailable(String),

    #[error("Invalid parameter: {name} must be a positive integer, got {value}")]
    InvalidParameter { name: &'static str, value: i64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
