use thiserror::Error;

#[derive(Error, Debug)]
pub enum NearbyError {
    #[error("Repository error: {0}")]
    Repository(#[from] crate::repository::RepositoryError),
    #[error("Extraction error: {0}")]
    Extraction(#[from] crate::intent::ExtractionError),
    #[error("Data error: {0}")]
    Data(#[from] nearby_data::DataError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, NearbyError>;
