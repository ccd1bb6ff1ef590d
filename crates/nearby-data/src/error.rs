use thiserror::Error;
pub type Result<T> = std::result::Result<T, DataError>;

/// Structural problems found while validating a raw dataset.
///
/// Any of these aborts a load; nothing is partially accepted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Dataset is not well-formed JSON: {0}")]
    Malformed(String),
    #[error("`supportedTypes` must be a non-empty list")]
    EmptySupportedTypes,
    #[error("`supportedTypes[{index}]` must be a non-empty string")]
    BlankSupportedType { index: usize },
    #[error("POI at index {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("POI `{id}` has invalid {field}: {value}")]
    InvalidCoordinate {
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("POI id `{id}` appears more than once")]
    DuplicateId { id: String },
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Dataset validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not fetch dataset from {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },
    #[cfg(feature = "download_data")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DataError {
    /// Whether retrying the same load could succeed.
    ///
    /// Validation failures are properties of the data itself and will fail the
    /// same way every time; transport failures may not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Validation(ValidationError::Malformed(err.to_string()))
        }
    }
}
