use thiserror::Error;

pub type SalesboardResult<T> = Result<T, SalesboardError>;

#[derive(Error, Debug)]
pub enum SalesboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The uploaded file could not be turned into a table. Terminal for the run.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl SalesboardError {
    /// True for failures the user can only fix by uploading a different file
    pub fn is_decode(&self) -> bool {
        matches!(self, SalesboardError::Decode(_))
    }
}
