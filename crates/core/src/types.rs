use thiserror::Error;

/// The main error type for vxmod operations
#[derive(Debug, Error)]
pub enum VxmodError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Include resolution failed: {0}")]
    Resolution(String),

    #[error("Assembly error: {0}")]
    Assembly(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Path error: {0}")]
    Path(String),
}

impl From<zip::result::ZipError> for VxmodError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Result type alias for vxmod operations
pub type VxmodResult<T> = Result<T, VxmodError>;
