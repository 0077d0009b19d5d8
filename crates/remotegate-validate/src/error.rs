/// Errors that can occur while registering validators.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// The schema could not be compiled.
    #[error("failed to compile schema for validator {name}: {message}")]
    CompileFailed { name: String, message: String },

    /// The schema is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ValidateError>;
