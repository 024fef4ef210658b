use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by configuration, transform, and persistence functions.
///
/// This is a single error enum shared by every stage of a run: materializing a configuration,
/// applying transforms to a [`crate::types::DataSet`], and committing records.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Keyed store error.
    #[error("store error: {0}")]
    Store(#[from] sled::Error),

    /// A description is missing a required field or a field has the wrong type.
    #[error("invalid {kind} description: field '{field}' {message}")]
    ConfigValidation {
        kind: String,
        field: String,
        message: String,
    },

    /// A description names a kind outside the closed vocabulary of its family.
    #[error("unsupported {family} kind '{kind}'")]
    UnsupportedKind { family: &'static str, kind: String },

    /// A transform, filter, or assignment referenced a column that is not in the dataset.
    #[error("column {column} not found. columns={columns:?}")]
    ColumnResolution { column: String, columns: Vec<String> },

    /// A literal or cell value could not be coerced to the required type.
    #[error("cannot coerce value in column '{column}' to {expected}: {message} (raw='{raw}')")]
    Coercion {
        column: String,
        raw: String,
        expected: String,
        message: String,
    },

    /// A value could not be parsed as a date under the declared format.
    #[error("failed to parse date in column '{column}' with format '{format}': {message} (raw='{raw}')")]
    DateParse {
        column: String,
        raw: String,
        format: String,
        message: String,
    },

    /// No saved profile with this name.
    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    /// A saved profile with this name already exists.
    #[error("profile '{name}' already exists")]
    ProfileExists { name: String },
}

impl PipelineError {
    pub(crate) fn validation(
        kind: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ConfigValidation {
            kind: kind.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
