use std::{error::Error, fmt, io, path::PathBuf};

/// Failures while turning a model artifact on disk into a usable handle.
#[derive(Debug)]
pub enum LoadError {
    /// The artifact could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The artifact is not valid JSON or does not match the artifact schema.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The artifact was written for a format version this build cannot read.
    UnsupportedVersion { found: u64, supported: u64 },
    /// The artifact parsed but its contents are inconsistent.
    Invalid(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "cannot read model artifact '{}': {source}", path.display())
            }
            LoadError::Parse { path, source } => {
                write!(f, "cannot parse model artifact '{}': {source}", path.display())
            }
            LoadError::UnsupportedVersion { found, supported } => write!(
                f,
                "unsupported artifact format version {found} (supported: {supported})"
            ),
            LoadError::Invalid(msg) => write!(f, "invalid model artifact: {msg}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failures raised from inside the model while scoring a table.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// A numeric column held a text value.
    ExpectedNumber { row: usize, column: &'static str },
    /// A categorical column held a number.
    ExpectedText { row: usize, column: &'static str },
    /// A category the model was not fitted on.
    UnknownCategory {
        row: usize,
        column: &'static str,
        value: String,
    },
    /// Preprocessing turned a feature into NaN or an infinity, e.g. a ratio
    /// over a zero count.
    NonFiniteFeature { row: usize, feature: usize },
    /// The model produced NaN or an infinity.
    NonFinite { row: usize },
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::ExpectedNumber { row, column } => {
                write!(f, "row {row}: column '{column}' expects a number")
            }
            InferenceError::ExpectedText { row, column } => {
                write!(f, "row {row}: column '{column}' expects a text label")
            }
            InferenceError::UnknownCategory { row, column, value } => write!(
                f,
                "row {row}: found unknown category {value:?} in column '{column}' during predict"
            ),
            InferenceError::NonFiniteFeature { row, feature } => {
                write!(f, "row {row}: input feature {feature} is not finite after preprocessing")
            }
            InferenceError::NonFinite { row } => {
                write!(f, "row {row}: model produced a non-finite prediction")
            }
        }
    }
}

impl Error for InferenceError {}

/// Failures of a single prediction request.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictError {
    /// A row does not have one value per column.
    ShapeMismatch {
        row: usize,
        got: usize,
        expected: usize,
    },
    /// The model rejected the table.
    Inference(InferenceError),
}

impl PredictError {
    /// Whether the failure is attributable to the caller's payload.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::ShapeMismatch { .. })
    }
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::ShapeMismatch { row, got, expected } => write!(
                f,
                "row {row} has {got} values, expected {expected} (one per column)"
            ),
            PredictError::Inference(e) => write!(f, "inference failed: {e}"),
        }
    }
}

impl Error for PredictError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PredictError::Inference(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InferenceError> for PredictError {
    fn from(value: InferenceError) -> Self {
        Self::Inference(value)
    }
}

/// Bad values in the process environment.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidVar {
                name,
                value,
                reason,
            } => write!(f, "invalid value {value:?} for {name}: {reason}"),
        }
    }
}

impl Error for ConfigError {}
