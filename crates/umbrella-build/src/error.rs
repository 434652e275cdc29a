/// Build pipeline error types
use std::path::PathBuf;
use thiserror::Error;
use umbrella_descriptor::DescriptorError;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Malformed descriptor: field '{field}' {reason}")]
    MalformedDescriptor { field: String, reason: String },

    #[error("Unknown platform '{platform}' at {field} (expected one of: {expected})")]
    UnknownPlatform {
        platform: String,
        field: String,
        expected: String,
    },

    #[error("Cyclic dependency detected: {0}")]
    CyclicDependency(String),

    #[error("Undeclared export at framework.export: '{module}' is not a dependency of '{root}'")]
    UndeclaredExport { module: String, root: String },

    #[error("Module not found: {module}")]
    ModuleNotFound { module: String },

    #[error("Module '{module}' targets {target} but its dependency '{dependency}' does not")]
    MissingTarget {
        module: String,
        dependency: String,
        target: String,
    },

    #[error("Invalid build profile '{0}': expected 'debug' or 'release'")]
    InvalidProfile(String),

    #[error(transparent)]
    Descriptor(DescriptorError),

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to serialize artifact manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl BuildError {
    /// Create a malformed descriptor error
    pub fn malformed(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedDescriptor {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a module not found error
    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound {
            module: module.into(),
        }
    }

    /// The offending descriptor field, if the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MalformedDescriptor { field, .. } | Self::UnknownPlatform { field, .. } => {
                Some(field)
            }
            Self::UndeclaredExport { .. } => Some("framework.export"),
            Self::MissingTarget { .. } => Some("module.targets"),
            Self::Descriptor(e) => e.field(),
            _ => None,
        }
    }
}

impl From<DescriptorError> for BuildError {
    fn from(error: DescriptorError) -> Self {
        match error {
            DescriptorError::MalformedDescriptor { field, reason } => {
                Self::MalformedDescriptor { field, reason }
            }
            other => Self::Descriptor(other),
        }
    }
}
