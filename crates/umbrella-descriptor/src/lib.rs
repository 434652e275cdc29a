//! Umbrella module descriptors (umbrella.toml)
//!
//! Parses the declarative description of a module that aggregates other
//! modules into a native framework:
//! - Module identity, plugins, abstract target platforms and dependencies
//! - Framework packaging metadata (base name, version, linkage, deployment target)
//! - Android library metadata
//!
//! Descriptors are validated into immutable [`Module`] values. Path
//! dependencies are followed by the [`Loader`] to produce a [`ModuleTree`].

pub mod descriptor;
pub mod loader;
pub mod module;
pub mod validator;

pub use descriptor::{
    AndroidSection, DependencySpec, Descriptor, DetailedDependency, FrameworkSection,
    ModuleSection,
};
pub use loader::{Loader, ModuleTree, DESCRIPTOR_FILE};
pub use module::{
    AndroidConfig, DependencyRef, Linkage, Module, OsVersion, PackagingSpec, Plugin,
};
pub use validator::Validator;

use std::path::PathBuf;

/// Descriptor errors
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Failed to parse descriptor {path}: {error}")]
    ParseError {
        path: PathBuf,
        error: toml::de::Error,
    },

    #[error("Malformed descriptor: field '{field}' {reason}")]
    MalformedDescriptor { field: String, reason: String },

    #[error("No umbrella.toml found in {0} or any parent directory")]
    NotFound(PathBuf),

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl DescriptorError {
    /// Create a malformed descriptor error for the given field
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

    /// The offending descriptor field, if the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MalformedDescriptor { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DescriptorError>;
