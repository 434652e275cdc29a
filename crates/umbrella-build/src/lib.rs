//! Umbrella build pipeline
//!
//! Turns a module descriptor into a distributable framework artifact:
//! - Platform target resolution (abstract identifiers to concrete targets)
//! - Module graph validation and packaging order
//! - Framework packaging with re-exported dependencies
//! - Artifact emission (manifest, framework bundles, podspec, Android manifest)

pub mod build_order;
pub mod builder;
pub mod emit;
pub mod error;
pub mod packager;
pub mod profile;
pub mod targets;

// Re-export main types
pub use build_order::{BuildGraph, ModuleNode};
pub use builder::{package_tree, BuildConfig, BuildContext, BuildStats, Builder};
pub use emit::{ArtifactWriter, MANIFEST_FILE};
pub use error::{BuildError, BuildResult};
pub use packager::{AndroidLibrary, ArtifactDescriptor, FrameworkSlice, Packager};
pub use profile::Profile;
pub use targets::{PlatformResolver, PlatformTarget, TargetFamily};

// Re-export descriptor types for convenience
pub use umbrella_descriptor::{Linkage, Module, ModuleTree, OsVersion, PackagingSpec};
