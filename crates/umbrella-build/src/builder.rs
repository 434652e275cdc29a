//! Build orchestration: Loader -> Resolver -> Packager -> emission
use crate::build_order::BuildGraph;
use crate::emit::ArtifactWriter;
use crate::error::{BuildError, BuildResult};
use crate::packager::{ArtifactDescriptor, Packager};
use crate::profile::Profile;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use umbrella_descriptor::{Loader, ModuleTree, PackagingSpec};

/// Build configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Artifact output directory
    pub out_dir: PathBuf,
    /// Build profile
    pub profile: Profile,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("build/umbrella"),
            profile: Profile::default(),
        }
    }
}

/// Build context - result of a successful build
#[derive(Debug)]
pub struct BuildContext {
    /// The packaged artifact
    pub artifact: ArtifactDescriptor,
    /// Files written, empty when the build was only planned
    pub written: Vec<PathBuf>,
    /// Build statistics
    pub stats: BuildStats,
}

/// Build statistics
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Modules in the loaded tree
    pub total_modules: usize,
    /// Modules referenced by name only
    pub prebuilt_modules: usize,
    /// Number of parallel packaging groups
    pub parallel_groups: usize,
    /// Total build time
    pub total_time: Duration,
}

/// Main builder for orchestrating builds
#[derive(Debug)]
pub struct Builder {
    /// Root descriptor path
    descriptor: PathBuf,
    /// Build configuration
    config: BuildConfig,
}

impl Builder {
    /// Create a builder for a descriptor file or a directory holding one
    pub fn new(project_path: impl AsRef<Path>) -> BuildResult<Self> {
        let descriptor = Loader::descriptor_path(project_path.as_ref());
        if !descriptor.is_file() {
            return Err(BuildError::io(
                &descriptor,
                std::io::Error::new(std::io::ErrorKind::NotFound, "descriptor not found"),
            ));
        }

        Ok(Self {
            descriptor,
            config: BuildConfig::default(),
        })
    }

    /// Create a builder for the nearest descriptor at or above `start_dir`
    pub fn discover(start_dir: impl AsRef<Path>) -> BuildResult<Self> {
        let descriptor = Loader::find_descriptor(start_dir.as_ref())?;
        Ok(Self {
            descriptor,
            config: BuildConfig::default(),
        })
    }

    /// Set build configuration
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Set output directory
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = out_dir.into();
        self
    }

    /// Set build profile
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run the pipeline without writing anything
    pub fn plan(&self) -> BuildResult<BuildContext> {
        let start = Instant::now();
        debug!(descriptor = %self.descriptor.display(), "loading module tree");

        let tree = Loader::new().load_tree(&self.descriptor)?;
        let graph = BuildGraph::from_tree(&tree)?;
        let artifact = package_graph(&tree, &graph, self.config.profile)?;

        let stats = BuildStats {
            total_modules: tree.len(),
            prebuilt_modules: tree.modules.iter().filter(|m| m.source.is_none()).count(),
            parallel_groups: graph.parallel_build_groups()?.len(),
            total_time: start.elapsed(),
        };

        Ok(BuildContext {
            artifact,
            written: Vec::new(),
            stats,
        })
    }

    /// Run the pipeline and write the artifact
    pub fn build(&self) -> BuildResult<BuildContext> {
        let start = Instant::now();
        let mut context = self.plan()?;

        let out_dir = self.out_dir();
        context.written = ArtifactWriter::new(&out_dir).write(&context.artifact)?;
        context.stats.total_time = start.elapsed();

        info!(
            module = %context.artifact.module,
            version = %context.artifact.version,
            profile = %self.config.profile,
            "build finished"
        );
        Ok(context)
    }

    /// Remove previously written artifacts
    pub fn clean(&self) -> BuildResult<()> {
        ArtifactWriter::new(self.out_dir()).clean()
    }

    /// Output directory, with relative paths anchored at the descriptor's directory
    pub fn out_dir(&self) -> PathBuf {
        if self.config.out_dir.is_absolute() {
            return self.config.out_dir.clone();
        }
        self.descriptor
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.config.out_dir)
    }
}

/// Package the root module of a loaded tree
pub fn package_tree(tree: &ModuleTree, profile: Profile) -> BuildResult<ArtifactDescriptor> {
    let graph = BuildGraph::from_tree(tree)?;
    package_graph(tree, &graph, profile)
}

fn package_graph(
    tree: &ModuleTree,
    graph: &BuildGraph,
    profile: Profile,
) -> BuildResult<ArtifactDescriptor> {
    let root = tree
        .root_module()
        .ok_or_else(|| BuildError::module_not_found(&tree.root))?;
    let spec = root
        .packaging
        .clone()
        .unwrap_or_else(|| PackagingSpec::for_module(&root.name));

    Packager::new(graph)
        .with_profile(profile)
        .with_android(root.android.clone())
        .with_fingerprint(root.fingerprint.clone())
        .package(&root.name, &spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbrella_descriptor::Module;

    fn tree(modules: Vec<Module>) -> ModuleTree {
        ModuleTree {
            root: modules[0].name.clone(),
            modules,
        }
    }

    #[test]
    fn test_package_tree_example() {
        let root = Loader::load_str(
            r#"
            [module]
            name = "Umbrella"
            targets = ["A", "B-device", "B-sim"]
            dependencies = ["Core"]

            [framework]
            version = "1.0.0"
            deployment-target = "15.1"
            export = ["Core"]

            [android]
            namespace = "com.example.umbrella"
            "#,
        )
        .unwrap();

        let artifact = package_tree(&tree(vec![root, Module::leaf("Core")]), Profile::Debug).unwrap();
        assert_eq!(artifact.base_name, "Umbrella");
        assert!(artifact.is_static());
        assert_eq!(artifact.exports, vec!["Core"]);
        assert_eq!(artifact.frameworks.len(), 2);
        assert!(artifact.android.is_some());
        assert!(artifact.fingerprint.is_some());
    }

    #[test]
    fn test_package_tree_minimal_descriptor() {
        let root = Loader::load_str(
            r#"
            [module]
            name = "Umbrella"
            targets = ["A", "B-device", "B-sim"]
            dependencies = ["Core"]

            [framework]
            export = ["Core"]
            "#,
        )
        .unwrap();

        let artifact = package_tree(&tree(vec![root, Module::leaf("Core")]), Profile::Debug).unwrap();
        assert_eq!(artifact.base_name, "Umbrella");
        assert!(artifact.is_static());
        assert_eq!(artifact.exports, vec!["Core"]);
        assert_eq!(artifact.version.to_string(), "1.0.0");
        assert_eq!(artifact.minimum_os.map(|v| v.to_string()).as_deref(), Some("15.1"));
        assert_eq!(
            artifact.android.map(|a| a.namespace).as_deref(),
            Some("com.example.umbrella")
        );
    }

    #[test]
    fn test_package_tree_without_framework_section() {
        let root = Loader::load_str(
            r#"
            [module]
            name = "Umbrella"
            targets = ["ios"]
            "#,
        )
        .unwrap();

        let artifact = package_tree(&tree(vec![root]), Profile::Debug).unwrap();
        assert_eq!(artifact.base_name, "Umbrella");
        assert_eq!(artifact.frameworks.len(), 3);
        assert!(artifact.exports.is_empty());
    }

    #[test]
    fn test_package_tree_unknown_platform() {
        let root = Loader::load_str(
            r#"
            [module]
            name = "Umbrella"
            targets = ["ios", "tvos"]

            [framework]
            version = "1.0.0"
            deployment-target = "15.1"
            "#,
        )
        .unwrap();

        let err = package_tree(&tree(vec![root]), Profile::Debug).unwrap_err();
        match err {
            BuildError::UnknownPlatform {
                platform, field, ..
            } => {
                assert_eq!(platform, "tvos");
                assert_eq!(field, "module.targets[1] of 'Umbrella'");
            }
            other => panic!("Expected UnknownPlatform, got {:?}", other),
        }
    }

    #[test]
    fn test_build_config_default() {
        let config = BuildConfig::default();
        assert_eq!(config.out_dir, PathBuf::from("build/umbrella"));
        assert_eq!(config.profile, Profile::Debug);
    }
}
