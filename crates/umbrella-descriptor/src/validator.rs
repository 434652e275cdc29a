//! Descriptor validation
//!
//! Turns a raw [`Descriptor`] into a [`Module`]. Every failure names the
//! offending field using its dotted TOML path.

use crate::descriptor::{AndroidSection, DependencySpec, Descriptor, FrameworkSection};
use crate::module::{AndroidConfig, DependencyRef, Linkage, Module, OsVersion, PackagingSpec, Plugin};
use crate::{DescriptorError, Result};
use std::collections::HashSet;

/// Descriptor validator
pub struct Validator;

impl Validator {
    /// Validate a descriptor and build the module it describes
    pub fn validate(descriptor: &Descriptor) -> Result<Module> {
        let section = descriptor
            .module
            .as_ref()
            .ok_or_else(|| DescriptorError::malformed("module", "section is missing"))?;

        let name = match section.name.as_deref() {
            None => return Err(DescriptorError::malformed("module.name", "is missing")),
            Some(name) => name,
        };
        Self::validate_identifier("module.name", name)?;

        if section.targets.is_empty() {
            return Err(DescriptorError::malformed(
                "module.targets",
                "must list at least one target platform",
            ));
        }
        for (i, target) in section.targets.iter().enumerate() {
            if target.trim().is_empty() {
                return Err(DescriptorError::malformed(
                    format!("module.targets[{}]", i),
                    "cannot be empty",
                ));
            }
        }

        let plugins = Self::validate_plugins(&section.plugins)?;
        let dependencies = Self::validate_dependencies(name, &section.dependencies)?;

        let runtime = match section.runtime.as_deref() {
            Some(runtime) if runtime.trim().is_empty() => {
                return Err(DescriptorError::malformed("module.runtime", "cannot be empty"));
            }
            Some(runtime) => {
                if !plugins.is_empty() && !plugins.contains(&Plugin::ComposeMultiplatform) {
                    return Err(DescriptorError::malformed(
                        "module.runtime",
                        format!(
                            "embedding '{}' requires the '{}' plugin",
                            runtime,
                            Plugin::ComposeMultiplatform
                        ),
                    ));
                }
                Some(runtime.to_string())
            }
            None => None,
        };

        let packaging = descriptor
            .framework
            .as_ref()
            .map(|framework| Self::validate_framework(name, framework))
            .transpose()?;

        let android = descriptor
            .android
            .as_ref()
            .map(Self::validate_android)
            .transpose()?;

        Ok(Module {
            name: name.to_string(),
            plugins,
            targets: section.targets.iter().map(|t| t.trim().to_string()).collect(),
            dependencies,
            runtime,
            packaging,
            android,
            source: None,
            fingerprint: None,
        })
    }

    /// Validate a module or framework identifier
    ///
    /// Identifiers start with an ASCII letter and continue with letters,
    /// digits, `-` or `_`.
    pub fn validate_identifier(field: &str, value: &str) -> Result<()> {
        let mut chars = value.chars();
        match chars.next() {
            None => return Err(DescriptorError::malformed(field, "cannot be empty")),
            Some(first) if !first.is_ascii_alphabetic() => {
                return Err(DescriptorError::malformed(
                    field,
                    format!("'{}' must start with a letter", value),
                ));
            }
            Some(_) => {}
        }

        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(DescriptorError::malformed(
                field,
                format!(
                    "'{}' contains invalid characters (only letters, digits, -, _ allowed)",
                    value
                ),
            ));
        }

        Ok(())
    }

    fn validate_plugins(plugins: &[String]) -> Result<Vec<Plugin>> {
        let mut result = Vec::new();
        for (i, id) in plugins.iter().enumerate() {
            let plugin = Plugin::from_str(id).ok_or_else(|| {
                DescriptorError::malformed(
                    format!("module.plugins[{}]", i),
                    format!("unknown plugin '{}'", id),
                )
            })?;
            if !result.contains(&plugin) {
                result.push(plugin);
            }
        }
        Ok(result)
    }

    fn validate_dependencies(
        module_name: &str,
        dependencies: &[DependencySpec],
    ) -> Result<Vec<DependencyRef>> {
        let mut seen = HashSet::new();
        let mut result = Vec::with_capacity(dependencies.len());

        for dep in dependencies {
            let field = format!("module.dependencies.{}", dep.name());
            Self::validate_identifier(&field, dep.name())?;

            if dep.name() == module_name {
                return Err(DescriptorError::malformed(
                    field,
                    "a module cannot depend on itself",
                ));
            }
            if !seen.insert(dep.name()) {
                return Err(DescriptorError::malformed(field, "is declared more than once"));
            }

            let mut dep_ref = DependencyRef::new(dep.name());
            if let Some(path) = dep.path() {
                dep_ref = dep_ref.with_path(path);
            }
            result.push(dep_ref);
        }

        Ok(result)
    }

    fn validate_framework(module_name: &str, framework: &FrameworkSection) -> Result<PackagingSpec> {
        let base_name = framework
            .base_name
            .clone()
            .unwrap_or_else(|| module_name.to_string());
        Self::validate_identifier("framework.base-name", &base_name)?;

        let version = match framework.version.as_deref() {
            None => PackagingSpec::DEFAULT_VERSION,
            Some(v) => semver::Version::parse(v).map_err(|e| {
                DescriptorError::malformed(
                    "framework.version",
                    format!("'{}' is not a semantic version: {}", v, e),
                )
            })?,
        };

        let linkage = match framework.linkage.as_deref() {
            None => Linkage::default(),
            Some(s) => Linkage::from_str(s).ok_or_else(|| {
                DescriptorError::malformed(
                    "framework.linkage",
                    format!("'{}' must be 'static' or 'dynamic'", s),
                )
            })?,
        };

        let minimum_os = framework
            .deployment_target
            .as_deref()
            .map(|s| {
                OsVersion::parse(s).ok_or_else(|| {
                    DescriptorError::malformed(
                        "framework.deployment-target",
                        format!("'{}' is not a valid OS version (expected MAJOR[.MINOR[.PATCH]])", s),
                    )
                })
            })
            .transpose()?;

        let mut seen = HashSet::new();
        for export in &framework.export {
            let field = format!("framework.export.{}", export);
            Self::validate_identifier(&field, export)?;
            if !seen.insert(export.as_str()) {
                return Err(DescriptorError::malformed(field, "is exported more than once"));
            }
        }

        Ok(PackagingSpec {
            base_name,
            version,
            linkage,
            minimum_os,
            exports: framework.export.clone(),
            summary: framework.summary.clone(),
            homepage: framework.homepage.clone(),
        })
    }

    fn validate_android(android: &AndroidSection) -> Result<AndroidConfig> {
        if let Some(namespace) = android.namespace.as_deref() {
            let valid = !namespace.is_empty()
                && namespace.split('.').all(|segment| {
                    segment
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_alphabetic())
                        && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                });
            if !valid {
                return Err(DescriptorError::malformed(
                    "android.namespace",
                    format!("'{}' is not a valid package name", namespace),
                ));
            }
        }

        if let (Some(min), Some(compile)) = (android.min_sdk, android.compile_sdk) {
            if min > compile {
                return Err(DescriptorError::malformed(
                    "android.min-sdk",
                    format!("{} is greater than compile-sdk {}", min, compile),
                ));
            }
        }

        Ok(AndroidConfig {
            namespace: android.namespace.clone(),
            compile_sdk: android.compile_sdk,
            min_sdk: android.min_sdk,
        })
    }
}
