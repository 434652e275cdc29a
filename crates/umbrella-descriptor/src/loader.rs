//! Descriptor loading and discovery
//!
//! Reads `umbrella.toml` files, validates them, and follows path dependencies
//! to collect every module reachable from a root descriptor.

use crate::descriptor::Descriptor;
use crate::module::Module;
use crate::validator::Validator;
use crate::{DescriptorError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Descriptor file name
pub const DESCRIPTOR_FILE: &str = "umbrella.toml";

/// Modules reachable from a root descriptor
#[derive(Debug, Clone)]
pub struct ModuleTree {
    /// Root module name
    pub root: String,
    /// Modules in load order, root first
    pub modules: Vec<Module>,
}

impl ModuleTree {
    /// The root module
    pub fn root_module(&self) -> Option<&Module> {
        self.get(&self.root)
    }

    /// Look up a module by name
    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Descriptor loader
///
/// Tracks descriptors already read (by canonical path) so that a tree with
/// cyclic path references terminates. The cycle itself is reported later,
/// when the module graph is ordered.
pub struct Loader {
    /// Canonical descriptor path -> module name
    loaded: HashMap<PathBuf, String>,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            loaded: HashMap::new(),
        }
    }

    /// Find the nearest descriptor by walking up from `start_dir`
    pub fn find_descriptor(start_dir: &Path) -> Result<PathBuf> {
        let mut current = start_dir.to_path_buf();

        loop {
            let candidate = current.join(DESCRIPTOR_FILE);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "found descriptor");
                return Ok(candidate);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(DescriptorError::NotFound(start_dir.to_path_buf())),
            }
        }
    }

    /// Resolve a descriptor location: a directory means `<dir>/umbrella.toml`
    pub fn descriptor_path(location: &Path) -> PathBuf {
        if location.is_dir() {
            location.join(DESCRIPTOR_FILE)
        } else {
            location.to_path_buf()
        }
    }

    /// Load and validate a single descriptor file
    ///
    /// Relative dependency paths are resolved against the descriptor's
    /// directory.
    pub fn load_file(path: &Path) -> Result<Module> {
        let content = fs::read_to_string(path).map_err(|e| DescriptorError::io(path, e))?;
        let descriptor = Descriptor::from_str(&content).map_err(|error| {
            DescriptorError::ParseError {
                path: path.to_path_buf(),
                error,
            }
        })?;

        let mut module = Validator::validate(&descriptor)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        for dep in &mut module.dependencies {
            if let Some(dep_path) = dep.path.take() {
                dep.path = Some(base_dir.join(dep_path));
            }
        }
        module.source = Some(path.to_path_buf());
        module.fingerprint = Some(fingerprint(&content));

        trace!(module = %module.name, path = %path.display(), "loaded descriptor");
        Ok(module)
    }

    /// Load and validate a descriptor held in memory
    pub fn load_str(content: &str) -> Result<Module> {
        let descriptor =
            Descriptor::from_str(content).map_err(|error| DescriptorError::ParseError {
                path: PathBuf::from("<memory>"),
                error,
            })?;
        let mut module = Validator::validate(&descriptor)?;
        module.fingerprint = Some(fingerprint(content));
        Ok(module)
    }

    /// Load the root descriptor and every module reachable through its
    /// dependencies
    ///
    /// Dependencies without a path become leaf modules.
    pub fn load_tree(&mut self, root: &Path) -> Result<ModuleTree> {
        self.loaded.clear();
        let root_path = Self::descriptor_path(root);
        let root_module = Self::load_file(&root_path)?;
        let root_name = root_module.name.clone();
        self.loaded.insert(canonicalize(&root_path)?, root_name.clone());

        let mut modules = vec![root_module];
        let mut index = 0;

        // Breadth-first over path dependencies; `modules` doubles as the queue
        while index < modules.len() {
            let dependencies = modules[index].dependencies.clone();
            index += 1;

            for dep in dependencies {
                let Some(location) = dep.path.as_deref() else {
                    continue;
                };
                let field = format!("module.dependencies.{}", dep.name);
                let dep_path = Self::descriptor_path(location);
                if !dep_path.is_file() {
                    return Err(DescriptorError::malformed(
                        field,
                        format!("no descriptor at {}", dep_path.display()),
                    ));
                }
                let canonical = canonicalize(&dep_path)?;

                if let Some(existing) = self.loaded.get(&canonical) {
                    if existing != &dep.name {
                        return Err(DescriptorError::malformed(
                            field,
                            format!("{} declares module '{}'", dep_path.display(), existing),
                        ));
                    }
                    continue;
                }

                let module = Self::load_file(&dep_path)?;
                if module.name != dep.name {
                    return Err(DescriptorError::malformed(
                        field,
                        format!("{} declares module '{}'", dep_path.display(), module.name),
                    ));
                }
                if modules.iter().any(|m| m.name == module.name) {
                    return Err(DescriptorError::malformed(
                        field,
                        format!("module '{}' is loaded from two locations", module.name),
                    ));
                }

                debug!(module = %module.name, path = %dep_path.display(), "loaded dependency");
                self.loaded.insert(canonical, module.name.clone());
                modules.push(module);
            }
        }

        // Prebuilt dependencies referenced only by name
        let mut leaves: Vec<Module> = Vec::new();
        for module in &modules {
            for dep in &module.dependencies {
                let known = modules.iter().any(|m| m.name == dep.name)
                    || leaves.iter().any(|m| m.name == dep.name);
                if !known {
                    leaves.push(Module::leaf(&dep.name));
                }
            }
        }
        modules.extend(leaves);

        debug!(root = %root_name, modules = modules.len(), "loaded module tree");
        Ok(ModuleTree {
            root: root_name,
            modules,
        })
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| DescriptorError::io(path, e))
}

/// sha256 of descriptor text, hex encoded
fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
