//! Module graph and packaging order using topological sort
use crate::error::{BuildError, BuildResult};
use crate::targets::{PlatformResolver, PlatformTarget};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use umbrella_descriptor::ModuleTree;

/// A module in the dependency graph, with its targets resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// Module name
    pub name: String,
    /// Concrete platform targets
    pub targets: Vec<PlatformTarget>,
    /// Module dependencies (other module names)
    pub dependencies: Vec<String>,
    /// Embedded runtime dependency
    pub runtime: Option<String>,
}

impl ModuleNode {
    /// Create a new module node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: Vec::new(),
            dependencies: Vec::new(),
            runtime: None,
        }
    }

    /// Set targets
    pub fn with_targets(mut self, targets: Vec<PlatformTarget>) -> Self {
        self.targets = targets;
        self
    }

    /// Add dependencies
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Set embedded runtime
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    /// Prebuilt modules declare no targets of their own
    pub fn is_prebuilt(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Dependency graph of the modules aggregated into a framework
#[derive(Debug, Clone)]
pub struct BuildGraph {
    /// Modules by name
    modules: BTreeMap<String, ModuleNode>,
}

impl BuildGraph {
    /// Create a new empty build graph
    pub fn new() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }

    /// Build a graph from a loaded module tree, resolving every module's
    /// declared targets
    pub fn from_tree(tree: &ModuleTree) -> BuildResult<Self> {
        let mut graph = Self::new();
        for module in &tree.modules {
            let mut node = ModuleNode::new(&module.name)
                .with_targets(PlatformResolver::resolve_module(module)?)
                .with_dependencies(module.dependency_names().map(String::from).collect());
            if let Some(runtime) = &module.runtime {
                node = node.with_runtime(runtime);
            }
            graph.add_module(node);
        }
        Ok(graph)
    }

    /// Add a module to the graph
    pub fn add_module(&mut self, module: ModuleNode) {
        self.modules.insert(module.name.clone(), module);
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&ModuleNode> {
        self.modules.get(name)
    }

    /// Get all modules
    pub fn modules(&self) -> &BTreeMap<String, ModuleNode> {
        &self.modules
    }

    /// Get module count
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if graph is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Validate the graph
    pub fn validate(&self) -> BuildResult<()> {
        // Check all dependencies exist
        for (name, module) in &self.modules {
            for dep in &module.dependencies {
                if !self.modules.contains_key(dep) {
                    return Err(BuildError::module_not_found(format!(
                        "{} (required by {})",
                        dep, name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check that every module's targets are provided by the modules it
    /// depends on
    ///
    /// Prebuilt dependencies are assumed to ship every target.
    pub fn validate_targets(&self) -> BuildResult<()> {
        for (name, module) in &self.modules {
            for dep_name in &module.dependencies {
                let Some(dep) = self.modules.get(dep_name) else {
                    continue;
                };
                if dep.is_prebuilt() {
                    continue;
                }
                if let Some(target) = module.targets.iter().find(|t| !dep.targets.contains(*t)) {
                    return Err(BuildError::MissingTarget {
                        module: name.clone(),
                        dependency: dep_name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Modules reachable from `root`, including `root` itself
    pub fn reachable_from(&self, root: &str) -> HashSet<String> {
        let mut reachable = HashSet::new();
        let mut stack = vec![root.to_string()];

        while let Some(name) = stack.pop() {
            if !reachable.insert(name.clone()) {
                continue;
            }
            if let Some(module) = self.modules.get(&name) {
                stack.extend(module.dependencies.iter().cloned());
            }
        }

        reachable
    }

    /// Compute topological build order using Kahn's algorithm
    ///
    /// Dependencies come before their dependents. Ties are broken by name so
    /// the order is stable across runs.
    pub fn compute_build_order(&self) -> BuildResult<Vec<String>> {
        if self.modules.is_empty() {
            return Ok(Vec::new());
        }

        let mut in_degree = self.compute_in_degrees();
        let mut ready: BTreeSet<String> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| name.clone())
            .collect();
        let mut result = Vec::with_capacity(self.modules.len());

        while let Some(module_name) = ready.pop_first() {
            // For each module that depends on the current module
            for (dependent, module) in &self.modules {
                if module.dependencies.contains(&module_name) {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(dependent.clone());
                        }
                    }
                }
            }
            result.push(module_name);
        }

        // Check for cycles
        if result.len() != self.modules.len() {
            return Err(BuildError::CyclicDependency(self.find_cycle()));
        }

        Ok(result)
    }

    /// In-degree = number of dependencies this module has
    fn compute_in_degrees(&self) -> BTreeMap<String, usize> {
        self.modules
            .iter()
            .map(|(name, module)| (name.clone(), module.dependencies.len()))
            .collect()
    }

    /// Find modules that can be packaged in parallel
    /// Returns groups where each group only depends on earlier groups
    pub fn parallel_build_groups(&self) -> BuildResult<Vec<Vec<String>>> {
        if self.modules.is_empty() {
            return Ok(Vec::new());
        }

        let mut groups = Vec::new();
        let mut built: HashSet<String> = HashSet::new();

        loop {
            // BTreeMap iteration keeps each group sorted
            let group: Vec<String> = self
                .modules
                .iter()
                .filter(|(name, _)| !built.contains(*name))
                .filter(|(_, module)| module.dependencies.iter().all(|d| built.contains(d)))
                .map(|(name, _)| name.clone())
                .collect();

            if group.is_empty() {
                break;
            }

            built.extend(group.iter().cloned());
            groups.push(group);
        }

        if built.len() != self.modules.len() {
            return Err(BuildError::CyclicDependency(self.find_cycle()));
        }

        Ok(groups)
    }

    /// Find a cycle in the graph (for error reporting)
    fn find_cycle(&self) -> String {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for module_name in self.modules.keys() {
            if let Some(cycle) =
                self.dfs_find_cycle(module_name, &mut visited, &mut rec_stack, &mut path)
            {
                return cycle;
            }
        }

        "unknown cycle".to_string()
    }

    /// DFS to find a cycle
    fn dfs_find_cycle(
        &self,
        module_name: &str,
        visited: &mut HashSet<String>,
        rec_stack: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> Option<String> {
        if rec_stack.contains(module_name) {
            // Found cycle - extract the cycle from path
            if let Some(start) = path.iter().position(|m| m == module_name) {
                let mut cycle = path[start..].to_vec();
                cycle.push(module_name.to_string());
                return Some(cycle.join(" -> "));
            }
            return Some(path.join(" -> "));
        }

        if visited.contains(module_name) {
            return None;
        }

        visited.insert(module_name.to_string());
        rec_stack.insert(module_name.to_string());
        path.push(module_name.to_string());

        if let Some(module) = self.modules.get(module_name) {
            for dep in &module.dependencies {
                if let Some(cycle) = self.dfs_find_cycle(dep, visited, rec_stack, path) {
                    return Some(cycle);
                }
            }
        }

        rec_stack.remove(module_name);
        path.pop();
        None
    }
}

impl Default for BuildGraph {
    fn default() -> Self {
        Self::new()
    }
}
