//! Descriptor initialization command (umbrella init)

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use umbrella_descriptor::{AndroidConfig, Loader, Validator, DESCRIPTOR_FILE};

/// Arguments for the init command
#[derive(Debug, Clone)]
pub struct InitArgs {
    /// Module name (defaults to directory name)
    pub name: Option<String>,
    /// Directory to write the descriptor in
    pub path: PathBuf,
    /// Overwrite an existing descriptor
    pub force: bool,
}

impl Default for InitArgs {
    fn default() -> Self {
        Self {
            name: None,
            path: PathBuf::from("."),
            force: false,
        }
    }
}

/// Run the init command
pub fn run(args: InitArgs) -> Result<PathBuf> {
    fs::create_dir_all(&args.path)
        .with_context(|| format!("Failed to create directory {}", args.path.display()))?;
    let dir = args
        .path
        .canonicalize()
        .unwrap_or_else(|_| args.path.clone());

    let name = match args.name {
        Some(name) => name,
        None => dir_name(&dir)?,
    };
    Validator::validate_identifier("module.name", &name).context("Invalid module name")?;

    let descriptor = dir.join(DESCRIPTOR_FILE);
    if descriptor.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            descriptor.display()
        );
    }

    fs::write(&descriptor, render_descriptor(&name))
        .with_context(|| format!("Failed to write {}", descriptor.display()))?;
    Loader::load_file(&descriptor).context("Generated descriptor is invalid")?;

    println!(
        "{} module '{}' at {}",
        "Created".green().bold(),
        name,
        descriptor.display()
    );
    Ok(descriptor)
}

fn dir_name(dir: &Path) -> Result<String> {
    match dir.file_name().and_then(|n| n.to_str()) {
        Some(name) => Ok(name.to_string()),
        None => bail!(
            "Cannot derive a module name from {}, pass one explicitly",
            dir.display()
        ),
    }
}

fn render_descriptor(name: &str) -> String {
    format!(
        r#"[module]
name = "{name}"
plugins = ["kotlin-multiplatform", "android-library"]
targets = ["android", "ios"]
dependencies = []

[framework]
version = "0.1.0"
linkage = "static"
deployment-target = "15.0"
export = []

[android]
namespace = "{namespace}"
compile-sdk = 35
min-sdk = 24
"#,
        name = name,
        namespace = AndroidConfig::default_namespace(name)
    )
}
