//! Targets command - show how platform identifiers resolve

use super::open_builder;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use umbrella_build::{PlatformResolver, PlatformTarget};
use umbrella_descriptor::Loader;

/// Targets command arguments
#[derive(Debug, Default)]
pub struct TargetsArgs {
    /// Identifiers to resolve; empty means the root module's targets
    pub ids: Vec<String>,
    /// Descriptor file or directory (defaults to discovery from cwd)
    pub manifest_path: Option<PathBuf>,
    /// List every known identifier
    pub list: bool,
    /// JSON output
    pub json: bool,
}

/// Run the targets command
pub fn run(args: TargetsArgs) -> Result<()> {
    if args.list {
        print_known(args.json)?;
        return Ok(());
    }

    let targets = if args.ids.is_empty() {
        let builder = open_builder(args.manifest_path.as_deref())?;
        let module = Loader::load_file(builder.descriptor())
            .with_context(|| format!("Failed to load {}", builder.descriptor().display()))?;
        PlatformResolver::resolve_module(&module).context("Failed to resolve targets")?
    } else {
        PlatformResolver::resolve(&args.ids).context("Failed to resolve targets")?
    };

    if args.json {
        let entries: Vec<_> = targets.iter().map(|t| target_json(*t)).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to render JSON output")?
        );
    } else {
        for target in targets {
            let detail = match (target.arch(), target.sdk()) {
                (Some(arch), Some(sdk)) => format!("{} {}", sdk, arch),
                _ => "all ABIs".to_string(),
            };
            println!("{:<20} {}", target.name().cyan(), detail);
        }
    }

    Ok(())
}

fn target_json(target: PlatformTarget) -> serde_json::Value {
    serde_json::json!({
        "name": target.name(),
        "family": target.family(),
        "arch": target.arch(),
        "sdk": target.sdk(),
        "simulator": target.is_simulator(),
    })
}

fn print_known(json: bool) -> Result<()> {
    let mut expansions = Vec::new();
    for id in PlatformResolver::known_identifiers() {
        if let Some(targets) = PlatformResolver::expand(id) {
            let names: Vec<&str> = targets.iter().map(|t| t.name()).collect();
            expansions.push((id, names));
        }
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = expansions
            .into_iter()
            .map(|(id, names)| (id.to_string(), serde_json::json!(names)))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&map).context("Failed to render JSON output")?
        );
    } else {
        for (id, names) in expansions {
            println!("{:<22} {}", id.bold(), names.join(", "));
        }
    }
    Ok(())
}
