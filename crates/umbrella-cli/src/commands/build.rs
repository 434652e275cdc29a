//! Build command - package the root module into a framework artifact

use super::{determine_profile, open_builder};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use umbrella_build::BuildContext;

/// Build command arguments
#[derive(Debug, Default)]
pub struct BuildArgs {
    /// Descriptor file or directory (defaults to discovery from cwd)
    pub manifest_path: Option<PathBuf>,
    /// Artifact output directory
    pub out_dir: Option<PathBuf>,
    /// Build profile (debug or release)
    pub profile: Option<String>,
    /// Build in release mode (shorthand for --profile=release)
    pub release: bool,
    /// Remove previous output first
    pub clean: bool,
    /// Verbose output
    pub verbose: bool,
    /// Quiet output (errors only)
    pub quiet: bool,
    /// JSON output
    pub json: bool,
}

/// Run the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let profile = determine_profile(args.release, args.profile.as_deref())?;

    let mut builder = open_builder(args.manifest_path.as_deref())?.with_profile(profile);
    if let Some(ref out_dir) = args.out_dir {
        builder = builder.with_out_dir(out_dir.clone());
    }

    if args.clean {
        if !args.quiet && !args.json {
            println!("Cleaning {}...", builder.out_dir().display());
        }
        builder.clean().context("Failed to clean build artifacts")?;
    }

    let context = builder.build().context("Build failed")?;
    let out_dir = builder.out_dir();

    if args.json {
        println!("{}", json_summary(&context, &out_dir)?);
    } else if !args.quiet {
        print_summary(&context, &out_dir, args.verbose);
    }

    Ok(())
}

fn json_summary(context: &BuildContext, out_dir: &std::path::Path) -> Result<String> {
    let summary = serde_json::json!({
        "success": true,
        "profile": context.artifact.profile.name(),
        "outDir": out_dir.display().to_string(),
        "files": context.written.len(),
        "modules": context.stats.total_modules,
        "prebuiltModules": context.stats.prebuilt_modules,
        "parallelGroups": context.stats.parallel_groups,
        "totalTime": context.stats.total_time.as_secs_f64(),
        "artifact": context.artifact,
    });
    serde_json::to_string_pretty(&summary).context("Failed to render JSON output")
}

fn print_summary(context: &BuildContext, out_dir: &std::path::Path, verbose: bool) {
    let artifact = &context.artifact;
    let targets: Vec<&str> = artifact.targets.iter().map(|t| t.name()).collect();

    println!("\n{}", "=".repeat(60));
    println!(
        "{} {} {} in {:.2}s",
        "Packaged".green().bold(),
        artifact.framework_name(),
        artifact.version,
        context.stats.total_time.as_secs_f64()
    );
    println!("{}", "=".repeat(60));
    println!("  Profile: {}", artifact.profile);
    println!("  Linkage: {}", artifact.linkage);
    println!("  Targets: {}", targets.join(", "));
    if !artifact.exports.is_empty() {
        println!("  Exports: {}", artifact.exports.join(", "));
    }
    println!(
        "  Modules: {} ({} prebuilt)",
        context.stats.total_modules, context.stats.prebuilt_modules
    );
    println!("  Output: {}", out_dir.display());
    println!("{}", "=".repeat(60));

    if verbose {
        for path in &context.written {
            let shown = path.strip_prefix(out_dir).unwrap_or(path);
            println!("  {} {}", "wrote".dimmed(), shown.display());
        }
    }
}
