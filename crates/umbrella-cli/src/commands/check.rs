//! Check command - run the packaging pipeline without writing

use super::{determine_profile, open_builder};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Check command arguments
#[derive(Debug, Default)]
pub struct CheckArgs {
    /// Descriptor file or directory (defaults to discovery from cwd)
    pub manifest_path: Option<PathBuf>,
    /// Build profile (debug or release)
    pub profile: Option<String>,
    /// JSON output
    pub json: bool,
}

/// Run the check command
pub fn run(args: CheckArgs) -> Result<()> {
    let profile = determine_profile(false, args.profile.as_deref())?;
    let builder = open_builder(args.manifest_path.as_deref())?.with_profile(profile);
    let context = builder.plan().context("Check failed")?;
    let artifact = &context.artifact;

    if args.json {
        let report = serde_json::json!({
            "valid": true,
            "descriptor": builder.descriptor().display().to_string(),
            "artifact": artifact,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to render JSON output")?
        );
        return Ok(());
    }

    println!(
        "{} {} {} ({})",
        "ok".green().bold(),
        artifact.module,
        artifact.version,
        builder.descriptor().display()
    );
    for (i, module) in artifact.modules.iter().enumerate() {
        let marker = if artifact.exports.contains(module) {
            " (exported)"
        } else {
            ""
        };
        println!("  {}. {}{}", i + 1, module, marker);
    }
    for slice in &artifact.frameworks {
        println!("  {} {}", slice.target.name().cyan(), slice.path.display());
    }
    if let Some(android) = &artifact.android {
        println!("  {} {}", "android".cyan(), android.namespace);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_writes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("umbrella.toml"),
            r#"
[module]
name = "Shared"
targets = ["android"]

[framework]
version = "1.0.0"

[android]
namespace = "com.example.shared"
"#,
        )
        .unwrap();

        run(CheckArgs {
            manifest_path: Some(temp.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();

        assert!(!temp.path().join("build").exists());
    }

    #[test]
    fn test_check_reports_malformed_field() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("umbrella.toml"),
            "[module]\nname = \"Shared\"\ntargets = []\n",
        )
        .unwrap();

        let err = run(CheckArgs {
            manifest_path: Some(temp.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("module.targets"));
    }
}
