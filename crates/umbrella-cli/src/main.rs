use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Umbrella framework packager.
///
/// Packages a multiplatform module and the dependencies it re-exports into a
/// single distributable framework, one slice per concrete platform target.
///
/// EXAMPLES:
///     umbrella build                    Package the nearest umbrella.toml
///     umbrella build --release          Package with the release profile
///     umbrella check --json             Validate without writing anything
///     umbrella targets ios A            Show what identifiers resolve to
///     umbrella init Shared              Write a starter umbrella.toml
///
/// ENVIRONMENT VARIABLES:
///     UMBRELLA_JSON      Set to '1' for JSON output by default
///     UMBRELLA_OUT_DIR   Default artifact output directory
///     UMBRELLA_PROFILE   Default build profile (debug or release)
///     UMBRELLA_LOG       Log filter directives (default: warn)
///     NO_COLOR           Set to disable colored output
#[derive(Parser)]
#[command(name = "umbrella")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package the root module into a framework artifact
    ///
    /// Loads the module tree, resolves platform targets, validates the
    /// dependency graph and writes the artifact manifest together with one
    /// framework bundle per Apple slice and the Android library manifest.
    ///
    /// EXAMPLES:
    ///     umbrella build                          Build with the debug profile
    ///     umbrella build --release                Build with the release profile
    ///     umbrella build --out-dir dist --json    Custom output, JSON summary
    #[command(visible_alias = "b")]
    Build {
        /// Path to umbrella.toml or the directory containing it
        #[arg(long, value_name = "PATH")]
        manifest_path: Option<PathBuf>,
        /// Artifact output directory (default: build/umbrella)
        #[arg(long, short = 'o', value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Build profile (debug or release)
        #[arg(long, short = 'p')]
        profile: Option<String>,
        /// Build in release mode (shorthand for --profile=release)
        #[arg(long)]
        release: bool,
        /// Remove the output directory before writing
        #[arg(long)]
        clean: bool,
        /// Verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Quiet output (errors only)
        #[arg(long, short = 'q')]
        quiet: bool,
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Validate the module tree without writing anything
    ///
    /// Runs the full packaging pipeline and reports the artifact that
    /// `umbrella build` would produce.
    ///
    /// EXAMPLES:
    ///     umbrella check                          Check the nearest descriptor
    ///     umbrella check --manifest-path shared   Check another module
    #[command(visible_alias = "c")]
    Check {
        /// Path to umbrella.toml or the directory containing it
        #[arg(long, value_name = "PATH")]
        manifest_path: Option<PathBuf>,
        /// Build profile (debug or release)
        #[arg(long, short = 'p')]
        profile: Option<String>,
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Resolve platform identifiers to concrete targets
    ///
    /// With identifiers, resolves exactly those. Without, resolves the
    /// targets declared by the root module.
    ///
    /// EXAMPLES:
    ///     umbrella targets ios android      Resolve identifiers
    ///     umbrella targets                  Resolve the root module's targets
    ///     umbrella targets --list           Show every known identifier
    Targets {
        /// Platform identifiers to resolve
        ids: Vec<String>,
        /// Path to umbrella.toml or the directory containing it
        #[arg(long, value_name = "PATH")]
        manifest_path: Option<PathBuf>,
        /// List every known identifier and its expansion
        #[arg(long, conflicts_with = "ids")]
        list: bool,
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Write a starter umbrella.toml
    ///
    /// EXAMPLES:
    ///     umbrella init                     Use the directory name
    ///     umbrella init Shared --path app   Create app/umbrella.toml
    Init {
        /// Module name (defaults to the directory name)
        name: Option<String>,
        /// Directory to write the descriptor in
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Overwrite an existing descriptor
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     umbrella completions bash > ~/.local/share/bash-completion/completions/umbrella
    ///     umbrella completions zsh > ~/.zfunc/_umbrella
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();

    if cli_config.no_color {
        colored::control::set_override(false);
    }

    let verbose = matches!(cli.command, Commands::Build { verbose: true, .. });
    init_logging(&cli_config, verbose);

    match cli.command {
        Commands::Build {
            manifest_path,
            out_dir,
            profile,
            release,
            clean,
            verbose,
            quiet,
            json,
        } => {
            // Command-line flags override environment variables
            let args = commands::build::BuildArgs {
                manifest_path,
                out_dir: out_dir.or(cli_config.out_dir),
                profile: profile.or(cli_config.profile),
                release,
                clean,
                verbose,
                quiet,
                json: json || cli_config.default_json,
            };
            commands::build::run(args)?;
        }
        Commands::Check {
            manifest_path,
            profile,
            json,
        } => {
            let args = commands::check::CheckArgs {
                manifest_path,
                profile: profile.or(cli_config.profile),
                json: json || cli_config.default_json,
            };
            commands::check::run(args)?;
        }
        Commands::Targets {
            ids,
            manifest_path,
            list,
            json,
        } => {
            let args = commands::targets::TargetsArgs {
                ids,
                manifest_path,
                list,
                json: json || cli_config.default_json,
            };
            commands::targets::run(args)?;
        }
        Commands::Init { name, path, force } => {
            let args = commands::init::InitArgs { name, path, force };
            commands::init::run(args)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber
fn init_logging(cli_config: &config::Config, verbose: bool) {
    let directives = cli_config
        .log_filter
        .clone()
        .unwrap_or_else(|| config::Config::default_log_level(verbose).to_string());
    let filter = EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| EnvFilter::new(config::Config::default_log_level(verbose)));

    // Keep any subscriber installed earlier
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
