use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weavedoc::cli::commands::run::RunOptions;

#[derive(Parser)]
#[command(name = "weavedoc")]
#[command(
    version,
    about = "Cost-aware Javadoc generator for Java codebases"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate or refresh Javadoc for Java files
    Run {
        #[arg(help = "Java files or directories (default: changed files)")]
        paths: Vec<PathBuf>,
        #[arg(long, help = "Process Java files changed against the base branch")]
        changed: bool,
        #[arg(long, help = "Base branch for --changed (default: $GITHUB_BASE_REF or config)")]
        base: Option<String>,
        #[arg(long, help = "Regenerate every candidate, ignoring existing Javadoc")]
        force: bool,
        #[arg(long, help = "Audit sound Javadoc even when the code is unchanged")]
        force_audit: bool,
        #[arg(long = "dry-run", help = "List candidates without calling the LLM")]
        dry_run: bool,
        #[arg(long = "output-only", help = "Print generated Javadoc, don't modify files")]
        output_only: bool,
        #[arg(long, help = "Commit modified files to git")]
        commit: bool,
        #[arg(long, help = "Print the run summary as JSON")]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mWeaveDoc encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            paths,
            changed,
            base,
            force,
            force_audit,
            dry_run,
            output_only,
            commit,
            json,
        } => {
            weavedoc::cli::commands::run::run_with_options(RunOptions {
                paths,
                changed,
                base,
                force,
                force_audit,
                dry_run,
                output_only,
                commit,
                json,
            })?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                weavedoc::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                weavedoc::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    weavedoc::cli::commands::config::init_global(force)?;
                } else {
                    weavedoc::cli::commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
