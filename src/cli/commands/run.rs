//! Run Command
//!
//! Document Java files through the regeneration cascade.
//!
//! Usage:
//!   weavedoc run [PATHS...] [--changed] [--base main] [--force]
//!                [--dry-run] [--output-only] [--commit] [--json]

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::ai::{LlmProvider, create_provider};
use crate::analyzer::FileScanner;
use crate::cascade::{Auditor, HeuristicChecker, RegenerationCascade};
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::eligibility::EligibilityFilter;
use crate::generator::DocGenerator;
use crate::pipeline::{self, DocPipeline, PipelineOptions, RunSummary};
use crate::types::{Result, WeaveError};
use crate::vcs::{GitCli, VersionControl, build_commit_message};

const BASE_REF_ENV: &str = "GITHUB_BASE_REF";

/// Run options (consolidated parameters)
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Files or directories to document
    pub paths: Vec<PathBuf>,
    /// Discover changed files against the base branch
    pub changed: bool,
    /// Base branch override
    pub base: Option<String>,
    /// Regenerate every candidate
    pub force: bool,
    /// Send sound documentation to the audit even without a code change
    pub force_audit: bool,
    /// List candidates only
    pub dry_run: bool,
    /// Print generated documentation instead of writing files
    pub output_only: bool,
    /// Commit modified files
    pub commit: bool,
    /// Print the run summary as JSON
    pub json: bool,
}

pub fn run_with_options(options: RunOptions) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    if options.force_audit {
        config.cascade.force_audit = true;
    }

    let rt = Runtime::new()?;
    rt.block_on(run(config, options))
}

async fn run(config: Config, options: RunOptions) -> Result<()> {
    let out = Output::new();
    let git = Arc::new(GitCli::new(".", &config.vcs));

    let changed_mode = options.changed || options.paths.is_empty();
    let files = if changed_mode {
        let base = resolve_base_ref(options.base.as_deref(), &config.vcs.base_ref);
        info!("Discovering Java files changed against {}", base);
        git.changed_files(&base).await?
    } else {
        collect_files(&options.paths)?
    };

    if files.is_empty() {
        out.info("No Java files to process");
        return Ok(());
    }
    out.info(&format!("Processing {} Java file(s)", files.len()));

    let filter = EligibilityFilter::new(config.eligibility.clone());
    let summary = if options.dry_run {
        pipeline::plan(&files, &filter).await
    } else {
        let pipeline = build_pipeline(&config, git.clone(), filter, &options)?;
        pipeline.run(&files).await
    };

    report(&out, &summary, &options)?;

    if options.commit && !options.dry_run && !options.output_only {
        commit(&out, git.as_ref(), &summary).await?;
    }

    if summary.files_failed > 0 && summary.files_failed == summary.files_processed {
        return Err(WeaveError::generation("run", "every file failed"));
    }
    Ok(())
}

fn build_pipeline(
    config: &Config,
    vcs: Arc<GitCli>,
    filter: EligibilityFilter,
    options: &RunOptions,
) -> Result<DocPipeline> {
    let provider = create_provider(&config.llm)?;
    info!(
        provider = provider.name(),
        generation = %config.llm.generation.model,
        audit = %config.llm.audit.model,
        "Oracle ready"
    );

    let cascade = RegenerationCascade::new(
        HeuristicChecker::new(config.quality.clone()),
        Auditor::new(provider.clone(), config.llm.audit.clone(), config.llm.temperature),
        vcs,
        config.cascade.clone(),
    );
    let generator = DocGenerator::from_config(
        provider,
        config.llm.generation.clone(),
        config.llm.temperature,
        &config.generation,
    );

    Ok(DocPipeline::new(
        filter,
        cascade,
        generator,
        PipelineOptions {
            force: options.force,
            output_only: options.output_only,
        },
    ))
}

/// `--base` wins, then `GITHUB_BASE_REF`, then configuration
fn resolve_base_ref(flag: Option<&str>, configured: &str) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var(BASE_REF_ENV).ok())
        .filter(|b| !b.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(WeaveError::Config(format!(
                "File {} does not exist",
                path.display()
            )));
        }
        files.extend(FileScanner::new(path).scan()?);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn report(out: &Output, summary: &RunSummary, options: &RunOptions) -> Result<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    for file in &summary.files {
        out.file_report(file, options.dry_run);
        if options.output_only {
            for entry in &file.candidates {
                if let Some(doc) = &entry.generated {
                    println!("\n// {} (line {})\n{}", entry.label, entry.line, doc.documentation_text);
                    if let Some(notes) = &doc.implementation_notes {
                        println!("{}", notes);
                    }
                }
            }
        }
    }
    out.summary(summary, options.dry_run);
    Ok(())
}

async fn commit(out: &Output, vcs: &dyn VersionControl, summary: &RunSummary) -> Result<()> {
    let modified = summary.modified_paths();
    if modified.is_empty() {
        out.info("No files modified, nothing to commit");
        return Ok(());
    }

    let message = build_commit_message(
        &modified,
        summary.usage.total_tokens(),
        summary.usage.total_cost_usd(),
    );
    match vcs.commit(&modified, &message).await {
        Ok(()) => {
            out.success(&format!("Committed changes for {} file(s)", modified.len()));
            Ok(())
        }
        Err(e) => {
            warn!("Commit failed: {}", e);
            out.error(&format!("Error committing changes: {}", e));
            Err(e)
        }
    }
}
