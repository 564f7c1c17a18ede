//! Documentation Pipeline
//!
//! Per file: parse, filter candidates, run the cascade, generate, splice and
//! write. Files and declarations are processed strictly one at a time; the
//! `RunSummary` is the single accumulator for counts and usage.

pub mod summary;

pub use summary::{DeclarationReport, FileReport, RunSummary};

use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

use crate::analyzer::JavaParser;
use crate::cascade::RegenerationCascade;
use crate::eligibility::EligibilityFilter;
use crate::generator::DocGenerator;
use crate::splicer;
use crate::types::{CascadeAction, CascadeDecision, DeclarationRecord, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Regenerate every candidate, bypassing the cascade
    pub force: bool,
    /// Generate but do not write files
    pub output_only: bool,
}

pub struct DocPipeline {
    parser: JavaParser,
    filter: EligibilityFilter,
    cascade: RegenerationCascade,
    generator: DocGenerator,
    options: PipelineOptions,
}

impl DocPipeline {
    pub fn new(
        filter: EligibilityFilter,
        cascade: RegenerationCascade,
        generator: DocGenerator,
        options: PipelineOptions,
    ) -> Self {
        Self {
            parser: JavaParser::new(),
            filter,
            cascade,
            generator: generator.with_preserve_existing(!options.force),
            options,
        }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Process `files` in order. A failing file is recorded and skipped.
    pub async fn run(&self, files: &[PathBuf]) -> RunSummary {
        let mut summary = RunSummary::new();
        info!(run_id = %summary.run_id, files = files.len(), "Starting documentation run");

        for path in files {
            let report = match self.process_file(path, &mut summary).await {
                Ok(report) => report,
                Err(e) => {
                    error!("Failed to process {}: {}", path.display(), e);
                    FileReport::failed(path, e)
                }
            };
            summary.record_file(report);
        }

        summary.finish();
        info!(
            files = summary.files_processed,
            modified = summary.files_modified,
            regenerated = summary.regenerated,
            "Run complete"
        );
        summary
    }

    #[instrument(skip_all, fields(file = %path.display()))]
    pub async fn process_file(&self, path: &Path, summary: &mut RunSummary) -> Result<FileReport> {
        let content = tokio::fs::read_to_string(path).await?;
        let (declarations, candidates) = select_candidates(&self.parser, &self.filter, &content);

        let mut report = FileReport::new(path);
        report.declarations = declarations;

        let mut updated: Vec<DeclarationRecord> = Vec::new();
        for mut decl in candidates {
            let decision = if self.options.force {
                CascadeDecision::new(CascadeAction::Forced, "Forced regeneration")
            } else {
                self.cascade.decide(&decl, path).await
            };
            summary.record_decision(&decision);
            info!("{}: {} ({})", decl.label(), decision.action, decision.reason);

            let mut entry = DeclarationReport {
                label: decl.label(),
                line: decl.start_line,
                decision: Some(decision.clone()),
                generated: None,
            };

            if decision.should_regenerate() {
                let generated = self.generator.generate(&decl, &content).await;
                summary.record_generation(generated.as_ref());
                if let Some(doc) = generated {
                    entry.generated = Some(doc.clone());
                    decl.generated_doc = Some(doc);
                    updated.push(decl);
                }
            }
            report.candidates.push(entry);
        }

        if updated.is_empty() || self.options.output_only {
            return Ok(report);
        }

        let rewritten = splicer::apply(&content, &updated);
        if rewritten != content {
            tokio::fs::write(path, rewritten).await?;
            report.modified = true;
            info!(updated = updated.len(), "Wrote documentation");
        } else {
            warn!("Generated documentation left the file unchanged");
        }
        Ok(report)
    }
}

/// Parse `content` and keep the eligible declarations, returning the total
/// declaration count alongside
pub fn select_candidates(
    parser: &JavaParser,
    filter: &EligibilityFilter,
    content: &str,
) -> (usize, Vec<DeclarationRecord>) {
    let declarations = parser.parse(content);
    let candidates: Vec<DeclarationRecord> = filter
        .candidates(&declarations, content.lines().count())
        .into_iter()
        .cloned()
        .collect();
    info!(
        declarations = declarations.len(),
        candidates = candidates.len(),
        "Parsed file"
    );
    (declarations.len(), candidates)
}

/// Dry run: report the candidates of each file without VCS or oracle calls
pub async fn plan(files: &[PathBuf], filter: &EligibilityFilter) -> RunSummary {
    let parser = JavaParser::new();
    let mut summary = RunSummary::new();

    for path in files {
        let report = match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let (declarations, candidates) = select_candidates(&parser, filter, &content);
                FileReport {
                    declarations,
                    candidates: candidates
                        .iter()
                        .map(|decl| DeclarationReport {
                            label: decl.label(),
                            line: decl.start_line,
                            decision: None,
                            generated: None,
                        })
                        .collect(),
                    ..FileReport::new(path)
                }
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                FileReport::failed(path, e)
            }
        };
        summary.record_file(report);
    }

    summary.finish();
    summary
}
