//! Run summary
//!
//! Aggregate counts for one run, so per-declaration failures that were only
//! logged stay visible in the totals.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

use crate::ai::{Tier, UsageLedger};
use crate::types::{CascadeAction, CascadeDecision, GeneratedDoc};

/// Outcome of one declaration that reached the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationReport {
    pub label: String,
    pub line: usize,
    /// `None` in dry-run mode
    pub decision: Option<CascadeDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedDoc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub declarations: usize,
    pub candidates: Vec<DeclarationReport>,
    pub modified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declarations: 0,
            candidates: Vec::new(),
            modified: false,
            error: None,
        }
    }

    pub fn failed(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(path)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub files_processed: usize,
    pub files_modified: usize,
    pub files_failed: usize,
    pub declarations: usize,
    pub candidates: usize,
    pub decisions: BTreeMap<CascadeAction, usize>,
    pub regenerated: usize,
    pub generation_failures: usize,
    /// Classification calls made, including ones that failed in transport
    pub audit_calls: usize,
    pub usage: UsageLedger,
    pub files: Vec<FileReport>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            files_processed: 0,
            files_modified: 0,
            files_failed: 0,
            declarations: 0,
            candidates: 0,
            decisions: BTreeMap::new(),
            regenerated: 0,
            generation_failures: 0,
            audit_calls: 0,
            usage: UsageLedger::new(),
            files: Vec::new(),
        }
    }

    pub fn record_decision(&mut self, decision: &CascadeDecision) {
        *self.decisions.entry(decision.action).or_default() += 1;
        if decision.action.consulted_audit() {
            self.audit_calls += 1;
        }
        if let Some(usage) = &decision.audit_usage {
            self.usage.record(Tier::Audit, usage);
        }
    }

    pub fn record_generation(&mut self, generated: Option<&GeneratedDoc>) {
        match generated {
            Some(doc) => {
                self.regenerated += 1;
                self.usage.record(Tier::Generation, &doc.usage);
            }
            None => self.generation_failures += 1,
        }
    }

    pub fn record_file(&mut self, report: FileReport) {
        self.files_processed += 1;
        if report.error.is_some() {
            self.files_failed += 1;
        }
        if report.modified {
            self.files_modified += 1;
        }
        self.declarations += report.declarations;
        self.candidates += report.candidates.len();
        self.files.push(report);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Declarations the cascade decided to keep
    pub fn skipped(&self) -> usize {
        self.decisions
            .iter()
            .filter(|(action, _)| !action.should_regenerate())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn modified_paths(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| f.modified)
            .map(|f| f.path.clone())
            .collect()
    }

    pub fn duration_secs(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}
