//! End-to-end pipeline runs against a scripted oracle and VCS

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use weavedoc::ai::{LlmProvider, LlmRequest, LlmResponse, PromptTemplate, TokenUsage};
use weavedoc::cascade::{Auditor, HeuristicChecker};
use weavedoc::pipeline::plan;
use weavedoc::{
    CascadeAction, Config, DocGenerator, DocPipeline, EligibilityFilter, JavaParser,
    PipelineOptions, RegenerationCascade, Result, VersionControl, WeaveError,
};

const ORDER_BOOK: &str = r#"package com.example.orders;

import java.util.ArrayList;
import java.util.List;

public class OrderBook {

    private final List<Integer> orders = new ArrayList<>();

    /**
     * Adds an order after validating its quantity.
     * Rejected quantities leave the book unchanged.
     *
     * @param quantity the number of units ordered
     * @return the new number of orders
     */
    public int add(int quantity) {
        if (quantity <= 0) {
            throw new IllegalArgumentException("quantity");
        }
        int before = orders.size();
        orders.add(quantity);
        int after = orders.size();
        if (after != before + 1) {
            throw new IllegalStateException("lost");
        }
        return after;
    }

    public int total(int minimum) {
        int sum = 0;
        for (int q : orders) {
            if (q >= minimum) {
                sum += q;
            }
        }
        if (sum < 0) {
            throw new ArithmeticException("overflow");
        }
        return sum;
    }

    private void reset() {
        orders.clear();
    }

    public List<Integer> getOrders() {
        return orders;
    }
}
"#;

// inside `add`, which spans lines 17..28
const ADD_CHANGED: &str = "diff --git a/OrderBook.java b/OrderBook.java\n@@ -21 +21 @@\n-        int before = 0;\n+        int before = orders.size();\n";

// =============================================================================
// Test doubles
// =============================================================================

struct ScriptedOracle {
    audit_model: String,
    audit_reply: String,
    doc_reply: Option<String>,
    audit_calls: AtomicU32,
    generation_calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    fn new(audit_reply: &str, doc_reply: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            audit_model: Config::default().llm.audit.model,
            audit_reply: audit_reply.to_string(),
            doc_reply: doc_reply.map(str::to_string),
            audit_calls: AtomicU32::new(0),
            generation_calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn audits(&self) -> u32 {
        self.audit_calls.load(Ordering::SeqCst)
    }

    fn generations(&self) -> u32 {
        self.generation_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedOracle {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let text = if request.model == self.audit_model {
            self.audit_calls.fetch_add(1, Ordering::SeqCst);
            self.audit_reply.clone()
        } else {
            self.generation_calls.fetch_add(1, Ordering::SeqCst);
            self.doc_reply
                .clone()
                .ok_or_else(|| WeaveError::LlmApi("503 service unavailable".to_string()))?
        };
        Ok(LlmResponse {
            usage: TokenUsage::new(1200, 80),
            ..LlmResponse::text_only(text)
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

struct FixedDiff(String);

#[async_trait]
impl VersionControl for FixedDiff {
    async fn changed_files(&self, _base_ref: &str) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }

    async fn file_diff(&self, _path: &Path, _base: &str, _head: &str) -> Result<String> {
        Ok(self.0.clone())
    }

    async fn commit(&self, _paths: &[PathBuf], _message: &str) -> Result<()> {
        Ok(())
    }
}

fn pipeline(oracle: Arc<ScriptedOracle>, diff: &str, options: PipelineOptions) -> DocPipeline {
    let config = Config::default();
    let cascade = RegenerationCascade::new(
        HeuristicChecker::new(config.quality.clone()),
        Auditor::new(oracle.clone(), config.llm.audit.clone(), 0.0),
        Arc::new(FixedDiff(diff.to_string())),
        config.cascade.clone(),
    );
    let generator = DocGenerator::new(
        oracle,
        config.llm.generation.clone(),
        0.0,
        PromptTemplate::builtin(),
    );
    DocPipeline::new(
        EligibilityFilter::new(config.eligibility.clone()),
        cascade,
        generator,
        options,
    )
}

fn write_source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn description_of(source: &str, name: &str) -> Option<String> {
    JavaParser::new()
        .parse(source)
        .into_iter()
        .find(|d| d.name == name)
        .and_then(|d| d.existing_doc)
        .map(|doc| doc.fields.description)
}

// =============================================================================
// Runs
// =============================================================================

#[tokio::test]
async fn test_unchanged_doc_is_kept_and_missing_docs_generated() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "OrderBook.java", ORDER_BOOK);
    let oracle = ScriptedOracle::new("ACCURATE", Some("Sure!\n/**\n * Generated docs.\n */"));

    let summary = pipeline(oracle.clone(), "", PipelineOptions::default())
        .run(&[path.clone()])
        .await;

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.files_modified, 1);
    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.decisions[&CascadeAction::Missing], 2);
    assert_eq!(summary.decisions[&CascadeAction::NoCodeChange], 1);
    assert_eq!(summary.regenerated, 2);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(oracle.audits(), 0);
    assert_eq!(oracle.generations(), 2);
    assert_eq!(summary.usage.generation.calls, 2);
    assert_eq!(summary.usage.total_tokens(), 2 * 1280);

    let updated = fs::read_to_string(&path).unwrap();
    assert_eq!(description_of(&updated, "OrderBook").as_deref(), Some("Generated docs."));
    assert_eq!(description_of(&updated, "total").as_deref(), Some("Generated docs."));
    assert_eq!(
        description_of(&updated, "add").as_deref(),
        Some("Adds an order after validating its quantity. Rejected quantities leave the book unchanged.")
    );
    assert!(updated.contains("    /**\n     * Generated docs.\n     */\n    public int total(int minimum) {"));
    assert!(!updated.contains("Sure!"));
}

#[tokio::test]
async fn test_changed_code_goes_to_audit() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "OrderBook.java", ORDER_BOOK);
    let oracle = ScriptedOracle::new(
        r#"{"verdict": "NEEDS_UPDATE", "confidence": "high", "issues": ["size check is new"]}"#,
        Some("/**\n * Refreshed.\n */"),
    );

    let summary = pipeline(oracle.clone(), ADD_CHANGED, PipelineOptions::default())
        .run(&[path.clone()])
        .await;

    assert_eq!(oracle.audits(), 1);
    assert_eq!(summary.audit_calls, 1);
    assert_eq!(summary.decisions[&CascadeAction::AuditFailed], 1);
    assert_eq!(summary.regenerated, 3);
    assert!(summary.usage.audit.cost_usd > 0.0);

    let updated = fs::read_to_string(&path).unwrap();
    assert_eq!(description_of(&updated, "add").as_deref(), Some("Refreshed."));
    assert!(!updated.contains("Rejected quantities"));
}

#[tokio::test]
async fn test_audit_pass_keeps_doc() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "OrderBook.java", ORDER_BOOK);
    let oracle = ScriptedOracle::new("Verdict: ACCURATE", Some("/** Generated. */"));

    let summary = pipeline(oracle.clone(), ADD_CHANGED, PipelineOptions::default())
        .run(&[path.clone()])
        .await;

    assert_eq!(summary.decisions[&CascadeAction::AuditPassed], 1);
    assert_eq!(oracle.generations(), 2);
    let updated = fs::read_to_string(&path).unwrap();
    assert!(updated.contains("Rejected quantities leave the book unchanged."));
}

#[tokio::test]
async fn test_output_only_leaves_files_alone() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "OrderBook.java", ORDER_BOOK);
    let oracle = ScriptedOracle::new("ACCURATE", Some("/** Generated. */"));
    let options = PipelineOptions {
        output_only: true,
        ..Default::default()
    };

    let summary = pipeline(oracle, "", options).run(&[path.clone()]).await;

    assert_eq!(fs::read_to_string(&path).unwrap(), ORDER_BOOK);
    assert_eq!(summary.files_modified, 0);
    let generated: Vec<_> = summary.files[0]
        .candidates
        .iter()
        .filter_map(|c| c.generated.as_ref())
        .collect();
    assert_eq!(generated.len(), 2);
    assert_eq!(generated[0].documentation_text, "/** Generated. */");
}

#[tokio::test]
async fn test_force_bypasses_cascade() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "OrderBook.java", ORDER_BOOK);
    let oracle = ScriptedOracle::new("ACCURATE", Some("/**\n * Forced.\n */"));
    let options = PipelineOptions {
        force: true,
        ..Default::default()
    };

    let summary = pipeline(oracle.clone(), "", options).run(&[path.clone()]).await;

    assert_eq!(summary.decisions[&CascadeAction::Forced], 3);
    assert_eq!(oracle.audits(), 0);
    assert_eq!(oracle.generations(), 3);
    assert!(
        oracle
            .prompts
            .lock()
            .unwrap()
            .iter()
            .all(|p| !p.contains("EXISTING JAVADOC"))
    );

    let updated = fs::read_to_string(&path).unwrap();
    assert_eq!(description_of(&updated, "add").as_deref(), Some("Forced."));
}

#[tokio::test]
async fn test_failures_stay_local() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "OrderBook.java", ORDER_BOOK);
    let missing = dir.path().join("Missing.java");
    let oracle = ScriptedOracle::new("ACCURATE", None);

    let summary = pipeline(oracle.clone(), "", PipelineOptions::default())
        .run(&[missing, path.clone()])
        .await;

    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.files_failed, 1);
    assert!(summary.files[0].error.is_some());
    assert_eq!(summary.generation_failures, 2);
    assert_eq!(summary.regenerated, 0);
    assert_eq!(summary.files_modified, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), ORDER_BOOK);
}

#[tokio::test]
async fn test_unparseable_file_has_no_candidates() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "Broken.java", "public class Broken {\n    public void run( {\n}\n");
    let oracle = ScriptedOracle::new("ACCURATE", Some("/** Generated. */"));

    let summary = pipeline(oracle.clone(), "", PipelineOptions::default())
        .run(&[path])
        .await;

    assert_eq!(summary.files_failed, 0);
    assert_eq!(summary.candidates, 0);
    assert_eq!(oracle.generations(), 0);
}

#[tokio::test]
async fn test_plan_lists_candidates_without_oracle() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "OrderBook.java", ORDER_BOOK);

    let summary = plan(&[path], &EligibilityFilter::default()).await;

    let labels: Vec<&str> = summary.files[0]
        .candidates
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labels, vec!["class OrderBook", "method add", "method total"]);
    assert!(summary.files[0].candidates.iter().all(|c| c.decision.is_none()));
    assert_eq!(summary.usage.total_tokens(), 0);
}
