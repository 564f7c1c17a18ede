//! WeaveDoc - Cost-Aware Javadoc Generator
//!
//! Documents public Java declarations with an LLM, spending oracle calls
//! only where existing documentation is missing, malformed or stale.
//!
//! ## Pipeline
//!
//! 1. **Parse**: tree-sitter declarations with their documentation blocks
//! 2. **Filter**: public, non-trivial, large enough to deserve documentation
//! 3. **Cascade**: structural check → scoped git diff → cheap audit
//! 4. **Generate**: expensive tier, one declaration at a time
//! 5. **Splice**: bottom-up rewrite of the source file
//!
//! ## Quick Start
//!
//! ```ignore
//! use weavedoc::{ConfigLoader, DocPipeline};
//!
//! let config = ConfigLoader::load()?;
//! let provider = weavedoc::ai::create_provider(&config.llm)?;
//! // build cascade and generator, then:
//! let summary = pipeline.run(&files).await;
//! println!("{}", summary.usage.display());
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: Java parsing, documentation blocks, file scanning
//! - [`eligibility`]: candidate selection
//! - [`cascade`]: regeneration decision stages
//! - [`ai`]: oracle providers, retry, pricing, prompts
//! - [`generator`]: generation invoker
//! - [`splicer`]: source rewriting
//! - [`pipeline`]: per-file orchestration and run summary

pub mod ai;
pub mod analyzer;
pub mod cascade;
pub mod cli;
pub mod config;
pub mod constants;
pub mod eligibility;
pub mod generator;
pub mod pipeline;
pub mod splicer;
pub mod types;
pub mod vcs;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, Result, WeaveError};

// Data Model
pub use types::{
    CascadeAction, CascadeDecision, DeclarationKind, DeclarationRecord, DocBlock, DocFields,
    GeneratedDoc, UsageRecord,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use cascade::RegenerationCascade;
pub use eligibility::EligibilityFilter;
pub use generator::DocGenerator;
pub use pipeline::{DocPipeline, PipelineOptions, RunSummary};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, SharedProvider, UsageLedger, with_timeout};

// =============================================================================
// Analyzer Re-exports
// =============================================================================

pub use analyzer::{FileScanner, JavaParser};
pub use vcs::{GitCli, VersionControl};
