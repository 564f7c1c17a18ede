//! Global Constants
//!
//! Centralized constants for policy thresholds and tuning.
//! Configurable values here are defaults; `config` may override them.

/// Candidate selection thresholds
pub mod eligibility {
    /// Type declarations in files shorter than this are not documented
    pub const MIN_FILE_LINES: usize = 30;

    /// Callables spanning fewer lines than this are not documented
    pub const MIN_METHOD_LINES: usize = 10;

    /// Share of null assignments that makes a body trivial
    pub const NULL_ASSIGNMENT_RATIO: f64 = 0.5;

    /// Share of logging/printing statements that makes a body trivial
    pub const LOGGING_RATIO: f64 = 0.8;

    /// Annotations marking test setup and teardown methods
    pub const LIFECYCLE_ANNOTATIONS: &[&str] = &[
        "Before",
        "BeforeEach",
        "BeforeAll",
        "BeforeClass",
        "After",
        "AfterEach",
        "AfterAll",
        "AfterClass",
    ];
}

/// Structural quality checks on existing documentation
pub mod quality {
    /// Minimum number of description lines
    pub const MIN_DESCRIPTION_LINES: usize = 2;

    /// Longest allowed documentation line
    pub const MAX_LINE_LENGTH: usize = 120;

    /// Shortest acceptable `@return` description
    pub const MIN_RETURN_DESCRIPTION: usize = 5;

    /// Case-insensitive markers of unfinished documentation
    pub const PLACEHOLDERS: &[&str] = &["todo", "fixme", "xxx", "hack", "temporary", "placeholder"];
}

/// Source rewriting
pub mod splice {
    /// Lines searched after a declaration start for its opening brace
    pub const BRACE_LOOKAHEAD: usize = 10;

    /// One indentation level
    pub const INDENT_UNIT: &str = "    ";

    /// First line of an implementation notes block
    pub const NOTES_MARKER: &str = "AI Implementation Notes:";
}

/// Model tiers and pricing
pub mod models {
    /// Expensive tier used for generation
    pub const GENERATION_MODEL: &str = "claude-opus-4-1-20250805";

    /// Cheap tier used for the audit stage
    pub const AUDIT_MODEL: &str = "claude-3-5-haiku-20241022";

    /// Output budget for generation requests
    pub const GENERATION_MAX_TOKENS: u32 = 5000;

    /// Output budget for audit requests
    pub const AUDIT_MAX_TOKENS: u32 = 1024;

    /// USD per input token, generation tier
    pub const GENERATION_INPUT_RATE: f64 = 0.000_015;

    /// USD per output token, generation tier
    pub const GENERATION_OUTPUT_RATE: f64 = 0.000_075;

    /// USD per input token, audit tier
    pub const AUDIT_INPUT_RATE: f64 = 0.000_001;

    /// USD per output token, audit tier
    pub const AUDIT_OUTPUT_RATE: f64 = 0.000_005;
}

/// Retry policy for oracle calls
pub mod retry {
    /// Default retries after the first attempt
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// HTTP/Network constants
pub mod network {
    /// Default oracle request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Default version-control command timeout (seconds)
    pub const VCS_TIMEOUT_SECS: u64 = 30;

    /// Anthropic Messages API base URL
    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

    /// Anthropic API version header value
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
}

/// Version-control defaults
pub mod vcs {
    /// Revision the cascade diffs against
    pub const DIFF_BASE: &str = "HEAD~1";

    /// Revision the cascade diffs to
    pub const DIFF_HEAD: &str = "HEAD";

    /// Branch changed-file discovery compares with
    pub const BASE_REF: &str = "main";

    /// Remote holding the base branch
    pub const REMOTE: &str = "origin";
}
