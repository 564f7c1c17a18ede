//! Code Analyzer Module
//!
//! Source-level analysis for Java files:
//! - Structural parsing into declaration records (tree-sitter)
//! - Documentation comment location and field parsing
//! - Body statement classification and exception hints
//! - File scanning with gitignore support

pub mod body;
pub mod java;
pub mod javadoc;
pub mod scanner;

pub use java::JavaParser;
pub use javadoc::{locate_doc_block, parse_doc_fields};
pub use scanner::{FileScanner, is_java_file};
