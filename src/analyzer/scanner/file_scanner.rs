use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::types::Result;

/// Files above this size are not documentation targets (1MB)
const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

const JAVA_EXTENSION: &str = "java";

/// Build output and tooling directories never worth scanning
const DEFAULT_SKIP_DIRS: &[&str] = &["target", "build", ".git", ".gradle", "out", "node_modules"];

pub fn is_java_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(JAVA_EXTENSION)
}

/// Collects Java sources under a root, honoring `.gitignore`
pub struct FileScanner {
    root: PathBuf,
    exclude: Vec<glob::Pattern>,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let exclude = DEFAULT_SKIP_DIRS
            .iter()
            .filter_map(|d| glob::Pattern::new(&format!("**/{}/**", d)).ok())
            .collect();
        Self {
            root: root.as_ref().to_path_buf(),
            exclude,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Add glob exclusions; invalid patterns are logged and ignored
    pub fn with_exclude(mut self, patterns: &[String]) -> Self {
        for pattern in patterns {
            match glob::Pattern::new(pattern) {
                Ok(p) => self.exclude.push(p),
                Err(e) => tracing::warn!("Ignoring exclude pattern '{}': {}", pattern, e),
            }
        }
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Java files under the root, sorted for stable processing order
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(if is_java_file(&self.root) {
                vec![self.root.clone()]
            } else {
                Vec::new()
            });
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if !path.is_file() || !is_java_file(path) || self.should_exclude(path) {
                continue;
            }
            if path.metadata().map(|m| m.len() > self.max_file_size).unwrap_or(true) {
                tracing::debug!("Skipping oversized file: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        tracing::debug!("Scanned {} Java files under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative.to_string_lossy();
        self.exclude.iter().any(|p| p.matches(&path_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class A {}\n").unwrap();
    }

    #[test]
    fn test_scan_collects_java_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/main/java/A.java");
        touch(dir.path(), "src/main/java/b/B.java");
        touch(dir.path(), "README.md");
        touch(dir.path(), "build/generated/C.java");

        let files = FileScanner::new(dir.path()).scan().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.java", "B.java"]);
    }

    #[test]
    fn test_custom_exclude() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/A.java");
        touch(dir.path(), "src/test/ATest.java");

        let files = FileScanner::new(dir.path())
            .with_exclude(&["src/test/**".to_string()])
            .scan()
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/A.java"));
    }

    #[test]
    fn test_single_file_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "A.java");
        touch(dir.path(), "notes.txt");

        assert_eq!(FileScanner::new(dir.path().join("A.java")).scan().unwrap().len(), 1);
        assert!(FileScanner::new(dir.path().join("notes.txt")).scan().unwrap().is_empty());
    }
}
