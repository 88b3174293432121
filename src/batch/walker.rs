use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;

use crate::error::{EmitsError, Result};
use crate::syntax::SyntaxRegistry;

/// Finds the files a batch build should process.
///
/// Honors `.gitignore` and hidden-file rules. Without include patterns only
/// files with a known comment preset are returned; with them, only files
/// whose path relative to the walk root matches one of the patterns.
pub struct FileWalker {
    registry: SyntaxRegistry,
    include: Vec<Pattern>,
}

impl FileWalker {
    pub fn new(registry: SyntaxRegistry) -> Self {
        Self {
            registry,
            include: Vec::new(),
        }
    }

    pub fn with_include(mut self, patterns: &[String]) -> Result<Self> {
        let mut errors = Vec::new();
        for pattern in patterns {
            match Pattern::new(pattern) {
                Ok(p) => self.include.push(p),
                Err(e) => errors.push(format!("{:?}: {}", pattern, e)),
            }
        }
        if !errors.is_empty() {
            return Err(EmitsError::Config(format!(
                "Invalid include pattern: {}",
                errors.join(", ")
            )));
        }
        Ok(self)
    }

    /// Walks `root`; a file root is returned as-is
    pub fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }
        if !root.exists() {
            return Err(EmitsError::Input {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            });
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path.is_file() && self.accepts(root, path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn accepts(&self, root: &Path, path: &Path) -> bool {
        if self.include.is_empty() {
            return self.is_supported(path);
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.include.iter().any(|p| p.matches_path(relative))
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.registry.is_supported(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_walker() -> FileWalker {
        FileWalker::new(SyntaxRegistry::new())
    }

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_walk_finds_supported_files_recursively() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "main.rs", "// main");
        create_file(temp_dir.path(), "src/deep/util.py", "# util");
        create_file(temp_dir.path(), "notes.txt", "plain");

        let files = create_walker().walk(temp_dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.ends_with("notes.txt")));
    }

    #[test]
    fn test_walk_results_are_sorted() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "b.rs", "");
        create_file(temp_dir.path(), "a.rs", "");
        create_file(temp_dir.path(), "c/a.rs", "");

        let files = create_walker().walk(temp_dir.path()).unwrap();

        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_walk_single_file() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "notes.txt", "// any file works");
        let path = temp_dir.path().join("notes.txt");

        let files = create_walker().walk(&path).unwrap();

        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_walk_missing_root() {
        let err = create_walker()
            .walk(Path::new("/nonexistent/emits-root"))
            .unwrap_err();
        assert!(matches!(err, EmitsError::Input { .. }));
    }

    #[test]
    fn test_include_patterns_override_registry() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "docs/guide.txt", "// guide");
        create_file(temp_dir.path(), "src/main.rs", "// main");

        let walker = create_walker()
            .with_include(&["docs/*.txt".to_string()])
            .unwrap();
        let files = walker.walk(temp_dir.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("docs/guide.txt"));
    }

    #[test]
    fn test_invalid_include_pattern() {
        let err = create_walker()
            .with_include(&["[".to_string()])
            .err()
            .unwrap();
        assert!(matches!(err, EmitsError::Config(_)));
    }

    #[test]
    fn test_walk_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = create_walker().walk(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }
}
