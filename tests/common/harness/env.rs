//! Isolated test environment with temp directory.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

use super::{PageshipCommand, TestPage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with a temporary working directory.
///
/// Creates a temp directory that is automatically cleaned up on drop, with
/// an empty config file so the user's own config never leaks into tests.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    /// Path to the working directory
    root: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        std::fs::write(root.join("config.toml"), "").expect("Failed to write config");
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Returns the path to the working directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the config file passed to every command.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Replaces the config file contents.
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config_path(), content).expect("Failed to write config");
    }

    /// Returns a path inside the environment (not created).
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Writes a page's markup and stylesheet, returning both paths.
    pub fn add_page(&self, name: &str, page: &TestPage) -> (PathBuf, PathBuf) {
        let markup = self.write_file(&format!("{name}.html"), &page.markup());
        let styles = self.write_file(&format!("{name}.css"), page.get_styles());
        (markup, styles)
    }

    /// Creates a PageshipCommand configured for this test environment.
    pub fn cmd(&self) -> PageshipCommand {
        PageshipCommand::new().config(&self.config_path())
    }

    /// Writes a file to the test environment and returns its path.
    ///
    /// Useful for creating custom templates, CSS files, etc.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Reads a file produced by a command.
    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_creates_temp_directory() {
        let env = TestEnv::new();
        assert!(env.root().is_dir(), "root should be a directory");
        assert!(env.config_path().is_file(), "config file should exist");
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.root().to_path_buf()
        };
        assert!(
            !path.exists(),
            "temp directory should be cleaned up on drop"
        );
    }

    #[test]
    fn test_env_add_page() {
        let env = TestEnv::new();
        let page = TestPage::new().paragraph("Hello").styles("p{color:red}");
        let (markup, styles) = env.add_page("index", &page);

        assert_eq!(env.read(&markup), "<main><p>Hello</p></main>");
        assert_eq!(env.read(&styles), "p{color:red}");
    }
}
