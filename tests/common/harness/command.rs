//! Fluent wrapper around assert_cmd::Command.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Fluent wrapper around `assert_cmd::Command` for the `pageship` binary.
///
/// Provides a builder-style API for constructing and executing CLI commands.
pub struct PageshipCommand {
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl PageshipCommand {
    /// Creates a new command for the `pageship` binary.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Sets the `--config` option to isolate from the user's config file.
    pub fn config(mut self, path: &Path) -> Self {
        self.args.push("--config".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Adds a path argument.
    pub fn path(self, path: &Path) -> Self {
        let path = path.to_string_lossy().to_string();
        self.args([path])
    }

    /// Sets an environment variable for the child process.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Returns the current arguments (for testing).
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("pageship").expect("Failed to find pageship binary");
        for key in [
            "PAGESHIP_API_URL",
            "PAGESHIP_TOKEN",
            "PAGESHIP_VPS_PASSWORD",
            "RUST_LOG",
        ] {
            cmd.env_remove(key);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd.args(&self.args);
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command, expects success, and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    /// Configures for the `format` command on a file.
    pub fn format(self, file: &Path) -> Self {
        self.args(["format"]).path(file)
    }

    /// Configures for the `export` command with markup, optional styles
    /// and an output path.
    pub fn export(self, markup: &Path, styles: Option<&Path>, output: &Path) -> Self {
        let cmd = self.args(["export", "--markup"]).path(markup);
        let cmd = match styles {
            Some(styles) => cmd.args(["--styles"]).path(styles),
            None => cmd,
        };
        cmd.args(["--output"]).path(output)
    }

    /// Configures for the `deploy` command with markup and optional styles.
    pub fn deploy(self, markup: &Path, styles: Option<&Path>) -> Self {
        let cmd = self.args(["deploy", "--markup"]).path(markup);
        match styles {
            Some(styles) => cmd.args(["--styles"]).path(styles),
            None => cmd,
        }
    }

    /// Configures for the `targets` command.
    pub fn targets(self) -> Self {
        self.args(["targets"])
    }

    /// Adds `--mode <mode>` to an export command.
    pub fn mode(self, mode: &str) -> Self {
        self.args(["--mode", mode])
    }

    // ===========================================
    // Format Options
    // ===========================================

    /// Adds `--format json` to the command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }

    /// Adds `--format paths` to the command.
    pub fn format_paths(self) -> Self {
        self.args(["--format", "paths"])
    }
}

impl Default for PageshipCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_runs_binary() {
        PageshipCommand::new().args(["--help"]).assert().success();
    }

    #[test]
    fn test_command_with_config() {
        let temp = TempDir::new().unwrap();
        let cmd = PageshipCommand::new().config(temp.path());
        let args = cmd.get_args();
        assert_eq!(args[0], "--config");
        assert_eq!(args[1], temp.path().to_string_lossy());
    }

    #[test]
    fn test_command_output_success() {
        let output = PageshipCommand::new().args(["--help"]).output_success();
        assert!(output.contains("pageship"));
    }

    #[test]
    fn test_command_shortcuts() {
        let cmd = PageshipCommand::new().targets().format_json();
        let args = cmd.get_args();
        assert!(args.contains(&"targets".to_string()));
        assert!(args.contains(&"--format".to_string()));
        assert!(args.contains(&"json".to_string()));
    }
}
