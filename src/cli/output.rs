//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
    /// Plain file paths or names, one per line
    Paths,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    /// Renders the wrapper as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Result of an `export` run.
#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub mode: String,
    pub paths: Vec<String>,
    /// Images extracted into the bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<usize>,
    /// Remote references embedded (single-file mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined: Option<usize>,
    /// Remote references left as-is (single-file mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

/// A saved deploy target in listing output. Never carries the password.
#[derive(Debug, Serialize)]
pub struct TargetListing {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub deploy_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub default: bool,
}
