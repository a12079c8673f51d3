//! Command handlers for the CLI.

mod deploy;
mod export;
mod format;
mod targets;

use std::io;

use anyhow::Result;
use clap::CommandFactory;

use super::{Cli, CompletionsArgs, SourceArgs};
use crate::export::DocumentShell;
use crate::infra::FileSource;

// Re-export public items
pub use deploy::{handle_deploy, resolve_target};
pub use export::handle_export;
pub use format::{format_source, handle_format, infer_lang};
pub use targets::{handle_targets, target_listings};

// ===========================================
// Shared Utilities
// ===========================================

/// Builds the document provider for a page given on the command line.
pub(crate) fn file_source(source: &SourceArgs) -> FileSource {
    FileSource::new(&source.markup, source.styles.clone())
}

/// Builds the document shell from `--title`, `--page-lang` and `--template`.
pub(crate) fn document_shell(source: &SourceArgs) -> Result<DocumentShell> {
    let mut shell = DocumentShell::default();
    if let Some(title) = &source.title {
        shell = shell.with_title(title);
    }
    if let Some(lang) = &source.page_lang {
        shell = shell.with_lang(lang);
    }
    if let Some(template) = &source.template {
        shell = shell.with_template_file(template)?;
    }
    Ok(shell)
}

/// Handle the `completions` command.
pub fn handle_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(args.shell, &mut cmd, name, &mut io::stdout());
}
