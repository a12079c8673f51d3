//! Handler for the `export` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::config::Config;
use crate::cli::output::{ExportSummary, Output, OutputFormat};
use crate::cli::{ExportArgs, ExportMode};
use crate::domain::ROOT_DOCUMENT_NAME;
use crate::export::{
    HttpFetcher, InlineOptions, SITE_ARCHIVE_NAME, SOURCE_ARCHIVE_NAME, build_site_archive,
    build_source_archive, pipeline,
};
use crate::infra::{Overwrite, write_bundle_dir, write_output, write_source_pair};

use super::{document_shell, file_source};

/// Resolves the file an archive or single document is written to.
///
/// Treat `output` as a directory if it already is one or ends with `/`.
pub(crate) fn output_file(output: &Path, default_name: &str) -> PathBuf {
    let is_dir = output.is_dir() || output.to_string_lossy().ends_with('/');
    if is_dir {
        output.join(default_name)
    } else {
        output.to_path_buf()
    }
}

fn mode_name(mode: ExportMode) -> &'static str {
    match mode {
        ExportMode::Files => "files",
        ExportMode::Archive => "archive",
        ExportMode::Bundle => "bundle",
        ExportMode::BundleArchive => "bundle-archive",
        ExportMode::SingleFile => "single-file",
    }
}

/// Handle the `export` command.
pub async fn handle_export(args: &ExportArgs, config: &Config) -> Result<()> {
    let source = file_source(&args.source);
    let shell = document_shell(&args.source)?;
    let overwrite = if args.force {
        Overwrite::Allow
    } else {
        Overwrite::Refuse
    };

    let mut summary = ExportSummary {
        mode: mode_name(args.mode).to_string(),
        paths: Vec::new(),
        assets: None,
        inlined: None,
        unresolved: Vec::new(),
    };

    let written: Vec<PathBuf> = match args.mode {
        ExportMode::Files => {
            let prepared = pipeline::source_pair(&source, &shell)?;
            prepared.deliver(|pair| write_source_pair(&args.output, &pair, overwrite))?
        }
        ExportMode::Archive => {
            let path = output_file(&args.output, SOURCE_ARCHIVE_NAME);
            let prepared = pipeline::source_pair(&source, &shell)?;
            prepared.deliver(|pair| -> Result<Vec<PathBuf>> {
                let bytes = build_source_archive(&pair)?;
                write_output(&path, &bytes, overwrite)?;
                Ok(vec![path.clone()])
            })?
        }
        ExportMode::Bundle => {
            let prepared = pipeline::site_bundle(&source, &shell)?;
            summary.assets = Some(prepared.artifact().assets().len());
            prepared.deliver(|bundle| write_bundle_dir(&args.output, &bundle, overwrite))?
        }
        ExportMode::BundleArchive => {
            let path = output_file(&args.output, SITE_ARCHIVE_NAME);
            let prepared = pipeline::site_bundle(&source, &shell)?;
            summary.assets = Some(prepared.artifact().assets().len());
            prepared.deliver(|bundle| -> Result<Vec<PathBuf>> {
                let bytes = build_site_archive(&bundle)?;
                write_output(&path, &bytes, overwrite)?;
                Ok(vec![path.clone()])
            })?
        }
        ExportMode::SingleFile => {
            let path = output_file(&args.output, ROOT_DOCUMENT_NAME);
            let fetcher =
                HttpFetcher::new(config.inline.into()).context("failed to build HTTP client")?;
            let options = InlineOptions {
                base_url: args.base_url.clone(),
            };
            let prepared = pipeline::single_file(&source, &fetcher, &options, &shell).await?;

            let single = prepared.artifact();
            summary.inlined = Some(single.inlined);
            summary.unresolved = single
                .failures
                .iter()
                .map(|f| f.reference.clone())
                .collect();

            prepared.deliver(|single| -> Result<Vec<PathBuf>> {
                write_output(&path, single.document.as_bytes(), overwrite)?;
                Ok(vec![path.clone()])
            })?
        }
    };

    summary.paths = written.iter().map(|p| p.display().to_string()).collect();
    print_summary(args.format, &summary)
}

/// Print the result in the requested format.
fn print_summary(format: OutputFormat, summary: &ExportSummary) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!("Exported {} ({} files)", summary.mode, summary.paths.len());
            for path in &summary.paths {
                println!("  {}", path);
            }
            if let Some(assets) = summary.assets {
                println!("Extracted {} images", assets);
            }
            if let Some(inlined) = summary.inlined {
                println!("Inlined {} remote resources", inlined);
            }
            if !summary.unresolved.is_empty() {
                eprintln!(
                    "warning: {} remote references could not be inlined:",
                    summary.unresolved.len()
                );
                for reference in &summary.unresolved {
                    eprintln!("  {}", reference);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", Output::new(summary).to_json()?);
        }
        OutputFormat::Paths => {
            for path in &summary.paths {
                println!("{}", path);
            }
        }
    }
    Ok(())
}
