//! Atomic writes of export artifacts.

use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::domain::{Bundle, ROOT_DOCUMENT_NAME, STYLESHEET_NAME, is_contained_path};
use crate::export::SourcePair;

/// Errors writing output files.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output already exists: {path} (use --force to overwrite)")]
    AlreadyExists { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bundle entry escapes the output directory: {entry}")]
    UnsafeEntryPath { entry: String },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl OutputError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => OutputError::PermissionDenied { path: path.into() },
            _ => OutputError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// Whether existing files may be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    #[default]
    Refuse,
    Allow,
}

/// Writes `contents` to `path` atomically, creating parent directories.
///
/// Uses a temporary file in the target directory and an atomic rename, so
/// readers never observe a partial file.
pub fn write_output(path: &Path, contents: &[u8], overwrite: Overwrite) -> Result<(), OutputError> {
    if overwrite == Overwrite::Refuse && path.exists() {
        return Err(OutputError::AlreadyExists { path: path.into() });
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| OutputError::from_io(parent, e))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| OutputError::from_io(path, e))?;
    temp.write_all(contents)
        .map_err(|e| OutputError::from_io(path, e))?;

    temp.persist(path).map_err(|e| OutputError::AtomicWrite {
        path: path.into(),
        source: e.error,
    })?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), OutputError> {
    if dir.exists() && !dir.is_dir() {
        return Err(OutputError::NotADirectory { path: dir.into() });
    }
    std::fs::create_dir_all(dir).map_err(|e| OutputError::from_io(dir, e))
}

/// Writes every bundle entry under `dir`. Returns the written paths.
///
/// Nothing is written if any entry path would land outside `dir`.
pub fn write_bundle_dir(
    dir: &Path,
    bundle: &Bundle,
    overwrite: Overwrite,
) -> Result<Vec<PathBuf>, OutputError> {
    let entries = bundle.entries();
    if let Some(entry) = entries.iter().find(|e| !is_contained_path(&e.path)) {
        return Err(OutputError::UnsafeEntryPath {
            entry: entry.path.clone(),
        });
    }

    ensure_dir(dir)?;
    entries
        .into_iter()
        .map(|entry| {
            let path = dir.join(&entry.path);
            write_output(&path, entry.contents, overwrite)?;
            Ok(path)
        })
        .collect()
}

/// Writes `index.html` and `styles.css` under `dir`. Returns the written paths.
pub fn write_source_pair(
    dir: &Path,
    pair: &SourcePair,
    overwrite: Overwrite,
) -> Result<Vec<PathBuf>, OutputError> {
    ensure_dir(dir)?;
    let document = dir.join(ROOT_DOCUMENT_NAME);
    let stylesheet = dir.join(STYLESHEET_NAME);
    write_output(&document, pair.document.as_bytes(), overwrite)?;
    write_output(&stylesheet, pair.stylesheet.as_bytes(), overwrite)?;
    Ok(vec![document, stylesheet])
}
