//! Zip packaging of bundles and source pairs.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::preview::SourcePair;
use crate::domain::{Bundle, ROOT_DOCUMENT_NAME, STYLESHEET_NAME, is_contained_path};

/// File name of a packaged deploy bundle.
pub const SITE_ARCHIVE_NAME: &str = "site.zip";

/// File name of a packaged source pair.
pub const SOURCE_ARCHIVE_NAME: &str = "export.zip";

/// Errors building an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive entry escapes the archive root: {0}")]
    UnsafeEntryPath(String),
}

fn write_archive<'a, I>(entries: I) -> Result<Vec<u8>, ArchiveError>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (path, contents) in entries {
        if !is_contained_path(path) {
            return Err(ArchiveError::UnsafeEntryPath(path.to_string()));
        }
        writer.start_file(path, options)?;
        writer.write_all(contents)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Packages a bundle: `index.html`, `styles.css` when non-empty, and
/// `images/<file>` per asset.
pub fn build_site_archive(bundle: &Bundle) -> Result<Vec<u8>, ArchiveError> {
    let entries = bundle.entries();
    let bytes = write_archive(entries.iter().map(|e| (e.path.as_str(), e.contents)))?;
    tracing::debug!(entries = entries.len(), bytes = bytes.len(), "built site archive");
    Ok(bytes)
}

/// Packages a formatted source pair as `index.html` + `styles.css`.
pub fn build_source_archive(pair: &SourcePair) -> Result<Vec<u8>, ArchiveError> {
    write_archive([
        (ROOT_DOCUMENT_NAME, pair.document.as_bytes()),
        (STYLESHEET_NAME, pair.stylesheet.as_bytes()),
    ])
}
