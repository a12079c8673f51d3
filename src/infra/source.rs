//! File-backed document provider.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::DocumentProvider;

/// Errors reading markup or stylesheet files.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid encoding in {path}: {encoding}")]
    InvalidEncoding { path: PathBuf, encoding: String },
}

impl SourceError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => SourceError::PermissionDenied { path: path.into() },
            _ => SourceError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// Reads a UTF-8 text file, dropping a leading byte order mark.
///
/// # Errors
///
/// Returns `SourceError::NotFound` if the file doesn't exist.
/// Returns `SourceError::InvalidEncoding` for UTF-16 input or invalid UTF-8.
pub fn read_text(path: &Path) -> Result<String, SourceError> {
    let bytes = std::fs::read(path).map_err(|e| SourceError::from_io(path, e))?;
    decode_text(bytes, path)
}

fn decode_text(bytes: Vec<u8>, path: &Path) -> Result<String, SourceError> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(SourceError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 LE detected (byte order mark FF FE); convert to UTF-8".into(),
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(SourceError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 BE detected (byte order mark FE FF); convert to UTF-8".into(),
        });
    }

    let content = String::from_utf8(bytes).map_err(|e| SourceError::InvalidEncoding {
        path: path.into(),
        encoding: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;

    match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => Ok(stripped.to_string()),
        None => Ok(content),
    }
}

/// Markup and an optional stylesheet read from disk on every pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    markup: PathBuf,
    styles: Option<PathBuf>,
}

impl FileSource {
    pub fn new(markup: impl Into<PathBuf>, styles: Option<PathBuf>) -> Self {
        Self {
            markup: markup.into(),
            styles,
        }
    }

    pub fn markup_path(&self) -> &Path {
        &self.markup
    }

    pub fn styles_path(&self) -> Option<&Path> {
        self.styles.as_deref()
    }
}

impl DocumentProvider for FileSource {
    type Error = SourceError;

    fn serialized_markup(&self) -> Result<String, Self::Error> {
        read_text(&self.markup)
    }

    /// Without a stylesheet path the document has no styles.
    fn serialized_styles(&self) -> Result<String, Self::Error> {
        match &self.styles {
            Some(path) => read_text(path),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentSource;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn reads_markup_and_styles() {
        let dir = TempDir::new().unwrap();
        let markup = dir.path().join("page.html");
        let styles = dir.path().join("page.css");
        std::fs::write(&markup, "<p>Hi</p>").unwrap();
        std::fs::write(&styles, "p{color:red}").unwrap();

        let source = FileSource::new(&markup, Some(styles));
        let snapshot = DocumentSource::snapshot(&source).unwrap();

        assert_eq!(snapshot.markup(), "<p>Hi</p>");
        assert_eq!(snapshot.styles(), "p{color:red}");
    }

    #[test]
    fn missing_styles_path_means_empty() {
        let dir = TempDir::new().unwrap();
        let markup = dir.path().join("page.html");
        std::fs::write(&markup, "<p>Hi</p>").unwrap();

        let source = FileSource::new(&markup, None);
        assert_eq!(source.serialized_styles().unwrap(), "");
    }

    #[test]
    fn strips_utf8_bom() {
        let text = decode_text(b"\xEF\xBB\xBF<p>x</p>".to_vec(), Path::new("a.html")).unwrap();
        assert_eq!(text, "<p>x</p>");
    }

    #[test]
    fn rejects_utf16() {
        let err = decode_text(vec![0xFF, 0xFE, b'<', 0], Path::new("a.html")).unwrap_err();
        assert!(err.to_string().contains("UTF-16 LE"));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = decode_text(vec![b'<', 0xC3, 0x28], Path::new("a.html")).unwrap_err();
        assert!(matches!(err, SourceError::InvalidEncoding { .. }));
        assert!(err.to_string().contains("byte 1"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_text(Path::new("/nonexistent/page.html")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }
}
