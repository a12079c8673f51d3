//! Document snapshots pulled from the authoring surface.

use std::fmt;

/// Narrow capability exposed by whatever holds the page being edited.
///
/// Exactly two synchronous pulls: the serialized markup and the serialized
/// stylesheet. Nothing else about the authoring surface is visible here.
pub trait DocumentProvider {
    /// Error raised when the provider cannot produce its text.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the current serialized markup.
    fn serialized_markup(&self) -> Result<String, Self::Error>;

    /// Returns the current serialized stylesheet text.
    fn serialized_styles(&self) -> Result<String, Self::Error>;
}

/// An immutable snapshot of markup and stylesheet text.
///
/// Pulled fresh for every export or deploy action; never cached or diffed.
///
/// # Example
///
/// ```
/// use pageship::domain::DocumentSource;
///
/// let source = DocumentSource::new("<p>Hi</p>", "p{color:red}");
/// assert_eq!(source.markup(), "<p>Hi</p>");
/// assert!(source.has_styles());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentSource {
    markup: String,
    styles: String,
}

impl DocumentSource {
    /// Creates a snapshot from already-serialized text.
    pub fn new(markup: impl Into<String>, styles: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            styles: styles.into(),
        }
    }

    /// Pulls both texts from a provider, markup first.
    pub fn snapshot<P: DocumentProvider>(provider: &P) -> Result<Self, P::Error> {
        let markup = provider.serialized_markup()?;
        let styles = provider.serialized_styles()?;
        Ok(Self { markup, styles })
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn styles(&self) -> &str {
        &self.styles
    }

    /// Returns true if the stylesheet contains anything besides whitespace.
    pub fn has_styles(&self) -> bool {
        !self.styles.trim().is_empty()
    }

    /// Splits the snapshot into its owned parts.
    pub fn into_parts(self) -> (String, String) {
        (self.markup, self.styles)
    }
}

impl fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Markup may carry megabytes of embedded image data.
        f.debug_struct("DocumentSource")
            .field("markup_len", &self.markup.len())
            .field("styles_len", &self.styles.len())
            .finish()
    }
}
