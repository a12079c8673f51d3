//! Builder for test pages with sensible defaults.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Builder for creating test pages.
///
/// Collects body elements in order and renders them inside a `<main>`
/// element with no whitespace, the way an editor serializes a page.
#[derive(Debug, Default)]
pub struct TestPage {
    elements: Vec<String>,
    styles: String,
}

impl TestPage {
    /// Creates an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a paragraph.
    pub fn paragraph(mut self, text: &str) -> Self {
        self.elements.push(format!("<p>{text}</p>"));
        self
    }

    /// Adds an image with an embedded payload of `len` bytes.
    pub fn embedded_image(mut self, subtype: &str, len: usize) -> Self {
        let payload = STANDARD.encode(vec![0xAB; len]);
        self.elements
            .push(format!(r#"<img src="data:image/{subtype};base64,{payload}">"#));
        self
    }

    /// Adds an image pointing at a URL.
    pub fn remote_image(mut self, url: &str) -> Self {
        self.elements.push(format!(r#"<img src="{url}">"#));
        self
    }

    /// Adds raw markup.
    pub fn raw(mut self, markup: &str) -> Self {
        self.elements.push(markup.to_string());
        self
    }

    /// Sets the stylesheet text.
    pub fn styles(mut self, styles: &str) -> Self {
        self.styles = styles.to_string();
        self
    }

    /// Returns the stylesheet text.
    pub fn get_styles(&self) -> &str {
        &self.styles
    }

    /// Renders the serialized markup.
    pub fn markup(&self) -> String {
        format!("<main>{}</main>", self.elements.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = TestPage::new();
        assert_eq!(page.markup(), "<main></main>");
        assert_eq!(page.get_styles(), "");
    }

    #[test]
    fn test_page_embedded_image() {
        let page = TestPage::new().embedded_image("png", 12);
        assert!(page.markup().starts_with(r#"<main><img src="data:image/png;base64,"#));
    }
}
