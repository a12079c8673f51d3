//! The transient root document + stylesheet + assets triple.

use super::asset::{ASSET_DIR, AssetMap};

/// Archive/file name of the root document.
pub const ROOT_DOCUMENT_NAME: &str = "index.html";

/// Archive/file name of the stylesheet.
pub const STYLESHEET_NAME: &str = "styles.css";

/// A self-describing package ready for delivery.
///
/// Constructed fresh for each export or deploy action and consumed by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    root_document: String,
    stylesheet: String,
    assets: AssetMap,
}

/// A single file inside a bundle, addressed by its path within the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry<'a> {
    pub path: String,
    pub contents: &'a [u8],
}

impl Bundle {
    pub fn new(root_document: String, stylesheet: String, assets: AssetMap) -> Self {
        Self {
            root_document,
            stylesheet,
            assets,
        }
    }

    pub fn root_document(&self) -> &str {
        &self.root_document
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    pub fn assets(&self) -> &AssetMap {
        &self.assets
    }

    /// Returns true if the stylesheet is worth shipping as its own file.
    pub fn has_stylesheet(&self) -> bool {
        !self.stylesheet.trim().is_empty()
    }

    /// Lists every file of the package in delivery order: root document,
    /// stylesheet (when non-empty), then `images/<file>` per asset.
    pub fn entries(&self) -> Vec<BundleEntry<'_>> {
        let mut entries = Vec::with_capacity(self.assets.len() + 2);
        entries.push(BundleEntry {
            path: ROOT_DOCUMENT_NAME.to_string(),
            contents: self.root_document.as_bytes(),
        });
        if self.has_stylesheet() {
            entries.push(BundleEntry {
                path: STYLESHEET_NAME.to_string(),
                contents: self.stylesheet.as_bytes(),
            });
        }
        for asset in &self.assets {
            entries.push(BundleEntry {
                path: format!("{}/{}", ASSET_DIR, asset.file_name()),
                contents: asset.bytes(),
            });
        }
        entries
    }
}
