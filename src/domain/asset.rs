//! Binary assets externalized from markup.

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path};

/// Directory under which extracted assets live, relative to the root document.
pub const ASSET_DIR: &str = "images";

/// Whether `path` stays inside the directory it is joined onto.
///
/// Only plain relative components are accepted: no `..`, no root, no drive
/// prefix, and no backslash separators that another platform would split on.
///
/// ```
/// use pageship::domain::is_contained_path;
///
/// assert!(is_contained_path("images/image1.png"));
/// assert!(!is_contained_path("images/image1.x/../../escaped"));
/// assert!(!is_contained_path("/etc/passwd"));
/// ```
pub fn is_contained_path(path: &str) -> bool {
    !path.is_empty()
        && !path.contains('\\')
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// A binary payload lifted out of an embedded reference.
///
/// Created once during extraction and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtractedAsset {
    relative_path: String,
    bytes: Vec<u8>,
    mime_subtype: String,
}

impl ExtractedAsset {
    pub fn new(
        relative_path: impl Into<String>,
        bytes: Vec<u8>,
        mime_subtype: impl Into<String>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            bytes,
            mime_subtype: mime_subtype.into(),
        }
    }

    /// Path relative to the root document, e.g. `images/image1.png`.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The `<subtype>` of the original `image/<subtype>` media type.
    pub fn mime_subtype(&self) -> &str {
        &self.mime_subtype
    }

    /// File name inside the asset directory (the path without `images/`).
    pub fn file_name(&self) -> &str {
        self.relative_path
            .strip_prefix(ASSET_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(&self.relative_path)
    }
}

impl fmt::Debug for ExtractedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractedAsset")
            .field("relative_path", &self.relative_path)
            .field("len", &self.bytes.len())
            .field("mime_subtype", &self.mime_subtype)
            .finish()
    }
}

/// Error returned when inserting an asset under a path that is already taken.
#[derive(Debug, Clone)]
pub struct DuplicateAssetPath(String);

impl fmt::Display for DuplicateAssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset path already present: {}", self.0)
    }
}

impl std::error::Error for DuplicateAssetPath {}

/// Ordered mapping from unique relative path to asset.
///
/// Iteration order is insertion order, which the extractor makes equal to
/// the order of first appearance in the source markup.
///
/// # Examples
///
/// ```
/// use pageship::domain::{AssetMap, ExtractedAsset};
///
/// let mut assets = AssetMap::new();
/// assets.insert(ExtractedAsset::new("images/image1.png", vec![0; 16], "png")).unwrap();
/// assert!(assets.contains("images/image1.png"));
/// assert!(assets.insert(ExtractedAsset::new("images/image1.png", vec![], "png")).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetMap {
    entries: Vec<ExtractedAsset>,
    index: HashMap<String, usize>,
}

impl AssetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an asset, rejecting a path that is already present.
    pub fn insert(&mut self, asset: ExtractedAsset) -> Result<(), DuplicateAssetPath> {
        if self.contains(asset.relative_path()) {
            return Err(DuplicateAssetPath(asset.relative_path));
        }
        self.index
            .insert(asset.relative_path.clone(), self.entries.len());
        self.entries.push(asset);
        Ok(())
    }

    pub fn get(&self, relative_path: &str) -> Option<&ExtractedAsset> {
        self.index
            .get(relative_path)
            .map(|&position| &self.entries[position])
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.index.contains_key(relative_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relative paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|a| a.relative_path())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractedAsset> {
        self.entries.iter()
    }

    /// Total decoded size of all assets in bytes.
    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|a| a.bytes().len()).sum()
    }
}

impl<'a> IntoIterator for &'a AssetMap {
    type Item = &'a ExtractedAsset;
    type IntoIter = std::slice::Iter<'a, ExtractedAsset>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
