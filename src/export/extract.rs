//! Externalizing embedded images into standalone asset files.
//!
//! Works on tag boundaries with pattern matching rather than a parsed tree,
//! and only looks at `<img>` tags. Every image is handled on its own: a
//! corrupt payload leaves that one tag untouched and never stops the pass.

use std::sync::LazyLock;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::{Captures, Regex};
use thiserror::Error;

use crate::domain::{ASSET_DIR, AssetMap, ExtractedAsset, is_contained_path};

/// Decoded payloads shorter than this are treated as placeholders.
pub const MIN_ASSET_BYTES: usize = 10;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\s[^>]*>").expect("img tag pattern is valid"));

static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("src attribute pattern is valid")
});

static EMBEDDED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*data:image/([^;,\s]+);([^,]+),(.*)$")
        .expect("embedded image pattern is valid")
});

/// Subtypes that are safe to use as a file extension.
static SUBTYPE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.+-]*$").expect("subtype token pattern is valid")
});

/// Accepts payloads with or without trailing `=` padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why an embedded image was left in place.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("embedded image has an empty payload")]
    EmptyPayload,

    #[error("image subtype '{0}' is not a plain token")]
    InvalidSubtype(String),

    #[error("unsupported payload encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("payload decodes to {0} bytes, below the {MIN_ASSET_BYTES}-byte minimum")]
    TooSmall(usize),
}

/// An embedded image that failed validation, by document order.
#[derive(Debug)]
pub struct SkippedImage {
    /// 1-based position among all `<img>` tags in the markup.
    pub tag_index: usize,
    pub error: DecodeError,
}

/// Result of an extraction pass.
#[derive(Debug)]
pub struct Extraction {
    /// Markup with every extracted image pointing at its asset path.
    pub markup: String,
    /// Assets in order of first appearance.
    pub assets: AssetMap,
    /// Embedded images left untouched.
    pub skipped: Vec<SkippedImage>,
}

impl Extraction {
    pub fn into_parts(self) -> (String, AssetMap) {
        (self.markup, self.assets)
    }
}

/// A validated embedded image.
struct EmbeddedImage {
    subtype: String,
    bytes: Vec<u8>,
}

/// Decodes a `data:image/<subtype>;base64,<payload>` reference.
///
/// Returns `Ok(None)` when the value is not an embedded image reference at
/// all, so ordinary paths and URLs pass through silently.
fn decode_embedded(value: &str) -> Result<Option<EmbeddedImage>, DecodeError> {
    let Some(caps) = EMBEDDED_IMAGE.captures(value) else {
        return Ok(None);
    };

    let subtype = caps[1].to_string();
    if !SUBTYPE_TOKEN.is_match(&subtype) || subtype.contains("..") {
        return Err(DecodeError::InvalidSubtype(subtype));
    }
    let encoding = caps[2].trim();
    if !encoding.eq_ignore_ascii_case("base64") {
        return Err(DecodeError::UnsupportedEncoding(encoding.to_string()));
    }

    let payload: String = caps[3].chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let bytes = LENIENT_BASE64.decode(payload.as_bytes())?;
    if bytes.len() < MIN_ASSET_BYTES {
        return Err(DecodeError::TooSmall(bytes.len()));
    }

    Ok(Some(EmbeddedImage { subtype, bytes }))
}

/// File extension for an image subtype; `jpeg` becomes `jpg`.
///
/// ```
/// use pageship::export::extension_for_subtype;
///
/// assert_eq!(extension_for_subtype("jpeg"), "jpg");
/// assert_eq!(extension_for_subtype("png"), "png");
/// ```
pub fn extension_for_subtype(subtype: &str) -> String {
    if subtype.eq_ignore_ascii_case("jpeg") {
        "jpg".to_string()
    } else {
        subtype.to_ascii_lowercase()
    }
}

/// Moves every valid embedded image out of `markup` into an [`AssetMap`].
///
/// Assets are named `images/image<N>.<ext>` where `N` counts successful
/// extractions from 1 in document order, so the same input always yields the
/// same names. Each rewritten `src` keeps its original quoting. Images whose
/// payload is empty, undecodable, or shorter than [`MIN_ASSET_BYTES`] are left
/// byte-for-byte unchanged.
///
/// # Example
///
/// ```
/// use pageship::export::extract_assets;
///
/// let markup = r#"<p><img src="data:image/png;base64,iVBORw0KGgoAAAANSUhEUg=="></p>"#;
/// let extraction = extract_assets(markup);
///
/// assert_eq!(extraction.markup, r#"<p><img src="images/image1.png"></p>"#);
/// assert!(extraction.assets.contains("images/image1.png"));
/// ```
pub fn extract_assets(markup: &str) -> Extraction {
    let mut assets = AssetMap::new();
    let mut skipped = Vec::new();
    let mut counter = 0usize;
    let mut tag_index = 0usize;

    let rewritten = IMG_TAG.replace_all(markup, |tag: &Captures| {
        tag_index += 1;
        let tag_text = &tag[0];

        let Some(src) = SRC_ATTR.captures(tag_text) else {
            return tag_text.to_string();
        };
        let Some(value) = src.get(1).or_else(|| src.get(2)).or_else(|| src.get(3)) else {
            return tag_text.to_string();
        };

        let image = match decode_embedded(value.as_str()) {
            Ok(Some(image)) => image,
            Ok(None) => return tag_text.to_string(),
            Err(error) => {
                tracing::warn!(tag_index, %error, "skipping embedded image");
                skipped.push(SkippedImage { tag_index, error });
                return tag_text.to_string();
            }
        };

        let file_name = format!(
            "image{}.{}",
            counter + 1,
            extension_for_subtype(&image.subtype)
        );
        let relative_path = format!("{ASSET_DIR}/{file_name}");
        debug_assert!(is_contained_path(&relative_path));
        let asset = ExtractedAsset::new(relative_path.clone(), image.bytes, image.subtype);
        if let Err(err) = assets.insert(asset) {
            tracing::warn!(tag_index, %err, "asset path collision, leaving image embedded");
            return tag_text.to_string();
        }
        counter += 1;
        tracing::debug!(tag_index, path = %relative_path, "extracted embedded image");

        let span = value.range();
        format!(
            "{}{}{}",
            &tag_text[..span.start],
            relative_path,
            &tag_text[span.end..]
        )
    });

    Extraction {
        markup: rewritten.into_owned(),
        assets,
        skipped,
    }
}
