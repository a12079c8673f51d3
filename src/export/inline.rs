//! Embedding remote resources for self-contained output.
//!
//! The inverse of extraction: every remote image reference in the markup,
//! and every background image and `@font-face` source in the stylesheet, is
//! fetched and replaced by a `data:` URL. Fetches run strictly one at a time
//! in document order. A reference that cannot be fetched keeps its original
//! value; the batch always completes.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use url::Url;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\s[^>]*>").expect("img tag pattern is valid"));

static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("src attribute pattern is valid")
});

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#)
        .expect("css url pattern is valid")
});

/// Errors fetching a single remote resource.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot resolve relative reference '{0}' without a base URL")]
    Unresolvable(String),

    #[error("invalid reference '{reference}': {source}")]
    InvalidUrl {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} exceeds the {limit}-byte inline limit")]
    TooLarge { url: String, limit: usize },
}

/// Bytes of a fetched resource and the media type the server reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Source of remote resource bytes.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError>;
}

/// Timeout and size bounds for a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineLimits {
    pub timeout: Duration,
    pub max_resource_bytes: usize,
}

impl Default for InlineLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_resource_bytes: 10 * 1024 * 1024,
        }
    }
}

/// [`ResourceFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_resource_bytes: usize,
}

impl HttpFetcher {
    pub fn new(limits: InlineLimits) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("pageship/", env!("CARGO_PKG_VERSION")))
            .timeout(limits.timeout)
            .build()?;
        Ok(Self {
            client,
            max_resource_bytes: limits.max_resource_bytes,
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_resource_bytes,
        };

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length()
            && length > self.max_resource_bytes as u64
        {
            return Err(too_large());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            if bytes.len() + chunk.len() > self.max_resource_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchedResource {
            bytes,
            content_type,
        })
    }
}

/// What a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `<img src>` or a stylesheet background image.
    Image,
    /// A `url()` inside an `@font-face` block.
    Font,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Image => write!(f, "image"),
            ReferenceKind::Font => write!(f, "font"),
        }
    }
}

/// Options for an inlining pass.
#[derive(Debug, Clone, Default)]
pub struct InlineOptions {
    /// Base against which relative references are resolved.
    pub base_url: Option<Url>,
}

/// A reference that kept its original value.
#[derive(Debug)]
pub struct InlineFailure {
    pub reference: String,
    pub kind: ReferenceKind,
    pub error: FetchError,
}

/// Result of an inlining pass.
#[derive(Debug)]
pub struct InlineReport {
    pub markup: String,
    pub styles: String,
    /// Number of references replaced by embedded payloads.
    pub inlined: usize,
    pub failures: Vec<InlineFailure>,
}

impl InlineReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A located reference value in some text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    span: Range<usize>,
    kind: ReferenceKind,
}

fn is_embedded_or_local(value: &str) -> bool {
    let value = value.trim_start();
    let lower = value.get(..5).map(str::to_ascii_lowercase);
    value.is_empty()
        || value.starts_with('#')
        || matches!(lower.as_deref(), Some("data:") | Some("blob:"))
}

/// Finds `<img src>` values that still point at something remote.
fn markup_references(markup: &str) -> Vec<Reference> {
    IMG_TAG
        .find_iter(markup)
        .filter_map(|tag| {
            let caps = SRC_ATTR.captures(tag.as_str())?;
            let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
            if is_embedded_or_local(value.as_str()) {
                return None;
            }
            Some(Reference {
                span: tag.start() + value.start()..tag.start() + value.end(),
                kind: ReferenceKind::Image,
            })
        })
        .collect()
}

/// Finds background-image and `@font-face` `url()` values in a stylesheet.
///
/// Walks the text once, tracking the enclosing block preludes and the start
/// of the current declaration, to decide what each `url()` belongs to.
fn style_references(styles: &str) -> Vec<Reference> {
    let urls: Vec<(Range<usize>, Range<usize>)> = CSS_URL
        .captures_iter(styles)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
            Some((whole.range(), value.range()))
        })
        .collect();

    let mut references = Vec::new();
    let mut preludes: Vec<Range<usize>> = Vec::new();
    let mut statement_start = 0usize;
    let mut quote: Option<char> = None;
    let mut next_url = urls.iter().peekable();
    let mut skip_until = 0usize;

    for (i, c) in styles.char_indices() {
        if i < skip_until {
            continue;
        }

        if let Some((whole, value)) = next_url.peek()
            && whole.start == i
        {
            let (whole, value) = ((*whole).clone(), (*value).clone());
            next_url.next();
            if quote.is_none() {
                let in_font_face = preludes.iter().any(|p| {
                    styles[p.clone()]
                        .trim()
                        .to_ascii_lowercase()
                        .starts_with("@font-face")
                });
                let property = styles[statement_start..whole.start]
                    .split(':')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase();

                let kind = if in_font_face {
                    Some(ReferenceKind::Font)
                } else if property.starts_with("background") {
                    Some(ReferenceKind::Image)
                } else {
                    None
                };

                if let Some(kind) = kind
                    && !is_embedded_or_local(&styles[value.clone()])
                {
                    references.push(Reference { span: value, kind });
                }
                skip_until = whole.end;
                continue;
            }
        }

        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '{' => {
                preludes.push(statement_start..i);
                statement_start = i + 1;
            }
            '}' => {
                preludes.pop();
                statement_start = i + 1;
            }
            ';' => statement_start = i + 1,
            _ => {}
        }
    }

    references
}

/// Turns a reference value into an absolute fetchable URL.
fn resolve(reference: &str, base: Option<&Url>) -> Result<Url, FetchError> {
    let reference = reference.trim();
    let parsed = match Url::parse(reference) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(reference).map_err(|source| FetchError::InvalidUrl {
                reference: reference.to_string(),
                source,
            })?,
            None if reference.starts_with("//") => Url::parse(&format!("https:{reference}"))
                .map_err(|source| FetchError::InvalidUrl {
                    reference: reference.to_string(),
                    source,
                })?,
            None => return Err(FetchError::Unresolvable(reference.to_string())),
        },
        Err(source) => {
            return Err(FetchError::InvalidUrl {
                reference: reference.to_string(),
                source,
            });
        }
    };

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::UnsupportedScheme {
            url: parsed.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}

/// Encodes fetched bytes as a `data:` URL.
fn to_data_url(url: &Url, resource: &FetchedResource) -> String {
    let mime = resource
        .content_type
        .clone()
        .or_else(|| {
            mime_guess::from_path(url.path())
                .first_raw()
                .map(str::to_string)
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut encoded = String::with_capacity(resource.bytes.len() * 4 / 3 + mime.len() + 16);
    encoded.push_str("data:");
    encoded.push_str(&mime);
    encoded.push_str(";base64,");
    STANDARD.encode_string(&resource.bytes, &mut encoded);
    encoded
}

/// Sequential fetch-and-encode with a per-pass cache of successes.
struct Embedder<'a, F: ResourceFetcher + ?Sized> {
    fetcher: &'a F,
    base_url: Option<&'a Url>,
    cache: HashMap<Url, String>,
    inlined: usize,
    failures: Vec<InlineFailure>,
}

impl<F: ResourceFetcher + ?Sized> Embedder<'_, F> {
    async fn embed(&mut self, reference: &str, kind: ReferenceKind) -> Option<String> {
        let outcome = match resolve(reference, self.base_url) {
            Ok(url) => match self.cache.get(&url) {
                Some(data_url) => Ok(data_url.clone()),
                None => match self.fetcher.fetch(&url).await {
                    Ok(resource) => {
                        let data_url = to_data_url(&url, &resource);
                        self.cache.insert(url, data_url.clone());
                        Ok(data_url)
                    }
                    Err(err) => Err(err),
                },
            },
            Err(err) => Err(err),
        };

        match outcome {
            Ok(data_url) => {
                tracing::debug!(reference, %kind, "inlined resource");
                self.inlined += 1;
                Some(data_url)
            }
            Err(error) => {
                tracing::warn!(reference, %kind, %error, "leaving reference unresolved");
                self.failures.push(InlineFailure {
                    reference: reference.to_string(),
                    kind,
                    error,
                });
                None
            }
        }
    }

    async fn rewrite(&mut self, text: &str, references: Vec<Reference>) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for reference in references {
            let value = &text[reference.span.clone()];
            if let Some(data_url) = self.embed(value, reference.kind).await {
                out.push_str(&text[cursor..reference.span.start]);
                out.push_str(&data_url);
                cursor = reference.span.end;
            }
        }
        out.push_str(&text[cursor..]);
        out
    }
}

/// Replaces remote references in `markup` and `styles` with embedded payloads.
///
/// Markup references are processed first, then stylesheet references, each
/// in textual order, with one fetch in flight at a time. The same absolute
/// URL is fetched at most once per pass. Quoting around each value is kept.
pub async fn inline_assets<F>(
    markup: &str,
    styles: &str,
    fetcher: &F,
    options: &InlineOptions,
) -> InlineReport
where
    F: ResourceFetcher + ?Sized,
{
    let mut embedder = Embedder {
        fetcher,
        base_url: options.base_url.as_ref(),
        cache: HashMap::new(),
        inlined: 0,
        failures: Vec::new(),
    };

    let markup = embedder.rewrite(markup, markup_references(markup)).await;
    let styles = embedder.rewrite(styles, style_references(styles)).await;

    InlineReport {
        markup,
        styles,
        inlined: embedder.inlined,
        failures: embedder.failures,
    }
}
