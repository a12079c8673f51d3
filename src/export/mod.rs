//! Export pipeline: formatting, asset extraction and inlining, bundle
//! assembly and packaging.

pub mod archive;
pub mod bundle;
pub mod extract;
pub mod format;
pub mod inline;
pub mod pipeline;
pub mod preview;

pub use archive::{
    ArchiveError, SITE_ARCHIVE_NAME, SOURCE_ARCHIVE_NAME, build_site_archive, build_source_archive,
};
pub use bundle::{
    AssembleError, BOILERPLATE_STYLESHEET, DEFAULT_SHELL_TEMPLATE, DocumentShell, assemble,
    assemble_single_file, assemble_with, favicon_data_url,
};
pub use extract::{
    DecodeError, Extraction, MIN_ASSET_BYTES, SkippedImage, extension_for_subtype, extract_assets,
};
pub use format::{format_markup, format_styles};
pub use inline::{
    FetchError, FetchedResource, HttpFetcher, InlineFailure, InlineLimits, InlineOptions,
    InlineReport, ReferenceKind, ResourceFetcher, inline_assets,
};
pub use pipeline::{PipelineError, Prepared, SingleFile, single_file, site_bundle, source_pair};
pub use preview::{SourcePair, render_preview};
