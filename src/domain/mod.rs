//! Core types: DocumentSource, ExtractedAsset, AssetMap, Bundle, DeployTarget, Stage

mod asset;
mod bundle;
mod deploy;
mod document;
mod stage;

pub use asset::{ASSET_DIR, AssetMap, DuplicateAssetPath, ExtractedAsset, is_contained_path};
pub use bundle::{Bundle, BundleEntry, ROOT_DOCUMENT_NAME, STYLESHEET_NAME};
pub use deploy::{
    DEFAULT_DEPLOY_PATH, DEFAULT_SSH_PORT, DeployResult, DeployTarget, InvalidTarget, ProjectRef,
    VpsTarget,
};
pub use document::{DocumentProvider, DocumentSource};
pub use stage::{ActionTracker, Delivery, IllegalTransition, Stage};
