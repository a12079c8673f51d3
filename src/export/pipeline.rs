//! Stage-tracked composition of the export components.
//!
//! Each entry point starts a fresh [`ActionTracker`], pulls a new snapshot
//! from the provider, and stops just short of delivery. The caller finishes
//! the action with [`Prepared::deliver`] or [`Prepared::transmit`].

use std::fmt::Display;

use thiserror::Error;

use super::bundle::{AssembleError, DocumentShell, assemble_single_file, assemble_with};
use super::extract::extract_assets;
use super::format::{format_markup, format_styles};
use super::inline::{InlineFailure, InlineOptions, ResourceFetcher, inline_assets};
use super::preview::{SourcePair, render_preview};
use crate::deploy::{DeployClient, deploy};
use crate::domain::{
    ActionTracker, Bundle, Delivery, DeployResult, DeployTarget, DocumentProvider, DocumentSource,
    IllegalTransition, ProjectRef, Stage,
};

/// Errors that abort an export action before delivery.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read document source")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Stage(#[from] IllegalTransition),
}

/// A finished artifact waiting for its delivery step.
#[derive(Debug)]
pub struct Prepared<T> {
    artifact: T,
    tracker: ActionTracker,
    delivery: Delivery,
}

impl<T> Prepared<T> {
    pub fn artifact(&self) -> &T {
        &self.artifact
    }

    pub fn stage(&self) -> Stage {
        self.tracker.stage()
    }

    /// Hands the artifact to `deliver` and closes the action.
    pub fn deliver<R, E, F>(self, deliver: F) -> Result<R, E>
    where
        F: FnOnce(T) -> Result<R, E>,
        E: Display,
    {
        let Prepared {
            artifact,
            mut tracker,
            delivery,
        } = self;
        advance_or_log(&mut tracker, Stage::Delivering(delivery));
        match deliver(artifact) {
            Ok(value) => {
                advance_or_log(&mut tracker, Stage::Done);
                tracing::info!(action = tracker.action(), "delivered");
                Ok(value)
            }
            Err(err) => {
                tracker.fail(&err.to_string());
                Err(err)
            }
        }
    }
}

fn advance_or_log(tracker: &mut ActionTracker, next: Stage) {
    if let Err(err) = tracker.advance(next) {
        tracing::error!(%err, "unexpected stage transition");
    }
}

impl Prepared<Bundle> {
    /// Submits the bundle to the deploy endpoint and closes the action.
    pub async fn transmit(
        self,
        client: &DeployClient,
        target: &DeployTarget,
        project: Option<ProjectRef>,
    ) -> DeployResult {
        let Prepared {
            artifact,
            mut tracker,
            ..
        } = self;
        advance_or_log(&mut tracker, Stage::Delivering(Delivery::Transmit));
        let result = deploy(client, artifact, target, project).await;
        if result.success {
            advance_or_log(&mut tracker, Stage::Done);
        } else {
            tracker.fail(&result.message);
        }
        result
    }
}

/// A self-contained HTML document plus the outcome of inlining.
#[derive(Debug)]
pub struct SingleFile {
    pub document: String,
    pub inlined: usize,
    pub failures: Vec<InlineFailure>,
}

fn snapshot<P: DocumentProvider>(
    tracker: &mut ActionTracker,
    provider: &P,
) -> Result<DocumentSource, PipelineError> {
    tracker.advance(Stage::Snapshotting)?;
    DocumentSource::snapshot(provider).map_err(|err| {
        let err = PipelineError::Source(Box::new(err));
        tracker.fail(&err.to_string());
        err
    })
}

fn checked<T, E>(tracker: &mut ActionTracker, result: Result<T, E>) -> Result<T, PipelineError>
where
    PipelineError: From<E>,
{
    result.map_err(|err| {
        let err = PipelineError::from(err);
        tracker.fail(&err.to_string());
        err
    })
}

/// Formatted `index.html` + `styles.css` for download.
pub fn source_pair<P: DocumentProvider>(
    provider: &P,
    shell: &DocumentShell,
) -> Result<Prepared<SourcePair>, PipelineError> {
    let mut tracker = ActionTracker::start("source-download");
    let source = snapshot(&mut tracker, provider)?;

    tracker.advance(Stage::Formatting)?;
    let pair = checked(&mut tracker, render_preview(&source, shell))?;

    Ok(Prepared {
        artifact: pair,
        tracker,
        delivery: Delivery::Download,
    })
}

/// Extracted, formatted and assembled bundle.
///
/// Delivered locally via [`Prepared::deliver`], or to the deploy endpoint
/// via [`Prepared::transmit`].
pub fn site_bundle<P: DocumentProvider>(
    provider: &P,
    shell: &DocumentShell,
) -> Result<Prepared<Bundle>, PipelineError> {
    let mut tracker = ActionTracker::start("site-bundle");
    let source = snapshot(&mut tracker, provider)?;

    tracker.advance(Stage::Extracting)?;
    let extraction = extract_assets(source.markup());
    if !extraction.skipped.is_empty() {
        tracing::warn!(
            skipped = extraction.skipped.len(),
            "some embedded images were left in place"
        );
    }
    let (markup, assets) = extraction.into_parts();

    tracker.advance(Stage::Formatting)?;
    let markup = format_markup(&markup);
    let styles = format_styles(source.styles());

    tracker.advance(Stage::Assembling)?;
    let bundle = checked(&mut tracker, assemble_with(shell, &markup, &styles, assets))?;

    Ok(Prepared {
        artifact: bundle,
        tracker,
        delivery: Delivery::Download,
    })
}

/// One HTML document with every remote asset and the stylesheet embedded.
pub async fn single_file<P, F>(
    provider: &P,
    fetcher: &F,
    options: &InlineOptions,
    shell: &DocumentShell,
) -> Result<Prepared<SingleFile>, PipelineError>
where
    P: DocumentProvider,
    F: ResourceFetcher + ?Sized,
{
    let mut tracker = ActionTracker::start("single-file");
    let source = snapshot(&mut tracker, provider)?;

    tracker.advance(Stage::Inlining)?;
    let report = inline_assets(source.markup(), source.styles(), fetcher, options).await;
    if report.has_failures() {
        tracing::warn!(
            failed = report.failures.len(),
            "some remote resources were left as references"
        );
    }

    tracker.advance(Stage::Formatting)?;
    let markup = format_markup(&report.markup);
    let styles = format_styles(&report.styles);

    tracker.advance(Stage::Assembling)?;
    let document = checked(&mut tracker, assemble_single_file(shell, &markup, &styles))?;

    Ok(Prepared {
        artifact: SingleFile {
            document,
            inlined: report.inlined,
            failures: report.failures,
        },
        tracker,
        delivery: Delivery::Download,
    })
}
