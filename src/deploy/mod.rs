//! Deploy Orchestrator: package a bundle and submit it to the deploy endpoint.
//!
//! [`deploy`] never fails: every error is folded into a [`DeployResult`]
//! with `success == false`.
//!
//! [`DeployResult`]: crate::domain::DeployResult

pub mod client;
pub mod form;
mod orchestrator;

pub use client::{
    DEFAULT_API_URL, DeployClient, DeployResponse, NginxReport, Session, TransportError,
};
pub use form::{build_form, form_fields};
pub use orchestrator::{DeployError, deploy};
