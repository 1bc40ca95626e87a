//! # kubecheck-validation — Pluggable Manifest Checks
//!
//! The pipeline surface shared by every check over Kubernetes manifests:
//!
//! - [`Resource`]: one manifest document, split out of a YAML stream.
//! - [`Checker`]: one resource in, one [`CheckResult`] out.
//! - [`Status`]: `Valid`, `Invalid`, `Error`, `Skipped` or `Empty`.
//! - [`SchemaChecker`]: the Kubernetes schema check, an adapter over
//!   [`kubecheck_schema::Validator`].
//! - [`run_checks`]: sequential driver honoring a [`CheckContext`].
//!
//! ## Crate Policy
//!
//! - A checker that cannot be built fails at construction with
//!   [`CheckerError`]. Once built, a checker never fails: problems with a
//!   resource are reported through the result's status and message.

pub mod checker;
pub mod error;
pub mod resource;
pub mod result;
pub mod runner;
pub mod schema_checker;

pub use checker::{CheckContext, Checker};
pub use error::CheckerError;
pub use resource::Resource;
pub use result::{CheckResult, CheckType, Status};
pub use runner::{run_checks, ResourceReport, RunOutcome};
pub use schema_checker::{map_status, ResourceValidator, SchemaChecker, SCHEMA_CHECK_NAME};
