//! # kubecheck-cli — Kubernetes Manifest Checks from the Command Line
//!
//! Provides the `kubecheck` binary.
//!
//! ## Subcommands
//!
//! - `kubecheck validate`: Validate manifests against Kubernetes JSON schemas.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | every resource is valid, skipped or empty |
//! | 1 | at least one resource is invalid or could not be validated |
//! | 2 | the run could not be carried out |
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; checking lives in `kubecheck-validation`.
//! - Reports go to stdout, logs to stderr.

pub mod config;
pub mod validate;

/// Exit code for a run that could not be carried out.
pub const EXIT_FATAL: u8 = 2;
