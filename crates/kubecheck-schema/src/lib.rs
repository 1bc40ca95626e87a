//! # kubecheck-schema — Kubernetes Manifest Schema Validation
//!
//! Validates Kubernetes manifests against the standalone JSON schemas
//! published for each Kubernetes release (one self-contained schema per
//! kind and API version).
//!
//! ## Pieces
//!
//! - [`SchemaLocation`]: URL or path templates such as
//!   `{{ .NormalizedKubernetesVersion }}-standalone{{ .StrictSuffix }}/{{ .ResourceKind }}{{ .KindSuffix }}.json`.
//!   `"default"` selects the public registry.
//! - [`Registry`]: where schemas come from: [`LocalRegistry`] for
//!   directories, [`HttpRegistry`] for remote registries backed by a
//!   [`DiskCache`].
//! - [`Validator`]: parses a manifest document, finds its schema,
//!   validates it with `jsonschema`, and reports a [`ValidationResult`].
//!
//! ## Crate Policy
//!
//! - Construction errors are `Err(SchemaError)`. Per-resource problems are
//!   never `Err`; they come back as a [`Status`] plus a [`ResourceError`].
//! - Schema semantics belong to `jsonschema` and the schema publisher.
//!   This crate locates, caches and compiles schema files; it does not
//!   derive them.

pub mod cache;
pub mod error;
pub mod location;
pub mod registry;
pub mod resource;
mod retry;
pub mod status;
pub mod validator;

pub use cache::DiskCache;
pub use error::{RegistryError, ResourceError, SchemaError};
pub use location::{SchemaLocation, TemplateData, DEFAULT_LOCATION_ALIAS, DEFAULT_SCHEMA_LOCATION};
pub use registry::{FetchedSchema, HttpRegistry, LocalRegistry, Registry};
pub use resource::{Resource, Signature};
pub use status::{Status, ValidationResult, ValidationViolations, Violation};
pub use validator::{Options, Validator, DEFAULT_TIMEOUT};
