//! # Error Types
//!
//! Three layers of failure, kept apart so callers can tell them apart:
//!
//! - [`SchemaError`]: the validator could not be constructed. Fatal to
//!   the caller.
//! - [`RegistryError`]: a schema registry failed to produce a schema.
//!   Surfaces per resource, never at construction.
//! - [`ResourceError`]: why a single resource did not validate. Carried
//!   inside a [`ValidationResult`](crate::ValidationResult), never
//!   returned as `Err`.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::status::ValidationViolations;

/// Error constructing a [`Validator`](crate::Validator).
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema location template could not be parsed.
    #[error("invalid schema location '{location}': {reason}")]
    InvalidLocation {
        /// The location as given by the caller.
        location: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The configured cache directory cannot be used.
    #[error("failed opening cache folder {}: {source}", path.display())]
    CacheDir {
        /// The configured cache directory.
        path: PathBuf,
        /// Underlying filesystem error.
        source: std::io::Error,
    },

    /// The configured cache path exists but is not a directory.
    #[error("cache folder {} is not a directory", path.display())]
    CacheNotDirectory {
        /// The configured cache path.
        path: PathBuf,
    },

    /// The HTTP client for remote registries could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Error retrieving a schema from a registry.
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    /// The registry has no schema at the rendered location.
    #[error("no schema found at {location}")]
    NotFound {
        /// Rendered URL or file path.
        location: String,
    },

    /// The registry answered with something that is not JSON.
    #[error("response from {location} is not valid JSON")]
    NotJson {
        /// Rendered URL or file path.
        location: String,
    },

    /// Transport failure talking to an HTTP registry.
    #[error("failed downloading schema at {url}: {reason}")]
    Http {
        /// Rendered URL.
        url: String,
        /// Transport error text.
        reason: String,
    },

    /// The HTTP registry answered with an unexpected status code.
    #[error("error while downloading schema at {url} - received HTTP status {status}")]
    Status {
        /// Rendered URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Filesystem failure reading a local schema.
    #[error("failed reading schema at {path}: {source}")]
    Io {
        /// Rendered file path.
        path: String,
        /// Underlying filesystem error.
        source: Arc<std::io::Error>,
    },
}

impl RegistryError {
    /// True when this error means "try the next registry".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NotJson { .. })
    }
}

/// Why one resource failed validation.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    /// The document is not parseable YAML/JSON.
    #[error("error unmarshalling resource: {0}")]
    Unmarshal(String),

    /// The document parsed, but its top level is not a mapping.
    #[error("error unmarshalling resource: top-level document is not a mapping")]
    NotAMapping,

    /// A required signature field is absent.
    #[error("error while parsing: missing '{0}' key")]
    MissingKey(&'static str),

    /// The kind is listed in `reject_kinds`.
    #[error("prohibited resource kind {0}")]
    ProhibitedKind(String),

    /// No registry had a schema and missing schemas are not ignored.
    #[error("could not find schema for {kind}")]
    MissingSchema {
        /// The resource kind.
        kind: String,
    },

    /// A registry failed while looking up the schema.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The downloaded schema could not be compiled.
    #[error("failed compiling schema for {kind} from {location}: {reason}")]
    Compile {
        /// The resource kind.
        kind: String,
        /// Where the schema came from.
        location: String,
        /// Compiler error text.
        reason: String,
    },

    /// The document does not conform to its schema.
    #[error("problem validating schema. Check JSON formatting: {0}")]
    Invalid(ValidationViolations),
}
