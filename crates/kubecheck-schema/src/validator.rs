//! # Manifest Validator
//!
//! Validates Kubernetes manifests against standalone JSON schemas.
//!
//! ## Lookup
//!
//! For each resource the validator renders every configured location with
//! the resource's kind and `apiVersion`, and asks the registries in order.
//! The first registry that has the schema wins; "not found" falls through;
//! any other registry failure stops the lookup. Compiled schemas, the
//! absence of a schema and lookup failures are memoized per `(kind,
//! apiVersion, Kubernetes version)` for the life of the validator.
//!
//! ## Drafts
//!
//! Kubernetes standalone schemas declare a generic `$schema` URI that no
//! draft detector recognizes. Known draft URIs are honored; anything else
//! is compiled as Draft 4. External `$ref`s are never fetched.
//!
//! ## Thread Safety
//!
//! `Validator` is `Send + Sync`. The memo sits behind a `RwLock`; compiled
//! schemas are shared through `Arc`.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use jsonschema::{Draft, Retrieve, Uri};
use parking_lot::RwLock;
use serde_json::Value;

use crate::cache::DiskCache;
use crate::error::{ResourceError, SchemaError};
use crate::location::{SchemaLocation, TemplateData};
use crate::registry::{self, Registry};
use crate::resource::{self, Parsed, Resource, Signature};
use crate::status::{ValidationResult, Violation};

/// Default HTTP request timeout for remote registries.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validator configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Existing directory used to cache downloaded schemas.
    pub cache: Option<PathBuf>,
    /// Accept invalid TLS certificates from remote registries.
    pub skip_tls: bool,
    /// Kinds (`Kind` or `apiVersion/Kind`) reported as skipped.
    pub skip_kinds: HashSet<String>,
    /// Kinds (`Kind` or `apiVersion/Kind`) reported as errors.
    pub reject_kinds: HashSet<String>,
    /// Kubernetes version schemas are selected for, e.g. `1.27.0`, or `master`.
    pub kubernetes_version: String,
    /// Use the `-strict` schema variants (no additional properties).
    pub strict: bool,
    /// Report resources without a schema as skipped instead of errors.
    pub ignore_missing_schemas: bool,
    /// Request timeout for remote registries.
    pub timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache: None,
            skip_tls: false,
            skip_kinds: HashSet::new(),
            reject_kinds: HashSet::new(),
            kubernetes_version: "master".to_string(),
            strict: false,
            ignore_missing_schemas: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A compiled schema and where it was found.
struct CompiledSchema {
    location: String,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Kubernetes manifest validator.
#[derive(Debug)]
pub struct Validator {
    registries: Vec<Box<dyn Registry>>,
    options: Options,
    schemas: RwLock<HashMap<String, Result<Option<Arc<CompiledSchema>>, ResourceError>>>,
}

impl Validator {
    /// Create a validator.
    ///
    /// An empty `locations` list means `["default"]`.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvalidLocation` for malformed locations,
    /// `SchemaError::CacheDir`/`CacheNotDirectory` if `options.cache` is
    /// not an existing directory, `SchemaError::HttpClient` if an HTTP
    /// client cannot be built.
    pub fn new<S: AsRef<str>>(locations: &[S], options: Options) -> Result<Self, SchemaError> {
        let mut parsed = locations
            .iter()
            .map(|l| SchemaLocation::parse(l.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if parsed.is_empty() {
            parsed.push(SchemaLocation::parse(crate::location::DEFAULT_LOCATION_ALIAS)?);
        }

        let cache = options
            .cache
            .as_ref()
            .map(|dir| DiskCache::open(dir))
            .transpose()?;

        let registries = parsed
            .into_iter()
            .map(|location| {
                registry::for_location(location, cache.as_ref(), options.skip_tls, options.timeout)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with_registries(registries, options))
    }

    /// Create a validator over explicit registries.
    ///
    /// `options.cache`, `options.skip_tls` and `options.timeout` are ignored;
    /// they only configure registries built by [`Validator::new`].
    pub fn with_registries(registries: Vec<Box<dyn Registry>>, options: Options) -> Self {
        Self {
            registries,
            options,
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// The options this validator was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Validate one manifest document.
    ///
    /// Never fails: every problem is reported through the result's status
    /// and error.
    pub fn validate_resource(&self, resource: &Resource<'_>) -> ValidationResult {
        let (body, signature) = match resource::parse(resource) {
            Ok(Parsed::Empty) => return ValidationResult::empty(),
            Ok(Parsed::Object { body, signature }) => (body, signature),
            Err(e) => return ValidationResult::error(e, None),
        };

        if kind_listed(&self.options.skip_kinds, &signature) {
            return ValidationResult::skipped(signature);
        }
        if kind_listed(&self.options.reject_kinds, &signature) {
            let kind = signature.kind.clone();
            return ValidationResult::error(ResourceError::ProhibitedKind(kind), Some(signature));
        }

        let schema = match self.schema_for(&signature) {
            Ok(Some(schema)) => schema,
            Ok(None) if self.options.ignore_missing_schemas => {
                return ValidationResult::skipped(signature);
            }
            Ok(None) => {
                let kind = signature.kind.clone();
                return ValidationResult::error(
                    ResourceError::MissingSchema { kind },
                    Some(signature),
                );
            }
            Err(e) => return ValidationResult::error(e, Some(signature)),
        };

        let violations: Vec<Violation> = schema
            .validator
            .iter_errors(&body)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            tracing::debug!(path = resource.path, resource = %signature, schema = %schema.location, "resource valid");
            ValidationResult::valid(signature)
        } else {
            tracing::debug!(
                path = resource.path,
                resource = %signature,
                violations = violations.len(),
                "resource invalid"
            );
            ValidationResult::invalid(violations, signature)
        }
    }

    /// Look up, compile and memoize the schema for a signature.
    ///
    /// `Ok(None)` means no registry has a schema. Failures are memoized
    /// too, so an unreachable registry costs one lookup per key.
    fn schema_for(
        &self,
        signature: &Signature,
    ) -> Result<Option<Arc<CompiledSchema>>, ResourceError> {
        let key = format!(
            "{}-{}-{}",
            signature.kind, signature.version, self.options.kubernetes_version
        );
        if let Some(cached) = self.schemas.read().get(&key) {
            return cached.clone();
        }

        let outcome = self.lookup(signature);
        if let Err(e) = &outcome {
            tracing::debug!(kind = %signature.kind, "schema lookup failed: {e}");
        }
        self.schemas.write().insert(key, outcome.clone());
        outcome
    }

    /// Ask the registries in order and compile the first schema found.
    fn lookup(&self, signature: &Signature) -> Result<Option<Arc<CompiledSchema>>, ResourceError> {
        let data = TemplateData::new(
            &signature.kind,
            &signature.version,
            &self.options.kubernetes_version,
            self.options.strict,
        );

        let mut found = None;
        for registry in &self.registries {
            match registry.download(&data) {
                Ok(fetched) => {
                    found = Some(fetched);
                    break;
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(kind = %signature.kind, "{e}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let Some(fetched) = found else {
            return Ok(None);
        };
        let compile_error = |reason: String| ResourceError::Compile {
            kind: signature.kind.clone(),
            location: fetched.location.clone(),
            reason,
        };
        let schema: Value =
            serde_json::from_slice(&fetched.bytes).map_err(|e| compile_error(e.to_string()))?;
        let validator = compile(schema).map_err(compile_error)?;
        Ok(Some(Arc::new(CompiledSchema {
            location: fetched.location,
            validator,
        })))
    }
}

fn kind_listed(kinds: &HashSet<String>, signature: &Signature) -> bool {
    !kinds.is_empty()
        && (kinds.contains(&signature.kind) || kinds.contains(&signature.qualified_kind()))
}

/// Refuses every external `$ref`; standalone schemas are self-contained.
struct NoRemoteRetriever;

impl Retrieve for NoRemoteRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema reference {} is not supported", uri.as_str()).into())
    }
}

fn compile(mut schema: Value) -> Result<jsonschema::Validator, String> {
    let draft = match schema.get("$schema").and_then(Value::as_str) {
        Some(uri) => draft_for_uri(uri),
        None => None,
    };
    let draft = match draft {
        Some(draft) => draft,
        None => {
            if let Some(obj) = schema.as_object_mut() {
                obj.remove("$schema");
            }
            Draft::Draft4
        }
    };

    let mut opts = jsonschema::options();
    opts.with_draft(draft);
    opts.with_retriever(NoRemoteRetriever);
    opts.build(&schema).map_err(|e| e.to_string())
}

fn draft_for_uri(uri: &str) -> Option<Draft> {
    if uri.contains("draft-04") {
        Some(Draft::Draft4)
    } else if uri.contains("draft-06") {
        Some(Draft::Draft6)
    } else if uri.contains("draft-07") {
        Some(Draft::Draft7)
    } else if uri.contains("2019-09") {
        Some(Draft::Draft201909)
    } else if uri.contains("2020-12") {
        Some(Draft::Draft202012)
    } else {
        None
    }
}
