//! # Schema Checker
//!
//! Adapts [`kubecheck_schema::Validator`] to the [`Checker`] interface.
//!
//! The default construction pins the validator configuration used across
//! the pipeline:
//!
//! | Option | Value |
//! |--------|-------|
//! | schema locations | `["default"]` |
//! | cache | `<temp dir>/kubeconform-cache`, created if absent |
//! | missing schemas | reported as errors |
//! | strict | yes |
//! | Kubernetes version | `1.27.0` |

use std::path::{Path, PathBuf};

use kubecheck_schema::{Options, ValidationResult, Validator};

use crate::checker::{CheckContext, Checker};
use crate::error::CheckerError;
use crate::resource::Resource;
use crate::result::{CheckResult, CheckType, Status};

/// Name reported in every schema check result.
pub const SCHEMA_CHECK_NAME: &str = "kubernetes-schema";

/// Directory under the system temp dir holding downloaded schemas.
pub const CACHE_DIR_NAME: &str = "kubeconform-cache";

/// Kubernetes version the default checker validates against.
pub const KUBERNETES_VERSION: &str = "1.27.0";

/// Schema locations the default checker consults.
pub const SCHEMA_LOCATIONS: &[&str] = &[kubecheck_schema::DEFAULT_LOCATION_ALIAS];

/// The validator call the schema checker delegates to.
pub trait ResourceValidator: Send + Sync {
    /// Validate one resource.
    fn validate_resource(&self, resource: &kubecheck_schema::Resource<'_>) -> ValidationResult;
}

impl ResourceValidator for Validator {
    fn validate_resource(&self, resource: &kubecheck_schema::Resource<'_>) -> ValidationResult {
        Validator::validate_resource(self, resource)
    }
}

/// A [`Checker`] that validates resources against Kubernetes schemas.
#[derive(Debug)]
pub struct SchemaChecker<V = Validator> {
    validator: V,
}

impl SchemaChecker<Validator> {
    /// Create the checker with the pipeline's fixed configuration.
    ///
    /// # Errors
    ///
    /// `CheckerError::CacheDir` if the cache directory cannot be created,
    /// `CheckerError::Validator` if the validator cannot be initialized.
    pub fn new() -> Result<Self, CheckerError> {
        Self::with_cache_dir(default_cache_dir())
    }

    /// Same configuration as [`SchemaChecker::new`], caching under `dir`.
    ///
    /// `dir` is created if absent; an existing directory is reused.
    pub fn with_cache_dir(dir: impl AsRef<Path>) -> Result<Self, CheckerError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| CheckerError::CacheDir {
            path: dir.to_path_buf(),
            source,
        })?;

        Self::with_options(SCHEMA_LOCATIONS, default_options(dir.to_path_buf()))
    }

    /// Create the checker with explicit validator configuration.
    ///
    /// Unlike [`SchemaChecker::with_cache_dir`], `options.cache` must
    /// already exist.
    pub fn with_options<S: AsRef<str>>(
        locations: &[S],
        options: Options,
    ) -> Result<Self, CheckerError> {
        let validator = Validator::new(locations, options)?;
        Ok(Self::from_validator(validator))
    }
}

impl<V: ResourceValidator> SchemaChecker<V> {
    /// Wrap an existing validator.
    pub fn from_validator(validator: V) -> Self {
        Self { validator }
    }

    /// The wrapped validator.
    pub fn validator(&self) -> &V {
        &self.validator
    }
}

impl<V: ResourceValidator> Checker for SchemaChecker<V> {
    fn check(&self, _ctx: &CheckContext, resource: &Resource) -> CheckResult {
        let result = self.validator.validate_resource(&resource.to_schema_resource());

        let message = result
            .error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        CheckResult {
            check_type: CheckType::Schema,
            check_name: SCHEMA_CHECK_NAME.to_string(),
            status: map_status(result.status),
            message,
        }
    }
}

/// The pipeline's fixed validator options, caching in `cache`.
pub fn default_options(cache: PathBuf) -> Options {
    Options {
        cache: Some(cache),
        ignore_missing_schemas: false,
        strict: true,
        kubernetes_version: KUBERNETES_VERSION.to_string(),
        ..Options::default()
    }
}

/// `<temp dir>/kubeconform-cache`.
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join(CACHE_DIR_NAME)
}

/// Translate a validator status into a pipeline status.
///
/// Unknown codes map to [`Status::Empty`] with a warning.
pub fn map_status(status: kubecheck_schema::Status) -> Status {
    use kubecheck_schema::Status as Code;

    match status {
        Code::VALID => Status::Valid,
        Code::INVALID => Status::Invalid,
        Code::ERROR => Status::Error,
        Code::SKIPPED => Status::Skipped,
        Code::EMPTY => Status::Empty,
        unexpected => {
            tracing::warn!(status = %unexpected, "got unexpected status from schema validator");
            Status::Empty
        }
    }
}
