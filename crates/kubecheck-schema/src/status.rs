//! # Validation Outcomes
//!
//! [`Status`] is an open set of status codes rather than a closed enum:
//! consumers that translate it into their own vocabulary must keep a
//! fallback arm, and new codes can be added here without breaking them.

use std::fmt;

use crate::error::ResourceError;
use crate::resource::Signature;

/// Outcome code of validating one resource.
///
/// Compare against the associated constants:
///
/// ```
/// use kubecheck_schema::Status;
///
/// assert_eq!(Status::from_code(2), Status::VALID);
/// assert!(Status::from_code(42).name().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Status(u8);

impl Status {
    /// The resource could not be validated (parse failure, missing schema,
    /// registry failure, prohibited kind).
    pub const ERROR: Status = Status(0);
    /// The resource was deliberately not validated.
    pub const SKIPPED: Status = Status(1);
    /// The resource conforms to its schema.
    pub const VALID: Status = Status(2);
    /// The resource violates its schema.
    pub const INVALID: Status = Status(3);
    /// The document was empty.
    pub const EMPTY: Status = Status(4);

    /// Wrap a raw status code.
    pub const fn from_code(code: u8) -> Self {
        Self(code)
    }

    /// The raw status code.
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Canonical name of a known status, `None` for unknown codes.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::ERROR => Some("statusError"),
            Self::SKIPPED => Some("statusSkipped"),
            Self::VALID => Some("statusValid"),
            Self::INVALID => Some("statusInvalid"),
            Self::EMPTY => Some("statusEmpty"),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "status({})", self.0),
        }
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the resource.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of violations, rendered on one line joined by ` - `.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str(" - ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Result of [`Validator::validate_resource`](crate::Validator::validate_resource).
#[derive(Debug)]
pub struct ValidationResult {
    /// Outcome code.
    pub status: Status,
    /// Why the resource was not valid, when it was not.
    pub error: Option<ResourceError>,
    /// Resource identity, when it could be parsed.
    pub signature: Option<Signature>,
}

impl ValidationResult {
    pub(crate) fn valid(signature: Signature) -> Self {
        Self {
            status: Status::VALID,
            error: None,
            signature: Some(signature),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            status: Status::EMPTY,
            error: None,
            signature: None,
        }
    }

    pub(crate) fn skipped(signature: Signature) -> Self {
        Self {
            status: Status::SKIPPED,
            error: None,
            signature: Some(signature),
        }
    }

    pub(crate) fn error(error: ResourceError, signature: Option<Signature>) -> Self {
        Self {
            status: Status::ERROR,
            error: Some(error),
            signature,
        }
    }

    pub(crate) fn invalid(violations: Vec<Violation>, signature: Signature) -> Self {
        Self {
            status: Status::INVALID,
            error: Some(ResourceError::Invalid(ValidationViolations::new(violations))),
            signature: Some(signature),
        }
    }

    /// Per-field violations, empty unless the status is [`Status::INVALID`].
    pub fn violations(&self) -> &[Violation] {
        match &self.error {
            Some(ResourceError::Invalid(v)) => v.violations(),
            _ => &[],
        }
    }
}
