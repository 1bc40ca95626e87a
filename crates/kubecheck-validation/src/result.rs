//! # Check Results
//!
//! The uniform record every checker emits, whatever it checks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Family of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    /// Kubernetes schema conformance.
    Schema,
}

impl CheckType {
    /// Returns the check type identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check over one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The resource passed the check.
    Valid,
    /// The resource failed the check.
    Invalid,
    /// The check could not be carried out.
    Error,
    /// The check deliberately did not run.
    Skipped,
    /// The document was empty.
    Empty,
}

impl Status {
    /// Returns the status identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Error => "error",
            Self::Skipped => "skipped",
            Self::Empty => "empty",
        }
    }

    /// True for outcomes that should fail a pipeline run.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Invalid | Self::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one check against one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Family of the check.
    pub check_type: CheckType,
    /// Name of the checker that produced the result.
    pub check_name: String,
    /// Outcome.
    pub status: Status,
    /// Explanation; empty when there is nothing to say.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_statuses() {
        assert!(Status::Invalid.is_failure());
        assert!(Status::Error.is_failure());
        assert!(!Status::Valid.is_failure());
        assert!(!Status::Skipped.is_failure());
        assert!(!Status::Empty.is_failure());
    }

    #[test]
    fn serializes_snake_case() {
        let result = CheckResult {
            check_type: CheckType::Schema,
            check_name: "kubernetes-schema".to_string(),
            status: Status::Invalid,
            message: "bad".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["check_type"], "schema");
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["message"], "bad");
    }

    #[test]
    fn display_matches_serde_names() {
        for status in [
            Status::Valid,
            Status::Invalid,
            Status::Error,
            Status::Skipped,
            Status::Empty,
        ] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.to_string());
        }
    }
}
