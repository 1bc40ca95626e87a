//! Sequential driver running a set of checkers over a set of resources.

use crate::checker::{CheckContext, Checker};
use crate::resource::Resource;
use crate::result::CheckResult;

/// All results for one resource, in checker order.
#[derive(Debug, Clone)]
pub struct ResourceReport<'a> {
    /// The checked resource.
    pub resource: &'a Resource,
    /// One result per checker.
    pub results: Vec<CheckResult>,
}

impl ResourceReport<'_> {
    /// True if any result is a failure.
    pub fn has_failure(&self) -> bool {
        self.results.iter().any(|r| r.status.is_failure())
    }
}

/// Output of [`run_checks`].
#[derive(Debug, Clone)]
pub struct RunOutcome<'a> {
    /// Reports for the resources that were fully checked, in input order.
    pub reports: Vec<ResourceReport<'a>>,
    /// True when the context ended the run before every resource was checked.
    pub interrupted: bool,
}

impl RunOutcome<'_> {
    /// Number of reports with at least one failing result.
    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| r.has_failure()).count()
    }
}

/// Run every checker over every resource, in order.
///
/// The context is consulted before each resource; a resource is either
/// checked by every checker or not at all.
pub fn run_checks<'a>(
    ctx: &CheckContext,
    checkers: &[&dyn Checker],
    resources: &'a [Resource],
) -> RunOutcome<'a> {
    let mut reports = Vec::with_capacity(resources.len());

    for resource in resources {
        if ctx.is_done() {
            tracing::warn!(
                checked = reports.len(),
                total = resources.len(),
                "check context done, stopping"
            );
            return RunOutcome {
                reports,
                interrupted: true,
            };
        }

        let results = checkers
            .iter()
            .map(|checker| checker.check(ctx, resource))
            .collect();
        reports.push(ResourceReport { resource, results });
    }

    let outcome = RunOutcome {
        reports,
        interrupted: false,
    };
    tracing::debug!(
        resources = resources.len(),
        checkers = checkers.len(),
        failures = outcome.failures(),
        "check run complete"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{CheckType, Status};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports `Invalid` for documents mentioning "bad", `Valid` otherwise.
    struct KeywordChecker {
        calls: AtomicUsize,
        cancel_after: Option<(usize, CheckContext)>,
    }

    impl KeywordChecker {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                cancel_after: None,
            }
        }
    }

    impl Checker for KeywordChecker {
        fn check(&self, _ctx: &CheckContext, resource: &Resource) -> CheckResult {
            let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((limit, ctx)) = &self.cancel_after {
                if calls >= *limit {
                    ctx.cancel();
                }
            }
            let status = if resource.contents().contains("bad") {
                Status::Invalid
            } else {
                Status::Valid
            };
            CheckResult {
                check_type: CheckType::Schema,
                check_name: "keyword".to_string(),
                status,
                message: String::new(),
            }
        }
    }

    fn resources() -> Vec<Resource> {
        Resource::split_stream("a.yaml", "kind: A\n---\nkind: bad\n---\nkind: C\n")
    }

    #[test]
    fn every_checker_runs_on_every_resource() {
        let resources = resources();
        let first = KeywordChecker::new();
        let second = KeywordChecker::new();
        let outcome = run_checks(&CheckContext::background(), &[&first, &second], &resources);

        assert!(!outcome.interrupted);
        assert_eq!(outcome.reports.len(), 3);
        assert!(outcome.reports.iter().all(|r| r.results.len() == 2));
        assert_eq!(outcome.failures(), 1);
        assert!(outcome.reports[1].has_failure());
        assert_eq!(first.calls.load(Ordering::SeqCst), 3);
        assert_eq!(second.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn done_context_checks_nothing() {
        let resources = resources();
        let checker = KeywordChecker::new();
        let outcome = run_checks(
            &CheckContext::with_timeout(std::time::Duration::ZERO),
            &[&checker],
            &resources,
        );
        assert!(outcome.interrupted);
        assert!(outcome.reports.is_empty());
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancellation_stops_between_resources() {
        let resources = resources();
        let ctx = CheckContext::background();
        let checker = KeywordChecker {
            calls: AtomicUsize::new(0),
            cancel_after: Some((2, ctx.clone())),
        };
        let outcome = run_checks(&ctx, &[&checker], &resources);
        assert!(outcome.interrupted);
        assert_eq!(outcome.reports.len(), 2);
    }
}
