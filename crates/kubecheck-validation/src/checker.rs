//! # Checker Interface
//!
//! Every check in the pipeline implements [`Checker`]: one resource in,
//! one [`CheckResult`] out. Failures of the resource are results, not
//! errors, so the pipeline decides how to aggregate them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::resource::Resource;
use crate::result::CheckResult;

/// Cancellation and deadline carried through a pipeline run.
///
/// Clones share the cancellation flag. Checkers may consult it; the
/// schema checker does not, since its validation call cannot be
/// interrupted.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CheckContext {
    /// A context that is never done unless cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that is done once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::default(),
        }
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// A pluggable check over Kubernetes resources.
pub trait Checker: Send + Sync {
    /// Check one resource.
    fn check(&self, ctx: &CheckContext, resource: &Resource) -> CheckResult;
}

impl<C: Checker + ?Sized> Checker for Box<C> {
    fn check(&self, ctx: &CheckContext, resource: &Resource) -> CheckResult {
        (**self).check(ctx, resource)
    }
}

impl<C: Checker + ?Sized> Checker for Arc<C> {
    fn check(&self, ctx: &CheckContext, resource: &Resource) -> CheckResult {
        (**self).check(ctx, resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_not_done_until_cancelled() {
        let ctx = CheckContext::background();
        assert!(!ctx.is_done());
        assert!(ctx.deadline().is_none());

        let clone = ctx.clone();
        clone.cancel();
        assert!(ctx.is_done(), "cancel must propagate to clones");
    }

    #[test]
    fn zero_timeout_is_done_immediately() {
        let ctx = CheckContext::with_timeout(Duration::ZERO);
        assert!(ctx.is_done());
    }

    #[test]
    fn long_timeout_is_not_done() {
        let ctx = CheckContext::with_timeout(Duration::from_secs(3600));
        assert!(!ctx.is_done());
        assert!(ctx.deadline().is_some());
    }
}
