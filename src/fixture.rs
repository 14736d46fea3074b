//! The per-case fixture: logging and assertion primitives scoped to one
//! test function invocation.
//!
//! A fixture is created immediately before its case runs, owned exclusively
//! by that invocation, and discarded when the case completes. All writes go
//! through the case's [`CaseHandle`], so anything the fixture reports lands
//! in the recorder, and nothing lands anywhere once the case is terminal.

use crate::params::ParamSpec;
use crate::recorder::CaseHandle;

/// Early exit from a test body.
///
/// `Skip` is the explicit "unimplemented" marker and is a distinct outcome
/// from `Fail`; skip is never inferred from an error's message text.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseAbort {
    Skip(String),
    Fail(String),
}

impl CaseAbort {
    pub fn skip(reason: impl Into<String>) -> Self {
        CaseAbort::Skip(reason.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        CaseAbort::Fail(message.into())
    }
}

/// Per-case object handed to every test function.
pub struct Fixture {
    handle: CaseHandle,
    params: ParamSpec,
}

impl Fixture {
    pub(crate) fn new(handle: CaseHandle, params: Option<ParamSpec>) -> Self {
        Self {
            handle,
            params: params.unwrap_or_default(),
        }
    }

    /// The case's parameter bag; empty for unparameterized tests.
    pub fn params(&self) -> &ParamSpec {
        &self.params
    }

    /// Appends an informational log line.
    pub fn log(&self, message: impl Into<String>) {
        self.handle.log(message);
    }

    /// Records a warning. The case ends `warn` unless a failure occurs.
    pub fn warn(&self, message: &str) {
        self.handle.warn(message);
    }

    /// Records a failure without aborting the body.
    pub fn fail(&self, message: &str) {
        self.handle.fail(message);
    }

    /// Records a failure if `cond` is false. Returns `cond` so call sites
    /// can gate follow-on checks on it.
    pub fn expect(&self, cond: bool, message: &str) -> bool {
        if !cond {
            self.handle.fail(message);
        }
        cond
    }

    /// The explicit skip marker: `return Err(fx.skip("reason"))`.
    pub fn skip(&self, reason: impl Into<String>) -> CaseAbort {
        CaseAbort::skip(reason)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::identity::{SpecId, TestCaseId};
    use crate::params::ParamValue;
    use crate::recorder::{Recorder, Status};

    fn fixture_for(recorder: &Recorder, params: Option<ParamSpec>) -> (Fixture, CaseHandle) {
        let id = TestCaseId::new(SpecId::new("cts", ["api"]), "t", params.clone());
        let (handle, _) = recorder.record(&id);
        (Fixture::new(handle.clone(), params), handle)
    }

    #[test]
    fn expect_records_failure_and_reports_the_condition() {
        let recorder = Recorder::new();
        let (fx, handle) = fixture_for(&recorder, None);
        assert!(fx.expect(true, "fine"));
        assert!(!fx.expect(false, "broken invariant"));
        assert_eq!(handle.finish(Duration::ZERO), Status::Fail);
    }

    #[test]
    fn params_default_to_empty_for_unparameterized_cases() {
        let recorder = Recorder::new();
        let (fx, _) = fixture_for(&recorder, None);
        assert!(fx.params().is_empty());

        let params = ParamSpec::from_pairs([("x", ParamValue::Int(4))]);
        let (fx, _) = fixture_for(&recorder, Some(params));
        assert_eq!(fx.params().get("x"), Some(&ParamValue::Int(4)));
    }

    #[test]
    fn skip_marker_is_distinct_from_fail() {
        let recorder = Recorder::new();
        let (fx, _) = fixture_for(&recorder, None);
        assert_eq!(fx.skip("unimplemented"), CaseAbort::Skip("unimplemented".into()));
        assert_ne!(fx.skip("x"), CaseAbort::fail("x"));
    }
}
