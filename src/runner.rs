//! The run driver: listing and execution passes over (suite, filter).
//!
//! Both passes resolve the filter against a fresh loader and visit cases in
//! the same total order: specs in listing order, tests in registration
//! order, cases in parameter-generator order. Reports correlate the two
//! passes positionally, so the orders must be identical.
//!
//! Execution is strictly sequential; one case's side effects are fully
//! flushed before the next case's fixture is constructed. A spec whose load
//! fails is not silently omitted: the run records a visible `fail` entry
//! keyed by that spec so coverage gaps show up in the report.

use std::time::Duration;

use crate::filter::TestFilter;
use crate::identity::TestCaseId;
use crate::listing::Suite;
use crate::loader::Loader;
use crate::recorder::{Recorder, Status};

/// Caller-supplied execution options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Per-case deadline. The harness imposes no timeout of its own; when
    /// set, the deadline races each test body and a loss is recorded `fail`
    /// with a `Timeout` log entry.
    pub deadline: Option<Duration>,
}

/// Aggregate outcome counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub pass: usize,
    pub warn: usize,
    pub skip: usize,
    pub fail: usize,
}

impl RunSummary {
    fn tally(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Pass => self.pass += 1,
            Status::Warn => self.warn += 1,
            Status::Skip => self.skip += 1,
            Status::Fail => self.fail += 1,
            Status::Running => {}
        }
    }

    /// True iff no case failed. Pass, warn, and skip are all acceptable.
    pub fn success(&self) -> bool {
        self.fail == 0
    }
}

// Stand-in id for a spec whose module never produced test registrations.
fn load_failure_id(spec: &crate::identity::SpecId) -> TestCaseId {
    TestCaseId::new(spec.clone(), "", None)
}

/// The listing pass: enumerates every case the filter selects, in execution
/// order, without invoking any test body. A spec that fails to load
/// contributes its stand-in id, exactly as the execution pass records it.
pub fn enumerate(suite: &Suite, filter: &TestFilter) -> Vec<TestCaseId> {
    let loader = Loader::new(suite);
    let mut ids = Vec::new();
    for matched in filter.iterate(&loader) {
        match matched.module {
            Ok(module) => {
                ids.extend(
                    module
                        .group
                        .cases(&matched.id, Some(filter))
                        .into_iter()
                        .map(|case| case.id),
                );
            }
            Err(_) => ids.push(load_failure_id(&matched.id)),
        }
    }
    ids
}

/// The execution pass: runs every selected case, one at a time, and returns
/// the recorder owning the full result set plus the aggregate summary.
///
/// Per-case failures are contained; nothing a test body does can abort the
/// run. Load failures become `fail` entries carrying the load error.
pub async fn run(suite: &Suite, filter: &TestFilter, options: &RunOptions) -> (Recorder, RunSummary) {
    let loader = Loader::new(suite);
    let recorder = Recorder::new();
    let mut summary = RunSummary::default();

    for matched in filter.iterate(&loader) {
        match matched.module {
            Ok(module) => {
                for case in module.group.cases(&matched.id, Some(filter)) {
                    let status = case.run(&recorder, options.deadline).await;
                    summary.tally(status);
                }
            }
            Err(e) => {
                let (handle, _) = recorder.record(&load_failure_id(&matched.id));
                handle.fail(&e.to_string());
                summary.tally(handle.finish(Duration::ZERO));
            }
        }
    }

    (recorder, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::TestGroup;
    use crate::space::ParamSpace;

    fn sample_suite() -> Suite {
        Suite::builder("cts")
            .spec(["alpha"], "First spec.", || {
                let mut g = TestGroup::new();
                let space = ParamSpace::new().option("x", ["a", "b"]).unwrap();
                g.test_with_params("t", space, |_fx| async { Ok(()) })?;
                Ok(g)
            })
            .spec(["beta"], "Second spec.", || {
                let mut g = TestGroup::new();
                g.test("only", |fx| async move {
                    fx.warn("flaky");
                    Ok(())
                })?;
                Ok(g)
            })
            .build()
    }

    #[tokio::test]
    async fn list_and_run_visit_identical_ordered_ids() {
        let suite = sample_suite();
        let filter = TestFilter::parse("cts").unwrap();

        let listed: Vec<String> = enumerate(&suite, &filter)
            .iter()
            .map(TestCaseId::query_string)
            .collect();
        let (recorder, summary) = run(&suite, &filter, &RunOptions::default()).await;
        let executed: Vec<String> = recorder
            .snapshot()
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        assert_eq!(listed, executed);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.pass, 2);
        assert_eq!(summary.warn, 1);
        assert!(summary.success());
    }

    #[tokio::test]
    async fn matches_is_consistent_with_iterate_expansion() {
        let suite = sample_suite();
        let all = TestFilter::parse("cts").unwrap();
        let narrowed = TestFilter::parse(r#"cts:alpha:t:{"x":"b"}"#).unwrap();

        let universe = enumerate(&suite, &all);
        let expansion = enumerate(&suite, &narrowed);
        for id in &universe {
            assert_eq!(narrowed.matches(id), expansion.contains(id));
        }
        assert_eq!(expansion.len(), 1);
    }

    #[tokio::test]
    async fn failed_spec_load_surfaces_as_fail_entry() {
        let suite = Suite::builder("cts")
            .spec(["bad"], "Never constructs.", || {
                Err(crate::HarnessError::AmbiguousTestName {
                    name: "dup".to_string(),
                })
            })
            .spec(["good"], "Still runs.", || {
                let mut g = TestGroup::new();
                g.test("t", |_fx| async { Ok(()) })?;
                Ok(g)
            })
            .build();

        let filter = TestFilter::parse("cts").unwrap();
        let (recorder, summary) = run(&suite, &filter, &RunOptions::default()).await;

        assert_eq!(summary.total, 2);
        assert_eq!(summary.fail, 1);
        assert_eq!(summary.pass, 1);

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot[0].0, "cts:bad::null");
        assert_eq!(snapshot[0].1.status, Status::Fail);
        assert!(snapshot[0].1.logs[0].message.contains("failed to load"));
    }

    #[tokio::test]
    async fn spec_not_found_is_reported_without_aborting() {
        let suite = sample_suite();
        let filter = TestFilter::parse("cts:ghost:").unwrap();
        let (recorder, summary) = run(&suite, &filter, &RunOptions::default()).await;
        assert_eq!(summary.total, 1);
        assert_eq!(summary.fail, 1);
        let snapshot = recorder.snapshot();
        assert!(snapshot[0].1.logs[0].message.contains("spec not found"));
    }
}
