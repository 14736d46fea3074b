//! Test groups: named test registration within one spec module, and the
//! per-case execution protocol.
//!
//! A spec module builds one [`TestGroup`], registering `(name, params?, fn)`
//! tuples. Names must be unique; a duplicate is an `AmbiguousTestName` error
//! at registration time so authoring mistakes surface immediately, not at
//! run time. Enumeration order is a contract: tests in registration order,
//! cases of one test in the order its parameter source produces.
//!
//! Execution is contained per case. A body that returns an error, panics,
//! or exceeds the caller's deadline is recorded `fail` (or `skip` for the
//! explicit marker) and can never prevent subsequent cases from running.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use std::time::{Duration, Instant};

use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::diagnostics::HarnessError;
use crate::filter::TestFilter;
use crate::fixture::{CaseAbort, Fixture};
use crate::identity::{SpecId, TestCaseId};
use crate::recorder::{Recorder, Status};
use crate::space::ParamSource;

/// A registered test body. Boxed locally: execution is single-threaded and
/// cooperative, so bodies need not be `Send`.
pub type CaseBody = Rc<dyn Fn(Fixture) -> LocalBoxFuture<'static, Result<(), CaseAbort>>>;

struct RegisteredTest {
    name: String,
    params: Option<ParamSource>,
    body: CaseBody,
}

/// The set of named tests exported by one spec module.
#[derive(Default)]
pub struct TestGroup {
    tests: Vec<RegisteredTest>,
}

impl TestGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an unparameterized test.
    pub fn test<F, Fut>(&mut self, name: impl Into<String>, body: F) -> Result<(), HarnessError>
    where
        F: Fn(Fixture) -> Fut + 'static,
        Fut: std::future::Future<Output = Result<(), CaseAbort>> + 'static,
    {
        self.register(name.into(), None, box_body(body))
    }

    /// Registers a test invoked once per combination in the given source.
    pub fn test_with_params<F, Fut>(
        &mut self,
        name: impl Into<String>,
        params: impl Into<ParamSource>,
        body: F,
    ) -> Result<(), HarnessError>
    where
        F: Fn(Fixture) -> Fut + 'static,
        Fut: std::future::Future<Output = Result<(), CaseAbort>> + 'static,
    {
        self.register(name.into(), Some(params.into()), box_body(body))
    }

    /// Registers a test against an explicit, already-expanded case list.
    pub fn test_with_cases<F, Fut>(
        &mut self,
        name: impl Into<String>,
        cases: Vec<crate::params::ParamSpec>,
        body: F,
    ) -> Result<(), HarnessError>
    where
        F: Fn(Fixture) -> Fut + 'static,
        Fut: std::future::Future<Output = Result<(), CaseAbort>> + 'static,
    {
        self.register(name.into(), Some(ParamSource::Cases(cases)), box_body(body))
    }

    fn register(
        &mut self,
        name: String,
        params: Option<ParamSource>,
        body: CaseBody,
    ) -> Result<(), HarnessError> {
        if self.tests.iter().any(|t| t.name == name) {
            return Err(HarnessError::AmbiguousTestName { name });
        }
        self.tests.push(RegisteredTest { name, params, body });
        Ok(())
    }

    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|t| t.name.as_str())
    }

    /// Expands the group into runnable cases under `spec`, narrowed by the
    /// filter when one is given. Deterministic: the listing pass and the
    /// execution pass call this with the same inputs and see the same order.
    pub fn cases(&self, spec: &SpecId, filter: Option<&TestFilter>) -> Vec<RunCase> {
        let mut selected = Vec::new();
        for test in &self.tests {
            match &test.params {
                None => {
                    let id = TestCaseId::new(spec.clone(), test.name.clone(), None);
                    if filter.map_or(true, |f| f.matches(&id)) {
                        selected.push(RunCase {
                            id,
                            body: Rc::clone(&test.body),
                        });
                    }
                }
                Some(source) => {
                    for params in source.iter() {
                        let id = TestCaseId::new(spec.clone(), test.name.clone(), Some(params));
                        if filter.map_or(true, |f| f.matches(&id)) {
                            selected.push(RunCase {
                                id,
                                body: Rc::clone(&test.body),
                            });
                        }
                    }
                }
            }
        }
        selected
    }
}

fn box_body<F, Fut>(body: F) -> CaseBody
where
    F: Fn(Fixture) -> Fut + 'static,
    Fut: std::future::Future<Output = Result<(), CaseAbort>> + 'static,
{
    Rc::new(move |fixture| body(fixture).boxed_local())
}

/// One selected, runnable case: an id bound to its registered body.
pub struct RunCase {
    pub id: TestCaseId,
    body: CaseBody,
}

impl RunCase {
    /// Executes the case: allocates the result, scopes a fresh [`Fixture`]
    /// to this invocation, awaits the body, and seals the result with the
    /// derived terminal status. The fixture is torn down unconditionally,
    /// whether the body returns, errs, panics, or times out.
    pub async fn run(&self, recorder: &Recorder, deadline: Option<Duration>) -> Status {
        let (handle, _result) = recorder.record(&self.id);
        let start = Instant::now();
        let fixture = Fixture::new(handle.clone(), self.id.params.clone());

        // A body that panics while constructing its future is still contained.
        let future = match std::panic::catch_unwind(AssertUnwindSafe(|| (self.body)(fixture))) {
            Ok(future) => future,
            Err(payload) => {
                handle.fail(&format!("panicked: {}", panic_message(payload)));
                return handle.finish(start.elapsed());
            }
        };

        let guarded = AssertUnwindSafe(future).catch_unwind();
        let outcome = match deadline {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    // The body's future is dropped here; the sealed handle
                    // additionally guards any clone that might resurface.
                    handle.fail(&format!("Timeout: deadline of {}ms exceeded", limit.as_millis()));
                    return handle.finish(start.elapsed());
                }
            },
            None => guarded.await,
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(CaseAbort::Skip(reason))) => handle.skip(&reason),
            Ok(Err(CaseAbort::Fail(message))) => handle.fail(&message),
            Err(payload) => handle.fail(&format!("panicked: {}", panic_message(payload))),
        }
        handle.finish(start.elapsed())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
