//! Result recording: the sole channel through which a case reports status.
//!
//! The [`Recorder`] owns the result set for one run. [`Recorder::record`]
//! allocates a [`TestCaseResult`] in `running` state and hands back a
//! [`CaseHandle`], the write handle the fixture routes `log`/`warn`/`fail`
//! through. Status precedence is `fail` > `skip` > `warn` > `pass`; the
//! visible status transitions from `running` to a terminal value exactly once,
//! when the handle is finished. A finished handle is sealed: writes issued
//! after the case reached a terminal state (a timed-out continuation, say)
//! are no-ops.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

use crate::diagnostics::HarnessError;
use crate::identity::TestCaseId;

/// Report format version. Bump whenever the result schema changes so
/// downstream consumers can detect incompatible reports.
pub const RESULT_FORMAT_VERSION: u32 = 1;

/// Case status. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Running,
    Pass,
    Skip,
    Warn,
    Fail,
}

impl Status {
    /// True for every status that does not make a run unsuccessful.
    pub fn is_acceptable(self) -> bool {
        matches!(self, Status::Pass | Status::Warn | Status::Skip)
    }
}

// Pending severity, folded into the terminal status on finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Warn,
    Skip,
    Fail,
}

/// One structured log line: a message plus the captured backtrace, when the
/// environment provides one (`RUST_BACKTRACE`).
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl LogEntry {
    fn new(message: String) -> Self {
        let bt = Backtrace::capture();
        let stack = match bt.status() {
            BacktraceStatus::Captured => Some(bt.to_string()),
            _ => None,
        };
        Self { message, stack }
    }
}

/// The per-case result record. Retained read-only in the result set after
/// the case completes.
#[derive(Debug, Clone, Serialize)]
pub struct TestCaseResult {
    pub status: Status,
    pub timems: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogEntry>,
    #[serde(skip)]
    worst: Option<Severity>,
    #[serde(skip)]
    sealed: bool,
}

impl TestCaseResult {
    fn new() -> Self {
        Self {
            status: Status::Running,
            timems: -1.0,
            logs: Vec::new(),
            worst: None,
            sealed: false,
        }
    }

    fn raise(&mut self, severity: Severity) {
        if self.worst.map_or(true, |w| severity > w) {
            self.worst = Some(severity);
        }
    }
}

/// Shared view of one result record.
pub type SharedResult = Rc<RefCell<TestCaseResult>>;

/// Write handle bound to one case's result. Cloneable so the fixture and the
/// runner can both hold it; all writes no-op once the case is terminal.
#[derive(Clone)]
pub struct CaseHandle(SharedResult);

impl CaseHandle {
    pub fn log(&self, message: impl Into<String>) {
        let mut result = self.0.borrow_mut();
        if result.sealed {
            return;
        }
        result.logs.push(LogEntry::new(message.into()));
    }

    pub fn warn(&self, message: &str) {
        let mut result = self.0.borrow_mut();
        if result.sealed {
            return;
        }
        result.logs.push(LogEntry::new(format!("WARN: {message}")));
        result.raise(Severity::Warn);
    }

    pub fn fail(&self, message: &str) {
        let mut result = self.0.borrow_mut();
        if result.sealed {
            return;
        }
        result.logs.push(LogEntry::new(format!("FAIL: {message}")));
        result.raise(Severity::Fail);
    }

    pub fn skip(&self, reason: &str) {
        let mut result = self.0.borrow_mut();
        if result.sealed {
            return;
        }
        result.logs.push(LogEntry::new(format!("SKIP: {reason}")));
        result.raise(Severity::Skip);
    }

    /// Seals the result: records elapsed wall-clock time and folds the
    /// pending severity into the terminal status. Idempotent; the first call
    /// wins.
    pub fn finish(&self, elapsed: Duration) -> Status {
        let mut result = self.0.borrow_mut();
        if result.sealed {
            return result.status;
        }
        result.timems = elapsed.as_secs_f64() * 1000.0;
        result.status = match result.worst {
            None => Status::Pass,
            Some(Severity::Warn) => Status::Warn,
            Some(Severity::Skip) => Status::Skip,
            Some(Severity::Fail) => Status::Fail,
        };
        result.sealed = true;
        result.status
    }

    pub fn status(&self) -> Status {
        self.0.borrow().status
    }
}

/// Owner of the result set for one run: an insertion-ordered mapping from
/// serialized case id to result. Nothing outside the recorder writes to it.
#[derive(Default)]
pub struct Recorder {
    results: RefCell<Vec<(String, SharedResult)>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh `running` result keyed by the case's query string
    /// and returns the write handle plus the (read-visible) result.
    ///
    /// Re-recording the same id appends a logically new entry; it never
    /// mutates an earlier, already-terminal one.
    pub fn record(&self, id: &TestCaseId) -> (CaseHandle, SharedResult) {
        self.record_named(id.query_string())
    }

    pub fn record_named(&self, name: String) -> (CaseHandle, SharedResult) {
        let result: SharedResult = Rc::new(RefCell::new(TestCaseResult::new()));
        self.results.borrow_mut().push((name, Rc::clone(&result)));
        (CaseHandle(Rc::clone(&result)), result)
    }

    pub fn len(&self) -> usize {
        self.results.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.borrow().is_empty()
    }

    /// A point-in-time copy of the result set, in insertion order.
    pub fn snapshot(&self) -> Vec<(String, TestCaseResult)> {
        self.results
            .borrow()
            .iter()
            .map(|(name, result)| (name.clone(), result.borrow().clone()))
            .collect()
    }

    /// Serializes the run as the versioned report document
    /// `{ "version": <int>, "results": [[name, result], ...] }`.
    pub fn as_json(&self, pretty: bool) -> Result<String, HarnessError> {
        let results: Vec<serde_json::Value> = self
            .results
            .borrow()
            .iter()
            .map(|(name, result)| {
                let value = serde_json::to_value(&*result.borrow())?;
                Ok(serde_json::json!([name, value]))
            })
            .collect::<Result<_, serde_json::Error>>()
            .map_err(|e| HarnessError::ReportSerialize {
                message: e.to_string(),
            })?;
        let document = serde_json::json!({
            "version": RESULT_FORMAT_VERSION,
            "results": results,
        });
        let rendered = if pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        rendered.map_err(|e| HarnessError::ReportSerialize {
            message: e.to_string(),
        })
    }
}
