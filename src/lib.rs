pub use crate::diagnostics::HarnessError;

pub mod cli;
pub mod diagnostics;
pub mod filter;
pub mod fixture;
pub mod group;
pub mod identity;
pub mod listing;
pub mod loader;
pub mod params;
pub mod recorder;
pub mod runner;
pub mod space;

pub use filter::{FilterResult, ParamFilter, TestFilter};
pub use fixture::{CaseAbort, Fixture};
pub use group::{RunCase, TestGroup};
pub use identity::{SpecId, SpecPath, TestCaseId};
pub use listing::{SpecListingEntry, Suite, SuiteBuilder};
pub use loader::{Loader, SpecModule};
pub use params::{ParamSpec, ParamValue};
pub use recorder::{CaseHandle, LogEntry, Recorder, Status, TestCaseResult, RESULT_FORMAT_VERSION};
pub use runner::{enumerate, run, RunOptions, RunSummary};
pub use space::{ParamSource, ParamSpace};
