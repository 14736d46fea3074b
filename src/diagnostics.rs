//! Unified, `miette`-based diagnostics for the harness.
//!
//! Every failure mode the harness itself can produce is a variant of
//! [`HarnessError`]. The taxonomy splits along the lifecycle of a run:
//!
//! - **Registration-time** errors (`EmptyOptionSet`, `AmbiguousTestName`)
//!   surface while a spec module is being constructed and abort loading of
//!   that one module only.
//! - **Load-time** errors (`SpecNotFound`, `SpecLoad`) are reported to the
//!   caller; a multi-spec run continues past them.
//! - **Listing-level** faults (`ListingUnavailable`) are the only errors
//!   allowed to abort an entire run, since without a listing there is nothing
//!   to run.
//!
//! Failures *inside* a test case body are never represented here: they are
//! contained per case and recorded through the [`crate::recorder`] channel.

use miette::Diagnostic;
use thiserror::Error;

use crate::identity::SpecPath;

/// Unified error type for all harness failure modes.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("empty option set for parameter '{option}'")]
    #[diagnostic(
        code(gauntlet::empty_option_set),
        help("every declared option needs at least one value; an empty list would silently eliminate the whole parameter space")
    )]
    EmptyOptionSet { option: String },

    #[error("duplicate test name '{name}' in spec module")]
    #[diagnostic(
        code(gauntlet::ambiguous_test_name),
        help("test names must be unique within one spec module")
    )]
    AmbiguousTestName { name: String },

    #[error("spec not found: '{path}' in suite '{suite}'")]
    #[diagnostic(code(gauntlet::spec_not_found))]
    SpecNotFound { suite: String, path: SpecPath },

    #[error("spec '{path}' failed to load: {message}")]
    #[diagnostic(code(gauntlet::spec_load_error))]
    SpecLoad { path: SpecPath, message: String },

    #[error("invalid filter expression '{input}': {reason}")]
    #[diagnostic(
        code(gauntlet::filter_parse),
        help("expected 'suite[:path,segments[:test[:{{\"param\":value}} or null]]]'")
    )]
    FilterParse { input: String, reason: String },

    #[error("listing unavailable for suite '{suite}': {message}")]
    #[diagnostic(code(gauntlet::listing_unavailable))]
    ListingUnavailable { suite: String, message: String },

    #[error("failed to serialize report: {message}")]
    #[diagnostic(code(gauntlet::report_serialize))]
    ReportSerialize { message: String },
}
