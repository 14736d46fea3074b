//! The harness command-line interface.
//!
//! The harness is a library; the binary belongs to the embedder, who owns a
//! concrete suite. An embedder's `main` hands its suite to [`run_with_suite`]
//! and returns the exit code:
//!
//! ```rust,no_run
//! use gauntlet::{Suite, TestGroup};
//!
//! fn build_suite() -> Result<Suite, gauntlet::HarnessError> {
//!     Ok(Suite::builder("demo")
//!         .spec(["smoke"], "Smoke tests.", || {
//!             let mut g = TestGroup::new();
//!             g.test("starts", |fx| async move {
//!                 fx.log("up");
//!                 Ok(())
//!             })?;
//!             Ok(g)
//!         })
//!         .build())
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     gauntlet::cli::run_with_suite(build_suite)
//! }
//! ```
//!
//! Exit code 0 iff every selected case ended pass/warn/skip and at least one
//! case was selected (unless `--allow-empty`).

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use termcolor::StandardStream;

use crate::cli::args::{Command, HarnessArgs};
use crate::diagnostics::HarnessError;
use crate::filter::TestFilter;
use crate::listing::Suite;
use crate::runner::{self, RunOptions};

pub mod args;
pub mod output;

/// The main entry point for an embedding runner.
///
/// Builds the suite, parses arguments, and dispatches. A suite whose listing
/// cannot be constructed aborts the whole invocation; that is the only
/// error class allowed to do so.
pub fn run_with_suite(build: impl FnOnce() -> Result<Suite, HarnessError>) -> ExitCode {
    let args = HarnessArgs::parse();

    let suite = match build() {
        Ok(suite) => suite,
        Err(e) => {
            eprintln!("Error: {:?}", miette::Report::new(e));
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&suite, args.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(suite: &Suite, command: Command) -> io::Result<ExitCode> {
    let mut out = StandardStream::stdout(output::stdout_color_choice());

    match command {
        Command::List { filter } => {
            let filter = match parse_filter(&filter) {
                Ok(f) => f,
                Err(code) => return Ok(code),
            };
            let ids = runner::enumerate(suite, &filter);
            for id in &ids {
                use io::Write;
                writeln!(out, "{}", id)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            filter,
            timeout_ms,
            json,
            allow_empty,
        } => {
            let filter = match parse_filter(&filter) {
                Ok(f) => f,
                Err(code) => return Ok(code),
            };
            let options = RunOptions {
                deadline: timeout_ms.map(Duration::from_millis),
            };

            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("Error: failed to start runtime: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            };
            let (recorder, summary) = runtime.block_on(runner::run(suite, &filter, &options));

            if json {
                match recorder.as_json(true) {
                    Ok(document) => println!("{}", document),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return Ok(ExitCode::FAILURE);
                    }
                }
            } else {
                let results = recorder.snapshot();
                for (name, result) in &results {
                    output::print_case(&mut out, name, result)?;
                }
                output::print_summary(&mut out, &summary)?;
                output::print_failed_recap(&mut out, &results)?;
            }

            if summary.total == 0 && !allow_empty {
                eprintln!("Error: filter selected no cases");
                return Ok(ExitCode::FAILURE);
            }
            if summary.success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn parse_filter(input: &str) -> Result<TestFilter, ExitCode> {
    TestFilter::parse(input).map_err(|e| {
        eprintln!("Error: {:?}", miette::Report::new(e));
        ExitCode::FAILURE
    })
}
