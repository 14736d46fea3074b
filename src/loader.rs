//! Lazy, memoized spec module loading.
//!
//! Loading a spec is a separate, later operation than listing it. The loader
//! holds the one piece of mutable shared state in the harness: a memo table
//! from path to load outcome. A second load for the same path returns the
//! previously resolved module (or the previously observed failure) rather
//! than re-evaluating the constructor, since construction may have side
//! effects. Scheduling is single-threaded, so the table needs no locking.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::HarnessError;
use crate::group::TestGroup;
use crate::identity::{SpecId, SpecPath};
use crate::listing::Suite;

/// A loaded spec module: its address, description, and test registrations.
pub struct SpecModule {
    pub id: SpecId,
    pub description: String,
    pub group: TestGroup,
}

impl std::fmt::Debug for SpecModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecModule")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
enum LoadOutcome {
    Loaded(Rc<SpecModule>),
    Failed(Rc<str>),
}

/// Memoizing loader over one suite.
pub struct Loader<'a> {
    suite: &'a Suite,
    memo: RefCell<HashMap<SpecPath, LoadOutcome>>,
}

impl<'a> Loader<'a> {
    pub fn new(suite: &'a Suite) -> Self {
        Self {
            suite,
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn suite(&self) -> &Suite {
        self.suite
    }

    /// Loads the spec at `path`, evaluating its constructor at most once.
    ///
    /// `SpecNotFound` if no such leaf exists; `SpecLoad` if the constructor
    /// errs. Both are reported to the caller, not retried: a failed load is
    /// memoized and repeats identically.
    pub fn load(&self, path: &SpecPath) -> Result<Rc<SpecModule>, HarnessError> {
        if let Some(outcome) = self.memo.borrow().get(path) {
            return self.resolve(path, outcome.clone());
        }

        let Some(registration) = self.suite.registration(path) else {
            return Err(HarnessError::SpecNotFound {
                suite: self.suite.name().to_string(),
                path: path.clone(),
            });
        };

        let outcome = match (registration.ctor)() {
            Ok(group) => LoadOutcome::Loaded(Rc::new(SpecModule {
                id: SpecId::new(self.suite.name(), path.clone()),
                description: registration.description.clone(),
                group,
            })),
            Err(e) => LoadOutcome::Failed(Rc::from(e.to_string())),
        };
        self.memo
            .borrow_mut()
            .insert(path.clone(), outcome.clone());
        self.resolve(path, outcome)
    }

    fn resolve(
        &self,
        path: &SpecPath,
        outcome: LoadOutcome,
    ) -> Result<Rc<SpecModule>, HarnessError> {
        match outcome {
            LoadOutcome::Loaded(module) => Ok(module),
            LoadOutcome::Failed(message) => Err(HarnessError::SpecLoad {
                path: path.clone(),
                message: message.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn load_memoizes_successful_construction() {
        let calls = Rc::new(Cell::new(0u32));
        let counted = Rc::clone(&calls);
        let suite = Suite::builder("cts")
            .spec(["api"], "API spec.", move || {
                counted.set(counted.get() + 1);
                Ok(TestGroup::new())
            })
            .build();

        let loader = Loader::new(&suite);
        let path = SpecPath::from(["api"]);
        let first = loader.load(&path).unwrap();
        let second = loader.load(&path).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.id.to_string(), "cts:api");
        assert_eq!(first.description, "API spec.");
    }

    #[test]
    fn load_memoizes_failures_without_retrying() {
        let calls = Rc::new(Cell::new(0u32));
        let counted = Rc::clone(&calls);
        let suite = Suite::builder("cts")
            .spec(["bad"], "Broken spec.", move || {
                counted.set(counted.get() + 1);
                Err(HarnessError::AmbiguousTestName {
                    name: "dup".to_string(),
                })
            })
            .build();

        let loader = Loader::new(&suite);
        let path = SpecPath::from(["bad"]);
        let first = loader.load(&path).unwrap_err();
        let second = loader.load(&path).unwrap_err();
        assert_eq!(calls.get(), 1);
        assert!(matches!(first, HarnessError::SpecLoad { .. }));
        assert_eq!(first.to_string(), second.to_string());
        assert!(first.to_string().contains("dup"));
    }

    #[test]
    fn unknown_path_is_spec_not_found() {
        let suite = Suite::builder("cts").build();
        let loader = Loader::new(&suite);
        let err = loader.load(&SpecPath::from(["ghost"])).unwrap_err();
        assert!(matches!(err, HarnessError::SpecNotFound { .. }));
    }
}
