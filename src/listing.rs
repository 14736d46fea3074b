//! Suite listing: the catalog of spec modules, enumerable without executing
//! any test body.
//!
//! A [`Suite`] is an explicit object owning its listing; there is no ambient
//! or process-global listing state. It is built once through
//! [`SuiteBuilder`], immutable afterwards, and safely shared by reference
//! across any number of listing and filtering queries. Listing is cheap:
//! entries record a path and a description only, and the test registrations
//! behind a leaf entry are not evaluated until the loader asks for them.

use std::collections::HashMap;

use crate::diagnostics::HarnessError;
use crate::group::TestGroup;
use crate::identity::SpecPath;

/// A lazily-resolved pointer to a spec module plus a short human summary.
/// Internal group nodes may also carry an entry (a readme), with no loadable
/// module behind it.
#[derive(Debug, Clone)]
pub struct SpecListingEntry {
    pub path: SpecPath,
    pub description: String,
}

/// Deferred spec module construction. Evaluated at most once, by the loader.
pub type SpecCtor = Box<dyn Fn() -> Result<TestGroup, HarnessError>>;

pub(crate) struct SpecRegistration {
    pub(crate) description: String,
    pub(crate) ctor: SpecCtor,
}

/// A named, immutable root collection of specs.
pub struct Suite {
    name: String,
    entries: Vec<SpecListingEntry>,
    modules: HashMap<SpecPath, SpecRegistration>,
}

impl Suite {
    pub fn builder(name: impl Into<String>) -> SuiteBuilder {
        SuiteBuilder {
            name: name.into(),
            entries: Vec::new(),
            modules: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The complete listing, leaves and group readmes, in path order.
    pub fn listing(&self) -> &[SpecListingEntry] {
        &self.entries
    }

    /// Paths of loadable leaf specs, in listing order.
    pub fn spec_paths(&self) -> impl Iterator<Item = &SpecPath> {
        self.entries
            .iter()
            .map(|e| &e.path)
            .filter(|p| self.modules.contains_key(*p))
    }

    pub fn has_spec(&self, path: &SpecPath) -> bool {
        self.modules.contains_key(path)
    }

    pub(crate) fn registration(&self, path: &SpecPath) -> Option<&SpecRegistration> {
        self.modules.get(path)
    }
}

/// Builder for a [`Suite`]. Specs register a description and a deferred
/// constructor; group nodes register a readme only.
pub struct SuiteBuilder {
    name: String,
    entries: Vec<SpecListingEntry>,
    modules: HashMap<SpecPath, SpecRegistration>,
}

impl SuiteBuilder {
    /// Adds a readme-only entry for an internal group node.
    pub fn group(mut self, path: impl Into<SpecPath>, description: impl Into<String>) -> Self {
        self.entries.push(SpecListingEntry {
            path: path.into(),
            description: description.into(),
        });
        self
    }

    /// Registers a leaf spec module: a description plus a constructor that
    /// builds its test group on first load.
    pub fn spec(
        mut self,
        path: impl Into<SpecPath>,
        description: impl Into<String>,
        ctor: impl Fn() -> Result<TestGroup, HarnessError> + 'static,
    ) -> Self {
        let path = path.into();
        let description = description.into();
        self.entries.push(SpecListingEntry {
            path: path.clone(),
            description: description.clone(),
        });
        self.modules.insert(
            path,
            SpecRegistration {
                description,
                ctor: Box::new(ctor),
            },
        );
        self
    }

    /// Finalizes the suite. Entries are sorted by path, the stable listing
    /// order every enumeration and run follows.
    pub fn build(mut self) -> Suite {
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
        Suite {
            name: self.name,
            entries: self.entries,
            modules: self.modules,
        }
    }
}
