//! The filter DSL: parsing and evaluating case filters against the
//! suite → spec path → test → params hierarchy.
//!
//! Textual form, colon-delimited:
//!
//! ```text
//! suite                         every case in the suite
//! suite:path,prefix             every spec under the path prefix
//! suite:path,to,spec:           one exact spec, every test
//! suite:path,to,spec:test       one exact spec, one test
//! suite:path,to,spec:test:{..}  params constrained by the JSON object
//! suite:path,to,spec:test:null  the unparameterized case, pinned
//! ```
//!
//! An empty segment denotes "all" at that level. The colon-delimited single
//! string is the canonical form; path segments inside it are comma-joined.

use std::fmt;
use std::rc::Rc;

use crate::diagnostics::HarnessError;
use crate::identity::{SpecId, SpecPath, TestCaseId};
use crate::loader::{Loader, SpecModule};
use crate::params::ParamSpec;

/// Constraint over the params level of an id.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamFilter {
    /// The literal `null` segment: matches only the unparameterized case.
    Unparameterized,
    /// A JSON object segment: every listed key must be present with an
    /// equal value in the id's params.
    Constrain(ParamSpec),
}

/// A predicate-bearing address over TestCaseId space.
#[derive(Debug, Clone, PartialEq)]
pub enum TestFilter {
    /// A whole suite.
    Suite { suite: String },
    /// Every spec whose path starts with `prefix`.
    Group { suite: String, prefix: SpecPath },
    /// One exact spec, optionally narrowed to one test and its params.
    Spec {
        id: SpecId,
        test: Option<String>,
        params: Option<ParamFilter>,
    },
}

/// One spec matched by a filter: its id paired with the load outcome. Load
/// failure is carried, not swallowed, so the runner can record it visibly.
pub struct FilterResult {
    pub id: SpecId,
    pub module: Result<Rc<SpecModule>, HarnessError>,
}

impl TestFilter {
    /// Parses the canonical textual form.
    pub fn parse(input: &str) -> Result<TestFilter, HarnessError> {
        let bad = |reason: &str| HarnessError::FilterParse {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = input.splitn(4, ':');
        let suite = parts.next().unwrap_or_default();
        if suite.is_empty() {
            return Err(bad("missing suite name"));
        }
        let suite = suite.to_string();

        let Some(path_part) = parts.next() else {
            return Ok(TestFilter::Suite { suite });
        };
        let path = SpecPath::parse(path_part);

        let Some(test_part) = parts.next() else {
            return Ok(TestFilter::Group {
                suite,
                prefix: path,
            });
        };
        let test = (!test_part.is_empty()).then(|| test_part.to_string());

        let params = match parts.next() {
            None | Some("") => None,
            Some(_) if test.is_none() => {
                return Err(bad("a param constraint requires a test name"));
            }
            Some("null") => Some(ParamFilter::Unparameterized),
            Some(json) => Some(ParamFilter::Constrain(ParamSpec::parse(json)?)),
        };

        Ok(TestFilter::Spec {
            id: SpecId::new(suite, path),
            test,
            params,
        })
    }

    /// True iff the id falls inside this filter's address space.
    pub fn matches(&self, id: &TestCaseId) -> bool {
        match self {
            TestFilter::Suite { suite } => id.spec.suite == *suite,
            TestFilter::Group { suite, prefix } => {
                id.spec.suite == *suite && prefix.is_prefix_of(&id.spec.path)
            }
            TestFilter::Spec {
                id: spec,
                test,
                params,
            } => {
                if id.spec != *spec {
                    return false;
                }
                if let Some(test) = test {
                    if id.test != *test {
                        return false;
                    }
                }
                match params {
                    None => true,
                    Some(ParamFilter::Unparameterized) => id.params.is_none(),
                    Some(ParamFilter::Constrain(constraint)) => match &id.params {
                        Some(actual) => constraint.satisfied_by(actual),
                        None => constraint.is_empty(),
                    },
                }
            }
        }
    }

    /// True iff the spec constraint names a single exact path, letting the
    /// runner skip crawling the rest of the suite.
    pub fn definitely_one_file(&self) -> bool {
        matches!(self, TestFilter::Spec { .. })
    }

    /// The fully resolved identity, iff this filter pins spec, test, and the
    /// params segment; `None` signals that enumeration against the parameter
    /// space generator is required.
    pub fn id_if_single(&self) -> Option<TestCaseId> {
        let TestFilter::Spec {
            id,
            test: Some(test),
            params: Some(params),
        } = self
        else {
            return None;
        };
        let params = match params {
            ParamFilter::Unparameterized => None,
            ParamFilter::Constrain(spec) => Some(spec.clone()),
        };
        Some(TestCaseId::new(id.clone(), test.clone(), params))
    }

    /// Resolves the filter against the loader: one [`FilterResult`] per
    /// matching spec, in listing order. A single-file filter loads exactly
    /// that file; a wildcard drives the loader over every matching leaf.
    pub fn iterate(&self, loader: &Loader<'_>) -> Vec<FilterResult> {
        match self {
            TestFilter::Spec { id, .. } => {
                if id.suite != loader.suite().name() {
                    return Vec::new();
                }
                vec![FilterResult {
                    id: id.clone(),
                    module: loader.load(&id.path),
                }]
            }
            TestFilter::Suite { suite } | TestFilter::Group { suite, .. } => {
                if suite != loader.suite().name() {
                    return Vec::new();
                }
                let prefix = match self {
                    TestFilter::Group { prefix, .. } => prefix.clone(),
                    _ => SpecPath::root(),
                };
                loader
                    .suite()
                    .spec_paths()
                    .filter(|p| prefix.is_prefix_of(p))
                    .map(|p| FilterResult {
                        id: SpecId::new(suite.clone(), p.clone()),
                        module: loader.load(p),
                    })
                    .collect()
            }
        }
    }
}

impl fmt::Display for TestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestFilter::Suite { suite } => f.write_str(suite),
            TestFilter::Group { suite, prefix } => write!(f, "{suite}:{prefix}"),
            TestFilter::Spec { id, test, params } => {
                write!(f, "{}:{}", id, test.as_deref().unwrap_or(""))?;
                match params {
                    None => Ok(()),
                    Some(ParamFilter::Unparameterized) => write!(f, ":null"),
                    Some(ParamFilter::Constrain(spec)) => write!(f, ":{spec}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    fn id(path: &[&str], test: &str, params: Option<ParamSpec>) -> TestCaseId {
        TestCaseId::new(
            SpecId::new("cts", SpecPath::from_segments(path.iter().copied())),
            test,
            params,
        )
    }

    #[test]
    fn parse_recognizes_each_narrowing_level() {
        assert_eq!(
            TestFilter::parse("cts").unwrap(),
            TestFilter::Suite {
                suite: "cts".into()
            }
        );
        assert_eq!(
            TestFilter::parse("cts:api,buffers").unwrap(),
            TestFilter::Group {
                suite: "cts".into(),
                prefix: SpecPath::from(["api", "buffers"]),
            }
        );
        assert_eq!(
            TestFilter::parse("cts:api,buffers:").unwrap(),
            TestFilter::Spec {
                id: SpecId::new("cts", ["api", "buffers"]),
                test: None,
                params: None,
            }
        );
        assert_eq!(
            TestFilter::parse(r#"cts:api,buffers:create:{"size":16}"#).unwrap(),
            TestFilter::Spec {
                id: SpecId::new("cts", ["api", "buffers"]),
                test: Some("create".into()),
                params: Some(ParamFilter::Constrain(ParamSpec::from_pairs([(
                    "size",
                    ParamValue::Int(16)
                )]))),
            }
        );
    }

    #[test]
    fn parse_rejects_malformed_expressions() {
        assert!(TestFilter::parse("").is_err());
        assert!(TestFilter::parse(":api").is_err());
        assert!(TestFilter::parse(r#"cts:api::{"x":1}"#).is_err());
        assert!(TestFilter::parse("cts:api:t:not-json").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for text in [
            "cts",
            "cts:api",
            "cts:api,buffers:",
            "cts:api,buffers:create",
            "cts:api,buffers:create:null",
            r#"cts:api,buffers:create:{"size":16}"#,
        ] {
            let filter = TestFilter::parse(text).unwrap();
            assert_eq!(filter.to_string(), text);
        }
    }

    #[test]
    fn group_filters_match_by_path_prefix() {
        let filter = TestFilter::parse("cts:api").unwrap();
        assert!(filter.matches(&id(&["api"], "t", None)));
        assert!(filter.matches(&id(&["api", "buffers"], "t", None)));
        assert!(!filter.matches(&id(&["compat"], "t", None)));
        assert!(!filter.definitely_one_file());
    }

    #[test]
    fn spec_filters_match_exactly_and_claim_one_file() {
        let filter = TestFilter::parse("cts:api,buffers:create").unwrap();
        assert!(filter.matches(&id(&["api", "buffers"], "create", None)));
        assert!(!filter.matches(&id(&["api", "buffers", "map"], "create", None)));
        assert!(!filter.matches(&id(&["api", "buffers"], "destroy", None)));
        assert!(filter.definitely_one_file());
        // Test pinned but params not: still needs enumeration.
        assert!(filter.id_if_single().is_none());
    }

    #[test]
    fn param_constraints_are_subset_equality() {
        let filter = TestFilter::parse(r#"cts:api:t:{"mode":"copy"}"#).unwrap();
        let matching = id(
            &["api"],
            "t",
            Some(ParamSpec::from_pairs([
                ("mode", ParamValue::from("copy")),
                ("size", 8.into()),
            ])),
        );
        let other = id(
            &["api"],
            "t",
            Some(ParamSpec::from_pairs([("mode", ParamValue::from("map"))])),
        );
        assert!(filter.matches(&matching));
        assert!(!filter.matches(&other));
        assert!(!filter.matches(&id(&["api"], "t", None)));
    }

    #[test]
    fn fully_pinned_filter_resolves_to_one_id() {
        let filter = TestFilter::parse(r#"cts:api:t:{"x":1}"#).unwrap();
        assert!(filter.definitely_one_file());
        let single = filter.id_if_single().unwrap();
        assert_eq!(single.query_string(), r#"cts:api:t:{"x":1}"#);

        let unparameterized = TestFilter::parse("cts:api:t:null").unwrap();
        let single = unparameterized.id_if_single().unwrap();
        assert_eq!(single.query_string(), "cts:api:t:null");
    }
}
