//! Test identity: the three-level addressing scheme.
//!
//! A suite contains spec modules addressed by [`SpecPath`]; a spec contains
//! named tests; a parameterized test expands into one case per [`ParamSpec`].
//! [`TestCaseId`] is the fully-qualified identity of one runnable case and is
//! the key under which results are recorded.
//!
//! The canonical textual form is colon-delimited:
//! `suite:path,segments:test:{"param":value}`. Path segments are joined with
//! commas; the trailing segment is the params JSON object, or the literal
//! `null` for an unparameterized case.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::params::ParamSpec;

/// An ordered sequence of path segments identifying a spec module within a
/// suite. Unique within a suite; `Ord` so it can serve as the stable listing
/// sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecPath(Vec<String>);

impl SpecPath {
    /// The empty path: the root of a suite, matching every spec as a prefix.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments<S, I>(segments: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses the comma-joined form; the empty string is the root path.
    pub fn parse(input: &str) -> Self {
        if input.is_empty() {
            return Self::root();
        }
        Self(input.split(',').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Prefix-or-equal match against another path.
    pub fn is_prefix_of(&self, other: &SpecPath) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl fmt::Display for SpecPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for SpecPath {
    fn from(segments: [S; N]) -> Self {
        Self::from_segments(segments)
    }
}

impl From<Vec<String>> for SpecPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// A spec module address: suite name plus path within the suite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecId {
    pub suite: String,
    pub path: SpecPath,
}

impl SpecId {
    pub fn new(suite: impl Into<String>, path: impl Into<SpecPath>) -> Self {
        Self {
            suite: suite.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.suite, self.path)
    }
}

/// The fully-qualified identity of one runnable case.
///
/// Two ids are equal iff spec path, test name, and every param key/value
/// match. Immutable value object.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseId {
    pub spec: SpecId,
    pub test: String,
    pub params: Option<ParamSpec>,
}

impl TestCaseId {
    pub fn new(spec: SpecId, test: impl Into<String>, params: Option<ParamSpec>) -> Self {
        Self {
            spec,
            test: test.into(),
            params,
        }
    }

    /// The canonical colon-delimited query string, used as the result key.
    pub fn query_string(&self) -> String {
        let params = match &self.params {
            Some(p) => p.to_string(),
            None => "null".to_string(),
        };
        format!("{}:{}:{}", self.spec, self.test, params)
    }
}

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn path_parse_and_display_round_trip() {
        let path = SpecPath::parse("api,operation,buffers");
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.to_string(), "api,operation,buffers");
        assert!(SpecPath::parse("").is_root());
        assert_eq!(SpecPath::root().to_string(), "");
    }

    #[test]
    fn prefix_matching_is_prefix_or_equal() {
        let group = SpecPath::from(["api"]);
        let leaf = SpecPath::from(["api", "buffers"]);
        assert!(group.is_prefix_of(&leaf));
        assert!(group.is_prefix_of(&group));
        assert!(SpecPath::root().is_prefix_of(&leaf));
        assert!(!leaf.is_prefix_of(&group));
        assert!(!SpecPath::from(["apix"]).is_prefix_of(&leaf));
    }

    #[test]
    fn paths_sort_lexicographically_by_segment() {
        let mut paths = vec![
            SpecPath::from(["b"]),
            SpecPath::from(["a", "z"]),
            SpecPath::from(["a"]),
        ];
        paths.sort();
        let rendered: Vec<String> = paths.iter().map(SpecPath::to_string).collect();
        assert_eq!(rendered, ["a", "a,z", "b"]);
    }

    #[test]
    fn query_string_pins_the_params_segment() {
        let spec = SpecId::new("cts", ["api", "buffers"]);
        let plain = TestCaseId::new(spec.clone(), "create", None);
        assert_eq!(plain.query_string(), "cts:api,buffers:create:null");

        let params = ParamSpec::from_pairs([("size", ParamValue::Int(16))]);
        let parameterized = TestCaseId::new(spec, "create", Some(params));
        assert_eq!(
            parameterized.query_string(),
            r#"cts:api,buffers:create:{"size":16}"#
        );
    }

    #[test]
    fn equality_is_structural_over_all_three_levels() {
        let spec = SpecId::new("cts", ["api"]);
        let a = TestCaseId::new(
            spec.clone(),
            "t",
            Some(ParamSpec::from_pairs([("x", ParamValue::Int(1))])),
        );
        let b = TestCaseId::new(
            spec.clone(),
            "t",
            Some(ParamSpec::from_pairs([("x", ParamValue::Int(1))])),
        );
        let c = TestCaseId::new(
            spec,
            "t",
            Some(ParamSpec::from_pairs([("x", ParamValue::Int(2))])),
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
