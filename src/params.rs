//! Parameter value bags for parameterized test cases.
//!
//! A [`ParamSpec`] is one concrete parameterization of a test: a mapping from
//! option name to a JSON-serializable [`ParamValue`]. Identity is structural
//! (every key and value must match) and the display form is stable: keys are
//! held in lexicographic order so the same spec always renders to the same
//! string, which downstream filtering and golden listings rely on.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::HarnessError;

/// A JSON-shaped parameter value.
///
/// Test authors legitimately need arbitrary nested option shapes, so no fixed
/// schema is imposed beyond "JSON-serializable". Integers and floats are kept
/// distinct so that `1` and `1.0` are different identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Int(n as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Float(n)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(items: Vec<ParamValue>) -> Self {
        ParamValue::List(items)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// One concrete parameterization of a test.
///
/// Immutable value object: created during expansion, structurally compared,
/// never mutated afterwards. The backing map is a `BTreeMap` so iteration and
/// serialization order is lexicographic by key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSpec(BTreeMap<String, ParamValue>);

impl ParamSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a spec from `(name, value)` pairs.
    pub fn from_pairs<N, V, I>(pairs: I) -> Self
    where
        N: Into<String>,
        V: Into<ParamValue>,
        I: IntoIterator<Item = (N, V)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Parses a spec from its JSON object form, e.g. `{"x":1,"mode":"copy"}`.
    pub fn parse(input: &str) -> Result<Self, HarnessError> {
        serde_json::from_str::<BTreeMap<String, ParamValue>>(input)
            .map(Self)
            .map_err(|e| HarnessError::FilterParse {
                input: input.to_string(),
                reason: format!("param constraint is not a JSON object: {e}"),
            })
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True iff every `(key, value)` pair in `self` is present with an equal
    /// value in `other`. Used for filter param constraints.
    pub fn satisfied_by(&self, other: &ParamSpec) -> bool {
        self.0.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Display for ParamSpec {
    /// The stable JSON object form with lexicographic keys.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable_and_lexicographic() {
        let mut a = ParamSpec::new();
        a.insert("zed", 3);
        a.insert("alpha", "x");
        assert_eq!(a.to_string(), r#"{"alpha":"x","zed":3}"#);

        let b = ParamSpec::from_pairs([("alpha", ParamValue::from("x")), ("zed", 3.into())]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn int_and_float_are_distinct_identities() {
        let a = ParamSpec::from_pairs([("n", ParamValue::Int(1))]);
        let b = ParamSpec::from_pairs([("n", ParamValue::Float(1.0))]);
        assert_ne!(a, b);
    }

    #[test]
    fn parse_round_trips_nested_shapes() {
        let text = r#"{"dims":[2,4],"fmt":{"kind":"rgba","srgb":true}}"#;
        let spec = ParamSpec::parse(text).unwrap();
        assert_eq!(spec.to_string(), text);
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(ParamSpec::parse("[1,2]").is_err());
        assert!(ParamSpec::parse("not json").is_err());
    }

    #[test]
    fn constraint_satisfaction_is_subset_equality() {
        let full = ParamSpec::from_pairs([("a", ParamValue::Int(1)), ("b", 2.into())]);
        let sub = ParamSpec::from_pairs([("a", ParamValue::Int(1))]);
        let wrong = ParamSpec::from_pairs([("a", ParamValue::Int(9))]);
        assert!(sub.satisfied_by(&full));
        assert!(!wrong.satisfied_by(&full));
        assert!(ParamSpec::new().satisfied_by(&full));
    }
}
