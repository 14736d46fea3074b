//! Parameter space generation and case filtering.
//!
//! A [`ParamSpace`] is built from named option lists and expands into the
//! cartesian product of those lists, one [`ParamSpec`] per combination, in
//! odometer order: the rightmost-declared option varies fastest. The ordering
//! is a correctness contract; re-running the generator must yield the same
//! sequence bit for bit, since case indices in reports are positional.
//!
//! A [`ParamSource`] is the restartable sequence handed to test registration:
//! either a generated space, an explicit case list, or either of those
//! narrowed by a pure predicate. Sources hold no iteration cursor, so a
//! listing pass and a later execution pass see identical sequences.

use std::fmt;
use std::rc::Rc;

use crate::diagnostics::HarnessError;
use crate::params::{ParamSpec, ParamValue};

/// Pure predicate over one parameter combination.
pub type CasePredicate = Rc<dyn Fn(&ParamSpec) -> bool>;

/// A set of named option lists whose cartesian product is the parameter
/// space of one test.
#[derive(Debug, Clone, Default)]
pub struct ParamSpace {
    options: Vec<(String, Vec<ParamValue>)>,
}

impl ParamSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an option with its candidate values.
    ///
    /// An empty value list is an authoring error (`EmptyOptionSet`): it would
    /// silently eliminate the entire parameter space and mask the mistake.
    pub fn option<N, V, I>(mut self, name: N, values: I) -> Result<Self, HarnessError>
    where
        N: Into<String>,
        V: Into<ParamValue>,
        I: IntoIterator<Item = V>,
    {
        let name = name.into();
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(HarnessError::EmptyOptionSet { option: name });
        }
        self.options.push((name, values));
        Ok(self)
    }

    /// Number of combinations the space expands to.
    ///
    /// The product of zero option lists is one: the single empty combination.
    pub fn case_count(&self) -> usize {
        self.options.iter().map(|(_, vs)| vs.len()).product()
    }

    /// A fresh pass over the space, in odometer order.
    pub fn iter(&self) -> CartesianIter<'_> {
        CartesianIter {
            options: &self.options,
            indices: vec![0; self.options.len()],
            done: false,
        }
    }
}

/// Odometer iterator over a [`ParamSpace`]: the rightmost index advances
/// first and carries leftward on wraparound.
pub struct CartesianIter<'a> {
    options: &'a [(String, Vec<ParamValue>)],
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for CartesianIter<'_> {
    type Item = ParamSpec;

    fn next(&mut self) -> Option<ParamSpec> {
        if self.done {
            return None;
        }

        let mut spec = ParamSpec::new();
        for ((name, values), &i) in self.options.iter().zip(&self.indices) {
            spec.insert(name.clone(), values[i].clone());
        }

        // Advance the odometer; exhaustion when the leftmost digit carries.
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.options[pos].1.len() {
                break;
            }
            self.indices[pos] = 0;
        }

        Some(spec)
    }
}

/// A lazy, restartable sequence of parameter combinations.
#[derive(Clone)]
pub enum ParamSource {
    /// Cartesian expansion of named option lists.
    Space(ParamSpace),
    /// An explicit, already-expanded case list, in the given order.
    Cases(Vec<ParamSpec>),
    /// A source narrowed by a predicate, preserving the input order.
    Filtered(Box<ParamSource>, CasePredicate),
}

impl ParamSource {
    /// A fresh pass over the sequence. Each call restarts from the beginning
    /// and reproduces the same order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = ParamSpec> + '_> {
        match self {
            ParamSource::Space(space) => Box::new(space.iter()),
            ParamSource::Cases(cases) => Box::new(cases.iter().cloned()),
            ParamSource::Filtered(inner, pred) => {
                let pred = pred.clone();
                Box::new(inner.iter().filter(move |spec| pred(spec)))
            }
        }
    }

    /// Narrows the source to combinations the predicate accepts.
    ///
    /// Composes by logical AND: filtering twice is the same set as one filter
    /// with the conjoined predicate, in the same order. A predicate that
    /// rejects everything yields an empty sequence, not an error.
    pub fn filter_cases(self, pred: impl Fn(&ParamSpec) -> bool + 'static) -> Self {
        ParamSource::Filtered(Box::new(self), Rc::new(pred))
    }
}

impl From<ParamSpace> for ParamSource {
    fn from(space: ParamSpace) -> Self {
        ParamSource::Space(space)
    }
}

impl From<Vec<ParamSpec>> for ParamSource {
    fn from(cases: Vec<ParamSpec>) -> Self {
        ParamSource::Cases(cases)
    }
}

impl fmt::Debug for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSource::Space(space) => f.debug_tuple("Space").field(space).finish(),
            ParamSource::Cases(cases) => f.debug_tuple("Cases").field(cases).finish(),
            ParamSource::Filtered(inner, _) => {
                f.debug_tuple("Filtered").field(inner).field(&"<fn>").finish()
            }
        }
    }
}
