//! P/T 网静态结构元素：库所、迁移、弧与标识.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::IndexVec;

pub type Weight = u64;

/// Token count of one place. Reachable markings of a 1-safe net only hold 0 or 1.
pub type Tokens = u8;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
pub struct Place {
    /// Stable identifier, e.g. the PNML `id` attribute.
    pub key: String,
    /// Optional display name.
    pub name: Option<String>,
    pub tokens: Weight,
}

impl Place {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            tokens: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tokens(mut self, tokens: Weight) -> Self {
        self.tokens = tokens;
        self
    }

    /// The declared name, or the key when no name is present.
    pub fn label(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.key)
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Transition {
    pub key: String,
    pub name: Option<String>,
}

impl Transition {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.key)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition").field(&self.label()).finish()
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
pub struct Arc {
    pub place: PlaceId,
    pub transition: TransitionId,
    pub weight: Weight,
    pub direction: ArcDirection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArcDirection {
    PlaceToTransition,
    TransitionToPlace,
}

/// A state of the net. Equality and hashing are by value.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Marking(IndexVec<PlaceId, Tokens>);

impl Marking {
    pub fn new(tokens: IndexVec<PlaceId, Tokens>) -> Self {
        Self(tokens)
    }

    pub fn empty(places: usize) -> Self {
        Self(IndexVec::from_elem(0, places))
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        Self(bits.iter().map(|&b| Tokens::from(b)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, Tokens)> {
        self.0.iter_enumerated().map(|(place, tokens)| (place, *tokens))
    }

    pub fn tokens(&self, place: PlaceId) -> Tokens {
        self.0[place]
    }

    pub fn tokens_mut(&mut self, place: PlaceId) -> &mut Tokens {
        &mut self.0[place]
    }

    pub fn is_marked(&self, place: PlaceId) -> bool {
        self.0[place] > 0
    }

    pub fn marked_places(&self) -> impl Iterator<Item = PlaceId> {
        self.iter()
            .filter(|(_, tokens)| *tokens > 0)
            .map(|(place, _)| place)
    }

    /// Every place holds at most one token.
    pub fn is_safe(&self) -> bool {
        self.0.iter().all(|tokens| *tokens <= 1)
    }

    pub fn as_slice(&self) -> &[Tokens] {
        self.0.as_slice()
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, tokens) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{tokens}")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<Tokens>> for Marking {
    fn from(value: Vec<Tokens>) -> Self {
        Self(IndexVec::from_raw(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn markings_compare_by_value() {
        let a = Marking::from(vec![1, 0, 1]);
        let b = Marking::from_bits(&[true, false, true]);
        assert_eq!(a, b);

        let mut seen = FxHashSet::default();
        seen.insert(a);
        assert!(seen.contains(&b));
        assert_eq!(b.marked_places().collect::<Vec<_>>(), vec![PlaceId::new(0), PlaceId::new(2)]);
        assert_eq!(b.to_string(), "(1,0,1)");
    }

    #[test]
    fn safety_check_flags_double_tokens() {
        assert!(Marking::from(vec![0, 1]).is_safe());
        assert!(!Marking::from(vec![2, 0]).is_safe());
    }

    #[test]
    fn label_falls_back_to_key() {
        assert_eq!(Place::new("p7").label(), "p7");
        assert_eq!(Place::new("p7").with_name("ready").label(), "ready");
        assert_eq!(Transition::new("t1").with_name("").label(), "t1");
    }
}
