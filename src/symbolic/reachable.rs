//! Result of a symbolic run: the reachable set together with the context that owns it.
use num_bigint::BigUint;

use super::algebra::BooleanAlgebra;
use super::encoder::{EncodingStats, VariableLayout, encode_marking};
use super::fixpoint::FixpointStats;
use crate::net::Marking;

pub struct ReachableSet<A: BooleanAlgebra> {
    algebra: A,
    layout: VariableLayout<A::Var>,
    value: A::Value,
    count: BigUint,
    encoding: EncodingStats,
    stats: FixpointStats,
}

impl<A: BooleanAlgebra> ReachableSet<A> {
    pub(crate) fn new(
        algebra: A,
        layout: VariableLayout<A::Var>,
        value: A::Value,
        count: BigUint,
        encoding: EncodingStats,
        stats: FixpointStats,
    ) -> Self {
        Self {
            algebra,
            layout,
            value,
            count,
            encoding,
            stats,
        }
    }

    /// Number of reachable markings.
    pub fn count(&self) -> &BigUint {
        &self.count
    }

    pub fn value(&self) -> &A::Value {
        &self.value
    }

    pub fn algebra(&self) -> &A {
        &self.algebra
    }

    pub fn layout(&self) -> &VariableLayout<A::Var> {
        &self.layout
    }

    pub fn node_count(&self) -> usize {
        self.algebra.node_count(&self.value)
    }

    pub fn encoding_stats(&self) -> &EncodingStats {
        &self.encoding
    }

    pub fn stats(&self) -> &FixpointStats {
        &self.stats
    }

    pub fn contains(&self, marking: &Marking) -> bool {
        if marking.len() != self.layout.places() || !marking.is_safe() {
            return false;
        }
        let point = encode_marking(&self.algebra, &self.layout, marking);
        !self.algebra.is_false(&self.algebra.and(&point, &self.value))
    }

    /// All reachable markings, sorted.
    pub fn markings(&self) -> Vec<Marking> {
        let vars = self.layout.current_vars();
        let mut markings: Vec<Marking> = self
            .algebra
            .assignments(&self.value, &vars)
            .iter()
            .map(|bits| Marking::from_bits(bits))
            .collect();
        markings.sort();
        markings
    }
}

impl<A: BooleanAlgebra + std::fmt::Debug> std::fmt::Debug for ReachableSet<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReachableSet")
            .field("count", &self.count)
            .field("nodes", &self.node_count())
            .field("algebra", &self.algebra)
            .finish()
    }
}
