//! 迁移关系编码：把网的输入/输出矩阵编码为当前态 `x` 与后继态 `x'` 上的一个布尔关系.
//!
//! 变量按 `x0, x0', x1, x1', …` 交错声明。每个迁移的关系为
//! `enable ∧ update ∧ frame`，整体关系为所有迁移关系的析取。
use rustc_hash::FxHashSet;
use serde::Serialize;

use super::algebra::{AlgebraError, BooleanAlgebra, conjunction};
use crate::net::{Idx, IndexVec, Marking, Net, PlaceId, PlaceSet, TransitionId};

/// Current and next-state variables of every place.
#[derive(Debug, Clone)]
pub struct VariableLayout<V> {
    pub current: IndexVec<PlaceId, V>,
    pub next: IndexVec<PlaceId, V>,
}

impl<V: Copy> VariableLayout<V> {
    pub fn places(&self) -> usize {
        self.current.len()
    }

    pub fn current_vars(&self) -> Vec<V> {
        self.current.iter().copied().collect()
    }

    pub fn next_vars(&self) -> Vec<V> {
        self.next.iter().copied().collect()
    }

    /// `(x'_p, x_p)` for every place.
    pub fn next_to_current(&self) -> Vec<(V, V)> {
        self.next
            .iter()
            .zip(self.current.iter())
            .map(|(n, c)| (*n, *c))
            .collect()
    }
}

/// Unique variable names for the places, in declaration order.
///
/// Labels lose spaces, `-` and `'`, and any other character that is not
/// alphanumeric or `_` becomes `_`; empty results become `P{i}`, and clashes get
/// an `_{i}` suffix. Each current name `n` is followed by its next-state name `n'`.
pub fn variable_names(net: &Net) -> Vec<String> {
    let mut used = FxHashSet::default();
    let mut names = Vec::with_capacity(net.places_len() * 2);
    for (place, data) in net.places().iter_enumerated() {
        let mut base: String = data
            .label()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '\'')
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        if base.is_empty() {
            base = format!("P{}", place.index());
        }
        if used.contains(&base) {
            base = format!("{base}_{}", place.index());
            while used.contains(&base) {
                base.push('_');
            }
        }
        used.insert(base.clone());
        names.push(format!("{base}'"));
        names.insert(names.len() - 1, base);
    }
    names
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EncodingStats {
    pub places: usize,
    pub transitions: usize,
    pub encoded: usize,
    pub skipped_without_arcs: usize,
    pub skipped_disabled: usize,
    pub relation_nodes: usize,
}

/// The combined relation `T_rel(x, x')` of a net.
#[derive(Debug, Clone)]
pub struct TransitionRelation<A: BooleanAlgebra> {
    pub layout: VariableLayout<A::Var>,
    pub relation: A::Value,
    pub stats: EncodingStats,
}

/// Declares the interleaved variables of `net` in `algebra`.
pub fn declare_layout<A: BooleanAlgebra>(
    algebra: &mut A,
    net: &Net,
) -> Result<VariableLayout<A::Var>, AlgebraError> {
    let vars = algebra.declare(&variable_names(net))?;
    let current = vars.iter().step_by(2).copied().collect();
    let next = vars.iter().skip(1).step_by(2).copied().collect();
    Ok(VariableLayout { current, next })
}

/// Builds the transition relation. `algebra` must not have declared variables yet.
pub fn encode<A: BooleanAlgebra>(
    algebra: &mut A,
    net: &Net,
) -> Result<TransitionRelation<A>, AlgebraError> {
    let layout = declare_layout(algebra, net)?;
    let algebra = &*algebra;

    // x_p <-> x'_p, shared by every transition that leaves p untouched
    let frames: IndexVec<PlaceId, A::Value> = layout
        .current
        .iter()
        .zip(layout.next.iter())
        .map(|(c, n)| algebra.iff(&algebra.literal(*c, true), &algebra.literal(*n, true)))
        .collect();

    let mut stats = EncodingStats {
        places: net.places_len(),
        transitions: net.transitions_len(),
        ..EncodingStats::default()
    };
    let mut relation = algebra.constant(false);

    for transition in net.transitions().indices() {
        let inputs = net.preset(transition);
        let outputs = net.postset(transition);
        if inputs.is_empty() && outputs.is_empty() {
            log::debug!("{transition:?} has no arcs, skipped");
            stats.skipped_without_arcs += 1;
            continue;
        }

        let enable = enable_clause(algebra, &layout, &inputs, &outputs);
        if algebra.is_false(&enable) {
            log::debug!("{transition:?} can never be enabled, skipped");
            stats.skipped_disabled += 1;
            continue;
        }
        let update = update_clause(algebra, &layout, &inputs, &outputs);
        let frame = frame_clause(algebra, &frames, &inputs, &outputs);
        let step = conjunction(algebra, [&enable, &update, &frame]);
        log_transition(net, transition, algebra.node_count(&step));

        relation = algebra.or(&relation, &step);
        stats.encoded += 1;
    }

    stats.relation_nodes = algebra.node_count(&relation);
    log::info!(
        "encoded {} of {} transitions ({} without arcs, {} never enabled), relation has {} nodes",
        stats.encoded,
        stats.transitions,
        stats.skipped_without_arcs,
        stats.skipped_disabled,
        stats.relation_nodes
    );

    Ok(TransitionRelation {
        layout,
        relation,
        stats,
    })
}

fn log_transition(net: &Net, transition: TransitionId, nodes: usize) {
    log::debug!(
        "encoded {:?} '{}' ({} nodes)",
        transition,
        net.transition(transition).label(),
        nodes
    );
}

/// Inputs marked; outputs that are not inputs empty.
fn enable_clause<A: BooleanAlgebra>(
    algebra: &A,
    layout: &VariableLayout<A::Var>,
    inputs: &PlaceSet,
    outputs: &PlaceSet,
) -> A::Value {
    let marked = inputs
        .iter()
        .fold(algebra.constant(true), |acc, p| {
            algebra.and(&acc, &algebra.literal(layout.current[*p], true))
        });
    outputs
        .iter()
        .filter(|p| !inputs.contains(*p))
        .fold(marked, |acc, p| {
            algebra.and(&acc, &algebra.literal(layout.current[*p], false))
        })
}

/// Outputs marked after firing, consumed-only inputs empty.
fn update_clause<A: BooleanAlgebra>(
    algebra: &A,
    layout: &VariableLayout<A::Var>,
    inputs: &PlaceSet,
    outputs: &PlaceSet,
) -> A::Value {
    let produced = outputs
        .iter()
        .fold(algebra.constant(true), |acc, p| {
            algebra.and(&acc, &algebra.literal(layout.next[*p], true))
        });
    inputs
        .iter()
        .filter(|p| !outputs.contains(*p))
        .fold(produced, |acc, p| {
            algebra.and(&acc, &algebra.literal(layout.next[*p], false))
        })
}

/// Every place outside the pre- and postset keeps its value.
fn frame_clause<A: BooleanAlgebra>(
    algebra: &A,
    frames: &IndexVec<PlaceId, A::Value>,
    inputs: &PlaceSet,
    outputs: &PlaceSet,
) -> A::Value {
    frames
        .iter_enumerated()
        .filter(|(p, _)| !inputs.contains(p) && !outputs.contains(p))
        .fold(algebra.constant(true), |acc, (_, frame)| algebra.and(&acc, frame))
}

/// The point function of `marking` over the current-state variables.
pub fn encode_marking<A: BooleanAlgebra>(
    algebra: &A,
    layout: &VariableLayout<A::Var>,
    marking: &Marking,
) -> A::Value {
    marking.iter().fold(algebra.constant(true), |acc, (place, tokens)| {
        algebra.and(&acc, &algebra.literal(layout.current[place], tokens > 0))
    })
}
