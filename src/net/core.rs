//! 运行时: 网结构校验、可发生判定与发生语义.
use std::fmt::{self, Write as FmtWrite};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::{Incidence, Orientation};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::{Arc, ArcDirection, Marking, Place, Tokens, Transition, Weight};

pub type PlaceSet = SmallVec<[PlaceId; 4]>;

/// Which incidence matrix a structural error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    Input,
    Output,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixKind::Input => f.write_str("input"),
            MatrixKind::Output => f.write_str("output"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NetError {
    #[error("{matrix} matrix has {found} rows, expected {expected} for {orientation:?} orientation")]
    RowCount {
        matrix: MatrixKind,
        orientation: Orientation,
        expected: usize,
        found: usize,
    },
    #[error("{matrix} matrix row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        matrix: MatrixKind,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{matrix} matrix is {found_places}x{found_transitions}, net declares {places} places and {transitions} transitions")]
    MatrixShape {
        matrix: MatrixKind,
        places: usize,
        transitions: usize,
        found_places: usize,
        found_transitions: usize,
    },
    #[error("{matrix} arc between {place:?} and {transition:?} has weight {weight}, 1-safe nets only allow 0 or 1")]
    ArcWeight {
        matrix: MatrixKind,
        place: PlaceId,
        transition: TransitionId,
        weight: Weight,
    },
    #[error("initial marking of {place:?} is {tokens}, 1-safe nets only allow 0 or 1")]
    MarkingValue { place: PlaceId, tokens: Weight },
    #[error("initial marking has {found} entries but the net has {expected} places")]
    MarkingLength { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum FireError {
    #[error("transition {0:?} is out of bounds")]
    OutOfBounds(TransitionId),
    #[error("transition {0:?} is not enabled under the supplied marking")]
    NotEnabled(TransitionId),
    #[error("firing {transition:?} leaves {tokens} tokens on {place:?}")]
    Unsafe {
        transition: TransitionId,
        place: PlaceId,
        tokens: u64,
    },
}

/// Enabledness test used by explicit firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnablingRule {
    /// Inputs marked and every output-only place empty.
    #[default]
    Safe,
    /// Inputs marked only; successors that overflow a place are rejected after firing.
    Standard,
}

/// 连通性诊断报告
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    pub isolated_places: Vec<(PlaceId, String)>,
    pub isolated_transitions: Vec<(TransitionId, String)>,
    pub warnings: Vec<String>,
    pub total_places: usize,
    pub total_transitions: usize,
}

impl DiagnosticReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_places.is_empty()
            || !self.isolated_transitions.is_empty()
            || !self.warnings.is_empty()
    }
}

/// An immutable, validated 1-safe place/transition net.
///
/// Build one through [`NetBuilder`](crate::net::NetBuilder),
/// [`DenseNet`](crate::net::DenseNet) or the PNML loader.
#[derive(Clone, Serialize, Deserialize)]
pub struct Net {
    pub(crate) places: IndexVec<PlaceId, Place>,
    pub(crate) transitions: IndexVec<TransitionId, Transition>,
    pub(crate) pre: Incidence,
    pub(crate) post: Incidence,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("pre", &self.pre)
            .field("post", &self.post)
            .finish()
    }
}

impl Net {
    /// Checks the structural invariants every constructor relies on.
    pub fn validate(&self) -> Result<(), NetError> {
        let places = self.places.len();
        let transitions = self.transitions.len();
        for (kind, matrix) in [(MatrixKind::Input, &self.pre), (MatrixKind::Output, &self.post)] {
            if matrix.places() != places
                || matrix.transitions() != transitions
                || !matrix.is_rectangular()
            {
                return Err(NetError::MatrixShape {
                    matrix: kind,
                    places,
                    transitions,
                    found_places: matrix.places(),
                    found_transitions: matrix.transitions(),
                });
            }
            if let Some((place, transition, weight)) = matrix.entries().find(|(_, _, w)| *w > 1) {
                return Err(NetError::ArcWeight {
                    matrix: kind,
                    place,
                    transition,
                    weight,
                });
            }
        }
        if let Some((place, p)) = self.places.iter_enumerated().find(|(_, p)| p.tokens > 1) {
            return Err(NetError::MarkingValue {
                place,
                tokens: p.tokens,
            });
        }
        Ok(())
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn place(&self, place: PlaceId) -> &Place {
        &self.places[place]
    }

    pub fn transition(&self, transition: TransitionId) -> &Transition {
        &self.transitions[transition]
    }

    pub fn places(&self) -> &IndexVec<PlaceId, Place> {
        &self.places
    }

    pub fn transitions(&self) -> &IndexVec<TransitionId, Transition> {
        &self.transitions
    }

    pub fn incidence(&self) -> (&Incidence, &Incidence) {
        (&self.pre, &self.post)
    }

    pub fn input_weight(&self, place: PlaceId, transition: TransitionId) -> Weight {
        self.pre.get(place, transition)
    }

    pub fn output_weight(&self, place: PlaceId, transition: TransitionId) -> Weight {
        self.post.get(place, transition)
    }

    /// Input places of `transition`.
    pub fn preset(&self, transition: TransitionId) -> PlaceSet {
        self.pre.column_support(transition)
    }

    /// Output places of `transition`.
    pub fn postset(&self, transition: TransitionId) -> PlaceSet {
        self.post.column_support(transition)
    }

    pub fn arcs(&self) -> impl Iterator<Item = Arc> {
        let inputs = self.pre.entries().map(|(place, transition, weight)| Arc {
            place,
            transition,
            weight,
            direction: ArcDirection::PlaceToTransition,
        });
        let outputs = self.post.entries().map(|(place, transition, weight)| Arc {
            place,
            transition,
            weight,
            direction: ArcDirection::TransitionToPlace,
        });
        inputs.chain(outputs)
    }

    pub fn initial_marking(&self) -> Marking {
        Marking::new(
            self.places
                .iter()
                .map(|p| Tokens::try_from(p.tokens).unwrap_or(Tokens::MAX))
                .collect(),
        )
    }

    pub fn is_enabled(&self, transition: TransitionId, marking: &Marking, rule: EnablingRule) -> bool {
        if transition.index() >= self.transitions_len() {
            return false;
        }
        self.places.indices().all(|place| {
            let input = self.pre.get(place, transition);
            let tokens = Weight::from(marking.tokens(place));
            if tokens < input {
                return false;
            }
            match rule {
                EnablingRule::Safe => {
                    let output_only = input == 0 && self.post.get(place, transition) > 0;
                    !(output_only && tokens > 0)
                }
                EnablingRule::Standard => true,
            }
        })
    }

    pub fn enabled_transitions(&self, marking: &Marking, rule: EnablingRule) -> Vec<TransitionId> {
        self.transitions
            .indices()
            .filter(|&t| self.is_enabled(t, marking, rule))
            .collect()
    }

    /// Fires `transition`: subtracts the input pattern, adds the output pattern and
    /// rejects a successor that leaves any place outside `{0,1}`.
    pub fn fire(
        &self,
        marking: &Marking,
        transition: TransitionId,
        rule: EnablingRule,
    ) -> Result<Marking, FireError> {
        if transition.index() >= self.transitions_len() {
            return Err(FireError::OutOfBounds(transition));
        }
        if !self.is_enabled(transition, marking, rule) {
            return Err(FireError::NotEnabled(transition));
        }

        let mut next = marking.clone();
        for place in self.places.indices() {
            let after = Weight::from(marking.tokens(place)) - self.pre.get(place, transition)
                + self.post.get(place, transition);
            if after > 1 {
                return Err(FireError::Unsafe {
                    transition,
                    place,
                    tokens: after,
                });
            }
            *next.tokens_mut(place) = after as Tokens;
        }
        Ok(next)
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph PetriNet {{");
        let _ = writeln!(&mut dot, "    rankdir=LR;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for (place_id, place) in self.places.iter_enumerated() {
            let token = if place.tokens > 0 { "\\n●" } else { "" };
            let _ = writeln!(
                &mut dot,
                "    place_{} [label=\"{}{}\", shape=circle];",
                place_id.index(),
                escape_label(place.label()),
                token
            );
        }

        for (transition_id, transition) in self.transitions.iter_enumerated() {
            let _ = writeln!(
                &mut dot,
                "    trans_{} [label=\"{}\", shape=box];",
                transition_id.index(),
                escape_label(transition.label())
            );
        }

        for arc in self.arcs() {
            let place = format!("place_{}", arc.place.index());
            let transition = format!("trans_{}", arc.transition.index());
            let (from, to) = match arc.direction {
                ArcDirection::PlaceToTransition => (place, transition),
                ArcDirection::TransitionToPlace => (transition, place),
            };
            let _ = writeln!(&mut dot, "    {} -> {};", from, to);
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }

    /// 诊断信息：检测孤立节点以及永远无法触发的迁移
    pub fn diagnose_connectivity(&self) -> DiagnosticReport {
        let mut isolated_places = Vec::new();
        let mut isolated_transitions = Vec::new();
        let mut warnings = Vec::new();

        for (place_id, place) in self.places.iter_enumerated() {
            let consumed = self.pre.place_has_arcs(place_id);
            let produced = self.post.place_has_arcs(place_id);
            if !consumed && !produced {
                isolated_places.push((place_id, place.label().to_owned()));
            } else if !produced && place.tokens == 0 {
                warnings.push(format!(
                    "place '{}' ({:?}) has no incoming arc and starts empty, it can never be marked",
                    place.label(),
                    place_id
                ));
            }
        }

        for (trans_id, trans) in self.transitions.iter_enumerated() {
            let has_preset = self.pre.transition_has_arcs(trans_id);
            let has_postset = self.post.transition_has_arcs(trans_id);
            if !has_preset && !has_postset {
                isolated_transitions.push((trans_id, trans.label().to_owned()));
            } else if !has_preset {
                warnings.push(format!(
                    "transition '{}' ({:?}) has no input place and is enabled whenever its outputs are empty",
                    trans.label(),
                    trans_id
                ));
            }
        }

        DiagnosticReport {
            isolated_places,
            isolated_transitions,
            warnings,
            total_places: self.places_len(),
            total_transitions: self.transitions_len(),
        }
    }

    pub fn log_diagnostics(&self) {
        let report = self.diagnose_connectivity();
        if !report.has_issues() {
            log::info!(
                "net connectivity ok: {} places, {} transitions",
                report.total_places,
                report.total_transitions
            );
            return;
        }

        log::warn!(
            "net diagnostics: {} places, {} transitions",
            report.total_places,
            report.total_transitions
        );
        for (id, name) in &report.isolated_places {
            log::warn!("  isolated place [{}] {}", id.index(), name);
        }
        for (id, name) in &report.isolated_transitions {
            log::warn!("  isolated transition [{}] {}", id.index(), name);
        }
        for warning in &report.warnings {
            log::warn!("  {}", warning);
        }
    }
}

fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
