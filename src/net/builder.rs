//! 网构造器：逐个添加元素，或由稠密矩阵一次性构造，构造结束时统一校验.
use serde::{Deserialize, Serialize};

use crate::net::core::{MatrixKind, Net, NetError};
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::{Incidence, Orientation};
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Place, Transition, Weight};

/// What to do when an initial marking does not have one entry per place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingPolicy {
    /// Zero-pad or truncate to the place count and log a warning.
    #[default]
    Normalize,
    /// Reject the net with [`NetError::MarkingLength`].
    Strict,
}

impl MarkingPolicy {
    pub fn apply(self, mut marking: Vec<Weight>, places: usize) -> Result<Vec<Weight>, NetError> {
        if marking.len() == places {
            return Ok(marking);
        }
        match self {
            MarkingPolicy::Strict => Err(NetError::MarkingLength {
                expected: places,
                found: marking.len(),
            }),
            MarkingPolicy::Normalize => {
                log::warn!(
                    "initial marking has {} entries for {} places, resizing",
                    marking.len(),
                    places
                );
                marking.resize(places, 0);
                Ok(marking)
            }
        }
    }
}

/// Incremental construction of a [`Net`].
#[derive(Debug, Clone, Default)]
pub struct NetBuilder {
    places: IndexVec<PlaceId, Place>,
    transitions: IndexVec<TransitionId, Transition>,
    pre: Incidence,
    post: Incidence,
    policy: MarkingPolicy,
    initial: Option<Vec<Weight>>,
}

impl NetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MarkingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn add_place(&mut self, place: Place) -> PlaceId {
        let id = self.places.push(place);
        self.pre.push_place();
        self.post.push_place();
        id
    }

    pub fn add_transition(&mut self, transition: Transition) -> TransitionId {
        let id = self.transitions.push(transition);
        self.pre.push_transition();
        self.post.push_transition();
        id
    }

    /// 输入弧: place -> transition. Parallel arcs accumulate.
    pub fn add_input_arc(&mut self, place: PlaceId, transition: TransitionId, weight: Weight) {
        if weight > 0 {
            self.pre.add(place, transition, weight);
        }
    }

    /// 输出弧: transition -> place. Parallel arcs accumulate.
    pub fn add_output_arc(&mut self, place: PlaceId, transition: TransitionId, weight: Weight) {
        if weight > 0 {
            self.post.add(place, transition, weight);
        }
    }

    /// Overrides the per-place token counts. The length is reconciled in
    /// [`build`](Self::build) according to the builder's [`MarkingPolicy`].
    pub fn set_initial_marking(&mut self, marking: Vec<Weight>) {
        self.initial = Some(marking);
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn build(self) -> Result<Net, NetError> {
        let NetBuilder {
            mut places,
            transitions,
            pre,
            post,
            policy,
            initial,
        } = self;

        if let Some(marking) = initial {
            let marking = policy.apply(marking, places.len())?;
            for (place, tokens) in places.iter_mut().zip(marking) {
                place.tokens = tokens;
            }
        }

        let net = Net {
            places,
            transitions,
            pre,
            post,
        };
        net.validate()?;
        Ok(net)
    }
}

/// A net given as dense incidence matrices with an explicit orientation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNet {
    /// Place labels; the length fixes the place count. Empty labels fall back to `P{i}`.
    pub places: Vec<String>,
    /// Transition labels; the length fixes the transition count.
    pub transitions: Vec<String>,
    pub input: Vec<Vec<Weight>>,
    pub output: Vec<Vec<Weight>>,
    pub orientation: Orientation,
    pub initial: Vec<Weight>,
}

impl DenseNet {
    pub fn into_net(self, policy: MarkingPolicy) -> Result<Net, NetError> {
        let place_count = self.places.len();
        let transition_count = self.transitions.len();
        let pre = Incidence::from_dense(
            MatrixKind::Input,
            &self.input,
            self.orientation,
            place_count,
            transition_count,
        )?;
        let post = Incidence::from_dense(
            MatrixKind::Output,
            &self.output,
            self.orientation,
            place_count,
            transition_count,
        )?;
        let initial = policy.apply(self.initial, place_count)?;

        let places = self
            .places
            .into_iter()
            .zip(initial)
            .enumerate()
            .map(|(idx, (label, tokens))| {
                let place = if label.is_empty() {
                    Place::new(format!("P{idx}"))
                } else {
                    Place::new(label)
                };
                place.with_tokens(tokens)
            })
            .collect();
        let transitions = self
            .transitions
            .into_iter()
            .enumerate()
            .map(|(idx, label)| {
                if label.is_empty() {
                    Transition::new(format!("T{idx}"))
                } else {
                    Transition::new(label)
                }
            })
            .collect();

        let net = Net {
            places,
            transitions,
            pre,
            post,
        };
        net.validate()?;
        Ok(net)
    }
}
