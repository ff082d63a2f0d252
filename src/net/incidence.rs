//! 输入/输出弧的关联矩阵, 统一规范化为 P×T（每行对应一个库所）.
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::core::{MatrixKind, NetError};
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::Weight;

type SmallRow<T> = SmallVec<[T; 4]>;

/// Layout of a dense matrix handed to [`Incidence::from_dense`].
///
/// The caller states the layout explicitly; shapes are validated against it and
/// never guessed from the dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// One row per place, one column per transition (`P×T`).
    PlaceMajor,
    /// One row per transition, one column per place (`T×P`).
    TransitionMajor,
}

impl Orientation {
    fn shape(self, places: usize, transitions: usize) -> (usize, usize) {
        match self {
            Orientation::PlaceMajor => (places, transitions),
            Orientation::TransitionMajor => (transitions, places),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Incidence {
    rows: IndexVec<PlaceId, SmallRow<Weight>>,
    cols: usize,
}

impl Incidence {
    pub fn zeros(places: usize, transitions: usize) -> Self {
        Self {
            rows: IndexVec::from_elem(SmallRow::from_elem(0, transitions), places),
            cols: transitions,
        }
    }

    /// Normalizes a dense matrix into `P×T` form.
    pub fn from_dense(
        kind: MatrixKind,
        dense: &[Vec<Weight>],
        orientation: Orientation,
        places: usize,
        transitions: usize,
    ) -> Result<Self, NetError> {
        let (rows, cols) = orientation.shape(places, transitions);
        if dense.len() != rows {
            return Err(NetError::RowCount {
                matrix: kind,
                orientation,
                expected: rows,
                found: dense.len(),
            });
        }
        if let Some((row, values)) = dense.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(NetError::RaggedRow {
                matrix: kind,
                row,
                expected: cols,
                found: values.len(),
            });
        }

        let mut matrix = Self::zeros(places, transitions);
        for (r, values) in dense.iter().enumerate() {
            for (c, &weight) in values.iter().enumerate() {
                let (place, transition) = match orientation {
                    Orientation::PlaceMajor => (r, c),
                    Orientation::TransitionMajor => (c, r),
                };
                matrix.set(
                    PlaceId::from_usize(place),
                    TransitionId::from_usize(transition),
                    weight,
                );
            }
        }
        Ok(matrix)
    }

    pub fn places(&self) -> usize {
        self.rows.len()
    }

    pub fn transitions(&self) -> usize {
        self.cols
    }

    /// Every row has exactly [`transitions`](Self::transitions) entries.
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.cols)
    }

    pub fn push_place(&mut self) -> PlaceId {
        self.rows.push(SmallRow::from_elem(0, self.cols))
    }

    pub fn push_transition(&mut self) -> TransitionId {
        let next = self.cols;
        for row in self.rows.iter_mut() {
            row.push(0);
        }
        self.cols += 1;
        TransitionId::from_usize(next)
    }

    pub fn get(&self, place: PlaceId, transition: TransitionId) -> Weight {
        self.rows[place][transition.index()]
    }

    pub fn set(&mut self, place: PlaceId, transition: TransitionId, value: Weight) {
        self.rows[place][transition.index()] = value;
    }

    pub fn add(&mut self, place: PlaceId, transition: TransitionId, delta: Weight) {
        let entry = &mut self.rows[place][transition.index()];
        *entry = entry.saturating_add(delta);
    }

    pub fn row(&self, place: PlaceId) -> &[Weight] {
        &self.rows[place]
    }

    /// Places with a non-zero entry in the column of `transition`, in index order.
    pub fn column_support(&self, transition: TransitionId) -> SmallRow<PlaceId> {
        self.rows
            .iter_enumerated()
            .filter(|(_, row)| row[transition.index()] > 0)
            .map(|(place, _)| place)
            .collect()
    }

    pub fn place_has_arcs(&self, place: PlaceId) -> bool {
        self.rows[place].iter().any(|w| *w > 0)
    }

    pub fn transition_has_arcs(&self, transition: TransitionId) -> bool {
        self.rows.iter().any(|row| row[transition.index()] > 0)
    }

    /// Every non-zero entry as `(place, transition, weight)`.
    pub fn entries(&self) -> impl Iterator<Item = (PlaceId, TransitionId, Weight)> {
        self.rows.iter_enumerated().flat_map(|(place, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, w)| **w > 0)
                .map(move |(t, w)| (place, TransitionId::from_usize(t), *w))
        })
    }

    /// Dense copy in the requested orientation.
    pub fn to_dense(&self, orientation: Orientation) -> Vec<Vec<Weight>> {
        match orientation {
            Orientation::PlaceMajor => self.rows.iter().map(|row| row.to_vec()).collect(),
            Orientation::TransitionMajor => (0..self.cols)
                .map(|t| self.rows.iter().map(|row| row[t]).collect())
                .collect(),
        }
    }
}

impl Default for Incidence {
    fn default() -> Self {
        Self::zeros(0, 0)
    }
}

impl fmt::Debug for Incidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Incidence")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}
