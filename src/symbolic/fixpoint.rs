//! 符号可达性不动点：以前沿集驱动的关系像计算.
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::algebra::{AlgebraError, BooleanAlgebra, Quantifier};
use super::bdd::BddContext;
use super::encoder::{TransitionRelation, encode, encode_marking};
use super::reachable::ReachableSet;
use crate::net::Net;

#[derive(Debug, Error)]
pub enum ReachError {
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
    #[error("reachability did not converge within {limit} iterations")]
    IterationLimit { limit: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixpointOptions {
    /// Largest number of image steps that may discover new markings.
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FixpointStats {
    pub iterations: usize,
    /// Number of markings discovered by each iteration.
    pub new_states: Vec<BigUint>,
    pub reachable_nodes: usize,
    pub relation_nodes: usize,
    pub elapsed: Duration,
}

/// Computes the reachable markings of `net` in a fresh decision-diagram context.
pub fn reachable_states(
    net: &Net,
    options: FixpointOptions,
) -> Result<ReachableSet<BddContext>, ReachError> {
    reachable_states_with(BddContext::new(), net, options)
}

/// Same as [`reachable_states`] with a caller-supplied, still empty, algebra.
pub fn reachable_states_with<A: BooleanAlgebra>(
    mut algebra: A,
    net: &Net,
    options: FixpointOptions,
) -> Result<ReachableSet<A>, ReachError> {
    let started = Instant::now();
    let relation = encode(&mut algebra, net)?;
    let (reachable, mut stats) = fixpoint(&algebra, net, &relation, options)?;
    stats.elapsed = started.elapsed();

    let places = relation.layout.places();
    let count = algebra.count_satisfying(&reachable, places);
    log::info!(
        "reachability: {} markings in {} iterations, {} nodes, {:?}",
        count,
        stats.iterations,
        stats.reachable_nodes,
        stats.elapsed
    );
    Ok(ReachableSet::new(
        algebra,
        relation.layout,
        reachable,
        count,
        relation.stats,
        stats,
    ))
}

fn fixpoint<A: BooleanAlgebra>(
    algebra: &A,
    net: &Net,
    relation: &TransitionRelation<A>,
    options: FixpointOptions,
) -> Result<(A::Value, FixpointStats), ReachError> {
    let layout = &relation.layout;
    let current = layout.current_vars();
    let rename = layout.next_to_current();
    let places = layout.places();

    let mut reached = encode_marking(algebra, layout, &net.initial_marking());
    let mut frontier = reached.clone();
    let mut stats = FixpointStats {
        relation_nodes: algebra.node_count(&relation.relation),
        ..FixpointStats::default()
    };

    loop {
        let step = algebra.and(&frontier, &relation.relation);
        if algebra.is_false(&step) {
            break;
        }
        let image = algebra.quantify(&step, &current, Quantifier::Exists);
        let image = algebra.substitute(&image, &rename)?;
        let new = algebra.and(&image, &algebra.not(&reached));
        if algebra.is_false(&new) {
            break;
        }
        if let Some(limit) = options.max_iterations {
            if stats.iterations >= limit {
                log::warn!("giving up after {limit} iterations");
                return Err(ReachError::IterationLimit { limit });
            }
        }

        stats.iterations += 1;
        let discovered = algebra.count_satisfying(&new, places);
        log::debug!(
            "iteration {}: {} new markings, frontier {} nodes",
            stats.iterations,
            discovered,
            algebra.node_count(&new)
        );
        stats.new_states.push(discovered);
        reached = algebra.or(&reached, &new);
        frontier = new;
    }

    stats.reachable_nodes = algebra.node_count(&reached);
    Ok((reached, stats))
}
