//! 符号与显式可达性结果的交叉验证及耗时对比.
use std::time::Duration;

use num_bigint::BigUint;
use serde::{Serialize, Serializer};

use crate::config::ReachConfig;
use crate::explicit::{ExplicitReachability, SearchStrategy, explore};
use crate::net::Net;
use crate::symbolic::{BddContext, EncodingStats, ReachError, ReachableSet, reachable_states};

#[derive(Debug, Clone, Serialize)]
pub struct NetSummary {
    pub places: usize,
    pub transitions: usize,
    pub arcs: usize,
    pub initially_marked: usize,
}

impl NetSummary {
    pub fn of(net: &Net) -> Self {
        Self {
            places: net.places_len(),
            transitions: net.transitions_len(),
            arcs: net.arcs().count(),
            initially_marked: net.initial_marking().marked_places().count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolicRun {
    #[serde(serialize_with = "as_decimal")]
    pub count: BigUint,
    pub iterations: usize,
    pub reachable_nodes: usize,
    pub encoding: EncodingStats,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplicitRun {
    pub strategy: SearchStrategy,
    pub count: usize,
    pub expanded: usize,
    pub rejected_firings: usize,
    pub truncated: bool,
    pub elapsed_ms: f64,
}

impl From<&ExplicitReachability> for ExplicitRun {
    fn from(result: &ExplicitReachability) -> Self {
        Self {
            strategy: result.strategy,
            count: result.count(),
            expanded: result.expanded,
            rejected_firings: result.rejected_firings,
            truncated: result.truncated,
            elapsed_ms: millis(result.elapsed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub net: NetSummary,
    pub symbolic: SymbolicRun,
    pub explicit: Vec<ExplicitRun>,
    /// Every untruncated explicit run found exactly the symbolic count.
    pub agree: bool,
}

impl Comparison {
    pub fn mismatches(&self) -> impl Iterator<Item = &ExplicitRun> {
        self.explicit
            .iter()
            .filter(|run| !run.truncated && BigUint::from(run.count) != self.symbolic.count)
    }
}

pub struct Outcome {
    pub comparison: Comparison,
    pub reachable: ReachableSet<BddContext>,
    pub explicit: Vec<ExplicitReachability>,
}

/// Runs the symbolic engine and every configured explicit search on `net`.
pub fn run(net: &Net, config: &ReachConfig) -> Result<Outcome, ReachError> {
    let reachable = reachable_states(net, config.fixpoint_options())?;
    let symbolic = SymbolicRun {
        count: reachable.count().clone(),
        iterations: reachable.stats().iterations,
        reachable_nodes: reachable.node_count(),
        encoding: reachable.encoding_stats().clone(),
        elapsed_ms: millis(reachable.stats().elapsed),
    };

    let explicit: Vec<ExplicitReachability> = config
        .strategies
        .iter()
        .map(|strategy| explore(net, &config.search_config(*strategy)))
        .collect();

    let mut comparison = Comparison {
        net: NetSummary::of(net),
        symbolic,
        explicit: explicit.iter().map(ExplicitRun::from).collect(),
        agree: true,
    };
    let agree = comparison.mismatches().next().is_none();
    comparison.agree = agree;
    for run in comparison.mismatches() {
        log::error!(
            "{} found {} markings, symbolic engine found {}",
            run.strategy,
            run.count,
            comparison.symbolic.count
        );
    }

    Ok(Outcome {
        comparison,
        reachable,
        explicit,
    })
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn as_decimal<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
