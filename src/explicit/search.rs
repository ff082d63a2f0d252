//! 显式可达集枚举（BFS/DFS），用于交叉验证符号结果的基数.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::net::{EnablingRule, FireError, Marking, Net};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    BreadthFirst,
    DepthFirst,
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStrategy::BreadthFirst => f.write_str("bfs"),
            SearchStrategy::DepthFirst => f.write_str("dfs"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub strategy: SearchStrategy,
    pub rule: EnablingRule,
    /// 最多记录的状态数量. None 表示不设上限.
    pub state_limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::BreadthFirst,
            rule: EnablingRule::Safe,
            state_limit: None,
        }
    }
}

impl SearchConfig {
    pub fn new(strategy: SearchStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExplicitReachability {
    pub strategy: SearchStrategy,
    pub markings: FxHashSet<Marking>,
    /// Firings dropped because the successor left a place with more than one token.
    pub rejected_firings: usize,
    pub expanded: usize,
    pub truncated: bool,
    pub elapsed: Duration,
}

impl ExplicitReachability {
    pub fn count(&self) -> usize {
        self.markings.len()
    }

    pub fn contains(&self, marking: &Marking) -> bool {
        self.markings.contains(marking)
    }

    pub fn sorted_markings(&self) -> Vec<Marking> {
        let mut markings: Vec<Marking> = self.markings.iter().cloned().collect();
        markings.sort();
        markings
    }
}

/// Pending states: a queue for BFS, a stack for DFS.
enum Worklist {
    Queue(VecDeque<Marking>),
    Stack(Vec<Marking>),
}

impl Worklist {
    fn new(strategy: SearchStrategy) -> Self {
        match strategy {
            SearchStrategy::BreadthFirst => Worklist::Queue(VecDeque::new()),
            SearchStrategy::DepthFirst => Worklist::Stack(Vec::new()),
        }
    }

    fn push(&mut self, marking: Marking) {
        match self {
            Worklist::Queue(queue) => queue.push_back(marking),
            Worklist::Stack(stack) => stack.push(marking),
        }
    }

    fn pop(&mut self) -> Option<Marking> {
        match self {
            Worklist::Queue(queue) => queue.pop_front(),
            Worklist::Stack(stack) => stack.pop(),
        }
    }
}

pub fn explore(net: &Net, config: &SearchConfig) -> ExplicitReachability {
    let started = Instant::now();
    let mut visited = FxHashSet::default();
    let mut worklist = Worklist::new(config.strategy);
    let mut rejected_firings = 0;
    let mut expanded = 0;
    let mut truncated = false;

    let initial = net.initial_marking();
    visited.insert(initial.clone());
    worklist.push(initial);

    while let Some(marking) = worklist.pop() {
        expanded += 1;
        for transition in net.enabled_transitions(&marking, config.rule) {
            let next = match net.fire(&marking, transition, config.rule) {
                Ok(next) => next,
                Err(err @ FireError::Unsafe { .. }) => {
                    log::warn!("{} from {}: {}", config.strategy, marking, err);
                    rejected_firings += 1;
                    continue;
                }
                Err(err) => {
                    log::debug!("{}: {}", config.strategy, err);
                    continue;
                }
            };
            if visited.contains(&next) {
                continue;
            }
            if config.state_limit.is_some_and(|limit| visited.len() >= limit) {
                truncated = true;
                continue;
            }
            visited.insert(next.clone());
            worklist.push(next);
        }
    }

    let elapsed = started.elapsed();
    log::info!(
        "{}: {} markings, {} expanded, {} rejected firings{}, {:?}",
        config.strategy,
        visited.len(),
        expanded,
        rejected_firings,
        if truncated { ", truncated" } else { "" },
        elapsed
    );

    ExplicitReachability {
        strategy: config.strategy,
        markings: visited,
        rejected_firings,
        expanded,
        truncated,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{NetBuilder, Place, Transition};

    /// p0 -> t0 -> {p1, p2}; p1 -> t1 -> p3; p2 -> t2 -> p3 (second token overflows p3)
    fn overflow_net() -> Net {
        let mut b = NetBuilder::new();
        let p: Vec<_> = (0..4)
            .map(|i| b.add_place(Place::new(format!("p{i}")).with_tokens(u64::from(i == 0))))
            .collect();
        let t: Vec<_> = (0..3)
            .map(|i| b.add_transition(Transition::new(format!("t{i}"))))
            .collect();
        b.add_input_arc(p[0], t[0], 1);
        b.add_output_arc(p[1], t[0], 1);
        b.add_output_arc(p[2], t[0], 1);
        b.add_input_arc(p[1], t[1], 1);
        b.add_output_arc(p[3], t[1], 1);
        b.add_input_arc(p[2], t[2], 1);
        b.add_output_arc(p[3], t[2], 1);
        b.build().unwrap()
    }

    #[test]
    fn both_strategies_find_the_same_states() {
        let net = overflow_net();
        let bfs = explore(&net, &SearchConfig::new(SearchStrategy::BreadthFirst));
        let dfs = explore(&net, &SearchConfig::new(SearchStrategy::DepthFirst));
        // 1000, 0110, 0011, 0101
        assert_eq!(bfs.count(), 4);
        assert_eq!(bfs.markings, dfs.markings);
        assert_eq!(bfs.rejected_firings, 0);
    }

    #[test_log::test]
    fn standard_rule_rejects_overflowing_firings() {
        let net = overflow_net();
        let config = SearchConfig {
            rule: EnablingRule::Standard,
            ..SearchConfig::default()
        };
        let standard = explore(&net, &config);
        assert_eq!(standard.count(), 4);
        // from 0011 and 0101 the remaining transition would put a second token on p3
        assert_eq!(standard.rejected_firings, 2);
    }

    #[test]
    fn state_limit_truncates() {
        let config = SearchConfig {
            state_limit: Some(2),
            ..SearchConfig::default()
        };
        let result = explore(&overflow_net(), &config);
        assert!(result.truncated);
        assert_eq!(result.count(), 2);
    }
}
