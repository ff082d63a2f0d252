//! 显式可达图：节点为标识，边为迁移发生，可导出 DOT.
use std::collections::VecDeque;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use rustc_hash::FxHashMap;

use crate::net::{EnablingRule, Idx, Marking, Net, TransitionId};

#[derive(Debug, Clone)]
pub struct StateNode {
    pub index: usize,
    pub marking: Marking,
    /// Labels of the marked places.
    pub marked: Vec<String>,
}

impl StateNode {
    fn new(index: usize, marking: Marking, net: &Net) -> Self {
        let marked = marking
            .marked_places()
            .map(|place| net.place(place).label().to_owned())
            .collect();
        Self {
            index,
            marking,
            marked,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateEdge {
    pub transition: TransitionId,
    pub name: String,
}

/// 构建可达图时被拒绝的发生.
#[derive(Debug, Clone)]
pub struct TransitionFailure {
    pub source: NodeIndex,
    pub transition: TransitionId,
    pub transition_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateGraphStats {
    pub state_count: usize,
    pub edge_count: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StateGraphConfig {
    pub rule: EnablingRule,
    /// 最多探索的状态数量.None表示不设上限.
    pub state_limit: Option<usize>,
}

#[derive(Debug)]
pub struct StateGraph {
    pub graph: StableGraph<StateNode, StateEdge>,
    pub initial: NodeIndex,
    pub truncated: bool,
    pub failures: Vec<TransitionFailure>,
    pub markings: FxHashMap<Marking, NodeIndex>,
}

impl StateGraph {
    pub fn dot(&self) -> String {
        fn escape(s: &str) -> String {
            s.replace('\\', "\\\\").replace('"', "\\\"")
        }

        let edge_label = |edge: &StateEdge| format!("label=\"{}\"", escape(&edge.name));
        let node_label = |node: &StateNode| {
            let marked = if node.marked.is_empty() {
                "-".to_owned()
            } else {
                node.marked.iter().map(|name| escape(name)).join(", ")
            };
            let shape = if node.index == 0 { ", shape=doublecircle" } else { "" };
            format!("label=\"s{}\\n{}\"{}", node.index, marked, shape)
        };

        format!(
            "{:?}",
            Dot::with_attr_getters(
                &self.graph,
                &[Config::EdgeNoLabel, Config::NodeNoLabel],
                &|_, edge| edge_label(edge.weight()),
                &|_, (_, node)| node_label(node),
            )
        )
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let dot = self.dot();
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, dot)
    }

    pub fn from_net(net: &Net) -> Self {
        Self::with_config(net, StateGraphConfig::default())
    }

    pub fn with_config(net: &Net, config: StateGraphConfig) -> Self {
        let mut graph = StableGraph::new();
        let mut markings: FxHashMap<Marking, NodeIndex> = FxHashMap::default();
        let mut queue = VecDeque::new();
        let mut failures = Vec::new();
        let mut truncated = false;

        let initial_marking = net.initial_marking();
        let initial_index = graph.add_node(StateNode::new(0, initial_marking.clone(), net));
        markings.insert(initial_marking, initial_index);
        queue.push_back(initial_index);

        while let Some(state_index) = queue.pop_front() {
            let current = graph[state_index].marking.clone();
            for transition in net.enabled_transitions(&current, config.rule) {
                match net.fire(&current, transition, config.rule) {
                    Ok(next) => {
                        let target_index = match markings.entry(next) {
                            Entry::Occupied(entry) => *entry.get(),
                            Entry::Vacant(entry) => {
                                if config
                                    .state_limit
                                    .is_some_and(|limit| graph.node_count() >= limit)
                                {
                                    truncated = true;
                                    continue;
                                }
                                let node =
                                    StateNode::new(graph.node_count(), entry.key().clone(), net);
                                let index = graph.add_node(node);
                                entry.insert(index);
                                queue.push_back(index);
                                index
                            }
                        };
                        let edge = StateEdge {
                            transition,
                            name: net.transition(transition).label().to_owned(),
                        };
                        graph.add_edge(state_index, target_index, edge);
                    }
                    Err(err) => {
                        failures.push(TransitionFailure {
                            source: state_index,
                            transition,
                            transition_name: net.transition(transition).label().to_owned(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        log::debug!(
            "state graph: {} states, {} edges, {} failed firings",
            graph.node_count(),
            graph.edge_count(),
            failures.len()
        );

        Self {
            graph,
            initial: initial_index,
            truncated,
            failures,
            markings,
        }
    }

    pub fn stats(&self) -> StateGraphStats {
        StateGraphStats {
            state_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            truncated: self.truncated,
        }
    }

    pub fn node(&self, index: NodeIndex) -> &StateNode {
        &self.graph[index]
    }

    pub fn contains_marking(&self, marking: &Marking) -> bool {
        self.markings.contains_key(marking)
    }

    /// Transitions fired along the graph, by index.
    pub fn fired_transitions(&self) -> Vec<usize> {
        self.graph
            .edge_weights()
            .map(|edge| edge.transition.index())
            .sorted()
            .dedup()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{NetBuilder, Place, Transition};

    fn build_simple_net() -> Net {
        let mut b = NetBuilder::new();
        let p0 = b.add_place(Place::new("p0").with_tokens(1));
        let p1 = b.add_place(Place::new("p1"));
        let t0 = b.add_transition(Transition::new("t0"));
        let t1 = b.add_transition(Transition::new("t1").with_name("back \"home\""));
        b.add_input_arc(p0, t0, 1);
        b.add_output_arc(p1, t0, 1);
        b.add_input_arc(p1, t1, 1);
        b.add_output_arc(p0, t1, 1);
        b.build().unwrap()
    }

    #[test]
    fn graph_has_one_node_per_marking() {
        let sg = StateGraph::from_net(&build_simple_net());
        let stats = sg.stats();
        assert_eq!(stats.state_count, 2);
        assert_eq!(stats.edge_count, 2);
        assert!(!stats.truncated);
        assert!(sg.contains_marking(&Marking::from(vec![0, 1])));
        assert_eq!(sg.node(sg.initial).marked, vec!["p0".to_owned()]);
        assert_eq!(sg.fired_transitions(), vec![0, 1]);
    }

    #[test]
    fn state_limit_truncates_graph() {
        let config = StateGraphConfig {
            state_limit: Some(1),
            ..StateGraphConfig::default()
        };
        let sg = StateGraph::with_config(&build_simple_net(), config);
        assert!(sg.truncated);
        assert_eq!(sg.graph.node_count(), 1);
    }

    #[test]
    fn dot_escapes_labels() {
        let dot = StateGraph::from_net(&build_simple_net()).dot();
        assert!(dot.contains("back \\\"home\\\""));
        assert!(dot.contains("doublecircle"));
    }
}
