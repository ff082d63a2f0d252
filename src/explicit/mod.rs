//! 显式状态空间枚举：BFS/DFS 可达集与可达图.

pub mod search;
pub mod state_graph;

pub use search::{ExplicitReachability, SearchConfig, SearchStrategy, explore};
pub use state_graph::{StateGraph, StateGraphConfig, StateGraphStats};
