//! 基于决策图的符号可达性分析.
//!
//! [`encoder`] 构造迁移关系，[`fixpoint`] 迭代求像直到不动点，
//! 结果以 [`ReachableSet`] 返回并保留其所属的上下文以便后续查询。
//! 布尔函数后端通过 [`BooleanAlgebra`] 注入，默认使用 [`BddContext`]。

pub mod algebra;
pub mod bdd;
pub mod encoder;
pub mod fixpoint;
pub mod reachable;

pub use algebra::{AlgebraError, BooleanAlgebra, Quantifier};
pub use bdd::BddContext;
pub use encoder::{EncodingStats, TransitionRelation, VariableLayout, encode, encode_marking};
pub use fixpoint::{
    FixpointOptions, FixpointStats, ReachError, reachable_states, reachable_states_with,
};
pub use reachable::ReachableSet;
