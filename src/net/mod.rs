//! # 1-safe Petri 网模型（Place/Transition Net）
//!
//! 设库所集合 `P` 与迁移集合 `T`。输入/输出映射 `Pre, Post ∈ {0,1}^{|P|×|T|}`
//! 始终以 `P×T` 形式保存，构造时由调用方显式给出稠密矩阵的方向。
//! 对任意标识 `M ∈ {0,1}^{|P|}`：
//!
//! * 迁移 `t` **可发生** 当且仅当 `∀p: M[p] ≥ Pre[p, t]`，且在
//!   [`EnablingRule::Safe`] 下仅作为输出的库所必须为空；
//! * 发生后 `M' = M - Pre[:, t] + Post[:, t]`，任一库所超过 1 时拒绝该次发生。
//!
//! 网可由 [`NetBuilder`]、[`DenseNet`]、PNML 文件（[`pnml`]）或 JSON/RON（[`io`]）得到，
//! 所有入口在构造结束时统一调用 [`Net::validate`]。
//!
//! ## 示例
//!
//! ```rust
//! use pn_reach::net::*;
//!
//! let mut builder = NetBuilder::new();
//! let p0 = builder.add_place(Place::new("p0").with_tokens(1));
//! let p1 = builder.add_place(Place::new("p1"));
//! let t0 = builder.add_transition(Transition::new("t0"));
//! builder.add_input_arc(p0, t0, 1);
//! builder.add_output_arc(p1, t0, 1);
//! let net = builder.build().unwrap();
//!
//! let marking = net.initial_marking();
//! assert_eq!(net.enabled_transitions(&marking, EnablingRule::Safe), vec![t0]);
//! let next = net.fire(&marking, t0, EnablingRule::Safe).unwrap();
//! assert_eq!(next.tokens(p0), 0);
//! assert_eq!(next.tokens(p1), 1);
//! ```

pub mod builder;
pub mod core;
pub mod generate;
pub mod ids;
pub mod incidence;
pub mod index_vec;
pub mod io;
pub mod pnml;
pub mod structure;

pub use builder::{DenseNet, MarkingPolicy, NetBuilder};
pub use self::core::{DiagnosticReport, EnablingRule, FireError, MatrixKind, Net, NetError, PlaceSet};
pub use ids::{PlaceId, TransitionId};
pub use incidence::{Incidence, Orientation};
pub use index_vec::{Idx, IndexVec};
pub use structure::{Arc, ArcDirection, Marking, Place, Tokens, Transition, Weight};
