//! Reachability analysis of 1-safe place/transition nets.
//!
//! The symbolic engine ([`symbolic`]) encodes a [`net::Net`] as a transition
//! relation over decision diagrams and iterates image computation to a
//! fixpoint. The explicit searches in [`explicit`] enumerate the same state
//! space and serve as an independent oracle; [`compare`] runs both.

pub mod compare;
pub mod config;
pub mod explicit;
pub mod net;
pub mod options;
pub mod symbolic;
