//! Seeded random 1-safe nets, used to cross-check the reachability engines.
//!
//! Each component is a token ring holding exactly one token. Local transitions
//! move the token inside a ring; synchronizing transitions consume the tokens of
//! two rings at once and put each back somewhere in its own ring, so every
//! reachable marking stays 1-safe.
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::net::builder::NetBuilder;
use crate::net::core::{Net, NetError};
use crate::net::ids::PlaceId;
use crate::net::structure::{Place, Transition};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomNetConfig {
    pub components: usize,
    pub component_size: usize,
    /// Extra local jumps per component, besides the ring edges.
    pub shortcuts: usize,
    pub sync_transitions: usize,
    pub seed: u64,
}

impl Default for RandomNetConfig {
    fn default() -> Self {
        Self {
            components: 3,
            component_size: 3,
            shortcuts: 1,
            sync_transitions: 2,
            seed: 0,
        }
    }
}

pub fn random_safe_net(config: &RandomNetConfig) -> Result<Net, NetError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut builder = NetBuilder::new();
    let size = config.component_size.max(1);

    let rings: Vec<Vec<PlaceId>> = (0..config.components)
        .map(|c| {
            (0..size)
                .map(|i| {
                    let tokens = u64::from(i == 0);
                    builder.add_place(Place::new(format!("c{c}_p{i}")).with_tokens(tokens))
                })
                .collect()
        })
        .collect();

    for (c, ring) in rings.iter().enumerate() {
        if ring.len() > 1 {
            for (i, &from) in ring.iter().enumerate() {
                let to = ring[(i + 1) % ring.len()];
                let t = builder.add_transition(Transition::new(format!("c{c}_step{i}")));
                builder.add_input_arc(from, t, 1);
                builder.add_output_arc(to, t, 1);
            }
        }
        for k in 0..config.shortcuts {
            let from = ring[rng.random_range(0..ring.len())];
            let to = ring[rng.random_range(0..ring.len())];
            let t = builder.add_transition(Transition::new(format!("c{c}_jump{k}")));
            builder.add_input_arc(from, t, 1);
            builder.add_output_arc(to, t, 1);
        }
    }

    if rings.len() >= 2 {
        for k in 0..config.sync_transitions {
            let a = rng.random_range(0..rings.len());
            let b = (a + rng.random_range(1..rings.len())) % rings.len();
            let t = builder.add_transition(Transition::new(format!("sync{k}")));
            for ring in [&rings[a], &rings[b]] {
                builder.add_input_arc(ring[rng.random_range(0..ring.len())], t, 1);
                builder.add_output_arc(ring[rng.random_range(0..ring.len())], t, 1);
            }
        }
    }

    builder.build()
}
