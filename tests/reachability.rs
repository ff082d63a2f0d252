mod common;

use num_bigint::BigUint;
use test_log::test;

use pn_reach::compare;
use pn_reach::config::ReachConfig;
use pn_reach::explicit::{SearchConfig, SearchStrategy, explore};
use pn_reach::net::generate::{RandomNetConfig, random_safe_net};
use pn_reach::net::{EnablingRule, Net};
use pn_reach::symbolic::{
    BddContext, BooleanAlgebra, FixpointOptions, ReachError, ReachableSet, reachable_states,
};

use common::*;

fn reach(net: &Net) -> ReachableSet<BddContext> {
    reachable_states(net, FixpointOptions::default()).unwrap()
}

fn assert_count(net: &Net, expected: u32) {
    let reachable = reach(net);
    assert_eq!(reachable.count(), &BigUint::from(expected));
    for strategy in [SearchStrategy::BreadthFirst, SearchStrategy::DepthFirst] {
        let explicit = explore(net, &SearchConfig::new(strategy));
        assert_eq!(explicit.count(), expected as usize, "{strategy}");
        assert_eq!(explicit.sorted_markings(), reachable.markings(), "{strategy}");
    }
}

#[test]
fn cycle_with_one_token() {
    let net = cycle(vec![1, 0, 0]);
    assert_count(&net, 3);
    assert_eq!(
        reach(&net).markings(),
        markings(&[&[0, 0, 1], &[0, 1, 0], &[1, 0, 0]])
    );
}

#[test]
fn cycle_with_two_tokens() {
    let net = cycle(vec![1, 0, 1]);
    assert_count(&net, 3);
    assert_eq!(
        reach(&net).markings(),
        markings(&[&[0, 1, 1], &[1, 1, 0], &[1, 0, 1]])
    );
}

#[test]
fn saturated_cycle_is_dead() {
    let net = cycle(vec![1, 1, 1]);
    assert_count(&net, 1);
    assert_eq!(reach(&net).stats().iterations, 0);
}

#[test]
fn fork_join_from_single_token() {
    let net = fork_join(vec![1, 0, 0, 0, 0, 0, 0]);
    assert_count(&net, 8);
    assert_eq!(
        reach(&net).markings(),
        markings(&[
            &[0, 0, 0, 0, 0, 0, 1],
            &[0, 0, 0, 1, 0, 1, 0],
            &[0, 0, 0, 1, 1, 0, 0],
            &[0, 0, 1, 0, 0, 1, 0],
            &[0, 0, 1, 0, 1, 0, 0],
            &[0, 1, 0, 0, 0, 1, 0],
            &[0, 1, 0, 0, 1, 0, 0],
            &[1, 0, 0, 0, 0, 0, 0],
        ])
    );
    let stats = reach(&net).encoding_stats().clone();
    assert_eq!(stats.encoded, 5);
    assert_eq!(stats.skipped_without_arcs, 3);
}

#[test]
fn fork_join_with_premarked_branch() {
    let net = fork_join(vec![1, 0, 0, 0, 0, 1, 0]);
    assert_count(&net, 6);
    assert_eq!(
        reach(&net).markings(),
        markings(&[
            &[0, 0, 0, 0, 0, 1, 1],
            &[0, 0, 0, 0, 1, 0, 1],
            &[0, 0, 0, 1, 1, 1, 0],
            &[0, 0, 1, 0, 1, 1, 0],
            &[0, 1, 0, 0, 1, 1, 0],
            &[1, 0, 0, 0, 0, 1, 0],
        ])
    );
}

#[test]
fn simple_fork_reaches_five_markings() {
    assert_count(&simple_fork(), 5);
}

#[test]
fn fork_with_loops_reaches_six_markings() {
    let net = fork_with_loops();
    assert_count(&net, 6);
    assert!(reach(&net).contains(&pn_reach::net::Marking::from(vec![1, 1, 0, 0, 0])));
}

#[test]
fn reachable_set_is_closed_and_contains_initial() {
    let net = fork_join(vec![1, 0, 0, 0, 0, 0, 0]);
    let reachable = reach(&net);
    assert!(reachable.contains(&net.initial_marking()));
    for marking in reachable.markings() {
        assert!(marking.is_safe());
        for t in net.enabled_transitions(&marking, EnablingRule::Safe) {
            let next = net.fire(&marking, t, EnablingRule::Safe).unwrap();
            assert!(reachable.contains(&next), "{marking} --{t}--> {next}");
        }
    }
}

#[test]
fn fresh_contexts_give_identical_results() {
    let net = fork_with_loops();
    let first = reach(&net);
    let second = reach(&net);
    assert_eq!(first.count(), second.count());
    assert_eq!(first.markings(), second.markings());
    assert_eq!(first.node_count(), second.node_count());
}

#[test]
fn injected_context_is_used() {
    let net = cycle(vec![1, 0, 0]);
    let reachable = pn_reach::symbolic::reachable_states_with(
        BddContext::new(),
        &net,
        FixpointOptions::default(),
    )
    .unwrap();
    // 3 places, each with a current and a next variable
    assert_eq!(reachable.algebra().num_vars(), 6);
    let count = reachable.algebra().count_satisfying(reachable.value(), 3);
    assert_eq!(count, BigUint::from(3u32));
}

#[test]
fn iteration_cap_aborts_without_result() {
    let net = fork_join(vec![1, 0, 0, 0, 0, 0, 0]);
    let result = reachable_states(
        &net,
        FixpointOptions {
            max_iterations: Some(2),
        },
    );
    assert!(matches!(result, Err(ReachError::IterationLimit { limit: 2 })));
}

#[test]
fn engines_agree_on_random_nets() {
    for seed in 0..20 {
        let config = RandomNetConfig {
            components: 3,
            component_size: 3 + (seed as usize % 3),
            shortcuts: 1,
            sync_transitions: 3,
            seed,
        };
        let net = random_safe_net(&config).unwrap();
        let outcome = compare::run(&net, &ReachConfig::default()).unwrap();
        assert!(outcome.comparison.agree, "seed {seed}");
        let bfs = &outcome.explicit[0];
        assert_eq!(bfs.sorted_markings(), outcome.reachable.markings(), "seed {seed}");
        assert!(bfs.markings.iter().all(|m| m.is_safe()));
    }
}

#[test]
fn standard_rule_oracle_matches_symbolic_count() {
    let config = ReachConfig {
        enabling_rule: EnablingRule::Standard,
        ..ReachConfig::default()
    };
    for net in [fork_with_loops(), fork_join(vec![1, 0, 0, 0, 0, 1, 0])] {
        let outcome = compare::run(&net, &config).unwrap();
        assert!(outcome.comparison.agree);
    }
}
