#![allow(dead_code)]

use pn_reach::net::{DenseNet, Marking, MarkingPolicy, Net, Orientation, Weight};

pub fn transition_major(
    places: &[&str],
    transitions: &[&str],
    input: Vec<Vec<Weight>>,
    output: Vec<Vec<Weight>>,
    initial: Vec<Weight>,
) -> Net {
    DenseNet {
        places: places.iter().map(|p| p.to_string()).collect(),
        transitions: transitions.iter().map(|t| t.to_string()).collect(),
        input,
        output,
        orientation: Orientation::TransitionMajor,
        initial,
    }
    .into_net(MarkingPolicy::Strict)
    .unwrap()
}

/// p1 -> t1 -> p2 -> t2 -> p3 -> t3 -> p1
pub fn cycle(initial: Vec<Weight>) -> Net {
    transition_major(
        &["p1", "p2", "p3"],
        &["t1", "t2", "t3"],
        vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]],
        vec![vec![0, 1, 0], vec![0, 0, 1], vec![1, 0, 0]],
        initial,
    )
}

/// Fork/join net: T1 forks P1 into two branches (P2 -> P3 -> P4 and P5 -> P6),
/// T2 joins P4 and P6 into P7. T6..T8 have no arcs.
pub fn fork_join(initial: Vec<Weight>) -> Net {
    let mut input = vec![
        vec![1, 0, 0, 0, 0, 0, 0],
        vec![0, 0, 0, 1, 0, 1, 0],
        vec![0, 1, 0, 0, 0, 0, 0],
        vec![0, 0, 1, 0, 0, 0, 0],
        vec![0, 0, 0, 0, 1, 0, 0],
    ];
    let mut output = vec![
        vec![0, 1, 0, 0, 1, 0, 0],
        vec![0, 0, 0, 0, 0, 0, 1],
        vec![0, 0, 1, 0, 0, 0, 0],
        vec![0, 0, 0, 1, 0, 0, 0],
        vec![0, 0, 0, 0, 0, 1, 0],
    ];
    input.resize(8, vec![0; 7]);
    output.resize(8, vec![0; 7]);
    transition_major(
        &["P1", "P2", "P3", "P4", "P5", "P6", "P7"],
        &["T1", "T2", "T3", "T4", "T5", "T6", "T7", "T8"],
        input,
        output,
        initial,
    )
}

/// T1 forks P1 into P2 and P3, which finish independently into P4 and P5.
pub fn simple_fork() -> Net {
    transition_major(
        &["P1", "P2", "P3", "P4", "P5"],
        &["T1", "T2", "T3"],
        vec![
            vec![1, 0, 0, 0, 0],
            vec![0, 1, 0, 0, 0],
            vec![0, 0, 1, 0, 0],
        ],
        vec![
            vec![0, 1, 1, 0, 0],
            vec![0, 0, 0, 1, 0],
            vec![0, 0, 0, 0, 1],
        ],
        vec![1, 0, 0, 0, 0],
    )
}

/// Fork with a loop back to P1 and a join that needs P4 and P5.
pub fn fork_with_loops() -> Net {
    transition_major(
        &["P1", "P2", "P3", "P4", "P5"],
        &["T1", "T2", "T3", "T4"],
        vec![
            vec![1, 0, 0, 0, 0],
            vec![0, 1, 0, 0, 0],
            vec![0, 0, 0, 1, 1],
            vec![0, 0, 1, 0, 0],
        ],
        vec![
            vec![0, 1, 1, 1, 0],
            vec![1, 0, 0, 0, 0],
            vec![1, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 1],
        ],
        vec![1, 0, 0, 0, 0],
    )
}

pub fn markings(rows: &[&[u8]]) -> Vec<Marking> {
    let mut markings: Vec<Marking> = rows.iter().map(|r| Marking::from(r.to_vec())).collect();
    markings.sort();
    markings
}
