use bukutex::crossover::{cycle_crossover, find_cycles, is_valid_permutation, pmx};

const P1: [u32; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
const P2: [u32; 9] = [5, 4, 6, 9, 2, 3, 7, 1, 8];

#[test]
fn cycle_decomposition_of_textbook_example() {
    let cycles = find_cycles(&P1, &P2);
    assert_eq!(cycles, vec![vec![0, 4, 1, 3, 8, 7], vec![2, 5], vec![6]]);
}

#[test]
fn cycle_crossover_children() {
    let trace = cycle_crossover(&P1, &P2).unwrap();

    assert_eq!(trace.child1, vec![1, 2, 6, 4, 5, 3, 7, 8, 9]);
    assert_eq!(trace.child2, vec![5, 4, 3, 9, 2, 6, 7, 1, 8]);
    assert!(is_valid_permutation(&trace.child1));
    assert!(is_valid_permutation(&trace.child2));

    // Every position keeps the value it held in one of the parents.
    for i in 0..P1.len() {
        assert!(trace.child1[i] == P1[i] || trace.child1[i] == P2[i]);
        assert!(trace.child2[i] == P1[i] || trace.child2[i] == P2[i]);
    }
}

#[test]
fn pmx_resolves_conflicts_through_mapping() {
    let trace = pmx(&P1, &P2, 2, 5).unwrap();

    assert_eq!(trace.exchanged, vec![1, 2, 6, 9, 2, 6, 7, 8, 9]);
    assert_eq!(trace.conflicts, vec![1, 5, 8]);
    assert_eq!(trace.child, vec![1, 5, 6, 9, 2, 3, 7, 8, 4]);
    assert!(is_valid_permutation(&trace.child));

    let described: Vec<(usize, u32, u32)> = trace
        .steps
        .iter()
        .map(|s| (s.position, s.from, s.to))
        .collect();
    assert_eq!(described, vec![(1, 2, 5), (5, 6, 3), (8, 9, 4)]);
}

#[test]
fn pmx_cut_region_comes_from_other_parent() {
    let trace = pmx(&P1, &P2, 2, 5).unwrap();
    assert_eq!(&trace.child[2..5], &P2[2..5]);
}

#[test]
fn mismatched_parents_are_rejected() {
    assert!(cycle_crossover(&[1, 2, 3], &[1, 2]).is_err());
    assert!(cycle_crossover(&[1, 2, 3], &[4, 5, 6]).is_err());
    assert!(cycle_crossover(&[1, 1, 2], &[2, 1, 1]).is_err());
}

#[test]
fn invalid_cut_points_are_rejected() {
    assert!(pmx(&P1, &P2, 5, 2).is_err());
    assert!(pmx(&P1, &P2, 2, 10).is_err());
    assert!(pmx(&P1, &P2, 4, 4).is_err());
}

#[test]
fn identical_parents_yield_identity_cycles() {
    let p: [u32; 4] = [3, 1, 4, 2];
    let cycles = find_cycles(&p, &p);
    assert_eq!(cycles.len(), 4);
    let trace = cycle_crossover(&p, &p).unwrap();
    assert_eq!(trace.child1, p.to_vec());
    assert_eq!(trace.child2, p.to_vec());
}
