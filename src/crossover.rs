//! Permutation crossover operators, traced step by step for the figure
//! renderer: cycle crossover (CX) and partially mapped crossover (PMX).

use anyhow::{Result, bail};
use std::collections::HashMap;

/// Cap on mapping hops while resolving a PMX conflict.
const MAX_MAPPING_HOPS: usize = 10;

#[derive(Debug, Clone)]
pub struct CycleTrace {
    /// Position cycles in discovery order, each starting at its lowest index.
    pub cycles: Vec<Vec<usize>>,
    /// Even-indexed cycles taken from parent 1.
    pub child1: Vec<u32>,
    /// Even-indexed cycles taken from parent 2.
    pub child2: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct PmxTrace {
    pub cut1: usize,
    pub cut2: usize,
    /// Parent 1 with the cut segment replaced by parent 2's segment.
    pub exchanged: Vec<u32>,
    /// Positions outside the cut region that duplicated a segment value.
    pub conflicts: Vec<usize>,
    pub steps: Vec<ResolutionStep>,
    pub child: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionStep {
    pub position: usize,
    pub from: u32,
    pub to: u32,
}

fn check_parents(p1: &[u32], p2: &[u32]) -> Result<()> {
    if p1.is_empty() || p1.len() != p2.len() {
        bail!("parents must be non-empty and equal length");
    }
    let mut a = p1.to_vec();
    let mut b = p2.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    if a.windows(2).any(|w| w[0] == w[1]) {
        bail!("parent 1 contains duplicate values");
    }
    if a != b {
        bail!("parents are not permutations of the same value set");
    }
    Ok(())
}

/// Decompose two parents into position cycles: starting from the first
/// unvisited position, repeatedly jump to the position in parent 1 holding
/// parent 2's value at the current position, until the start is revisited.
pub fn find_cycles(p1: &[u32], p2: &[u32]) -> Vec<Vec<usize>> {
    let index_in_p1: HashMap<u32, usize> =
        p1.iter().enumerate().map(|(i, &v)| (v, i)).collect();

    let mut visited = vec![false; p1.len()];
    let mut cycles = Vec::new();

    for start in 0..p1.len() {
        if visited[start] {
            continue;
        }
        let mut cycle = Vec::new();
        let mut current = start;
        while !visited[current] {
            visited[current] = true;
            cycle.push(current);
            current = index_in_p1[&p2[current]];
        }
        cycles.push(cycle);
    }
    cycles
}

/// Cycle crossover: both children keep every value at a position it held in
/// one of the parents, alternating the source parent per cycle.
pub fn cycle_crossover(p1: &[u32], p2: &[u32]) -> Result<CycleTrace> {
    check_parents(p1, p2)?;

    let cycles = find_cycles(p1, p2);
    let mut child1 = vec![0u32; p1.len()];
    let mut child2 = vec![0u32; p1.len()];

    for (cycle_idx, cycle) in cycles.iter().enumerate() {
        let (src1, src2) = if cycle_idx % 2 == 0 { (p1, p2) } else { (p2, p1) };
        for &pos in cycle {
            child1[pos] = src1[pos];
            child2[pos] = src2[pos];
        }
    }

    Ok(CycleTrace {
        cycles,
        child1,
        child2,
    })
}

/// Partially mapped crossover for child 1: exchange the cut segment, then
/// repair duplicates outside the cuts by following the segment value mapping
/// until the value leaves parent 2's segment.
pub fn pmx(p1: &[u32], p2: &[u32], cut1: usize, cut2: usize) -> Result<PmxTrace> {
    check_parents(p1, p2)?;
    if cut1 >= cut2 || cut2 > p1.len() {
        bail!("invalid cut points: {cut1}..{cut2} for length {}", p1.len());
    }

    let p1_segment = &p1[cut1..cut2];
    let p2_segment = &p2[cut1..cut2];

    let mut exchanged = p1.to_vec();
    exchanged[cut1..cut2].copy_from_slice(p2_segment);

    let conflicts: Vec<usize> = (0..exchanged.len())
        .filter(|&i| (i < cut1 || i >= cut2) && p2_segment.contains(&exchanged[i]))
        .collect();

    let mut mapping = HashMap::new();
    for (&a, &b) in p1_segment.iter().zip(p2_segment) {
        mapping.insert(a, b);
        mapping.insert(b, a);
    }

    let mut child = exchanged.clone();
    let mut steps = Vec::new();
    for i in 0..child.len() {
        if i >= cut1 && i < cut2 {
            continue;
        }
        let original = child[i];
        let mut current = original;
        let mut hops = 0;
        while p2_segment.contains(&current) {
            current = mapping[&current];
            hops += 1;
            if hops > MAX_MAPPING_HOPS {
                break;
            }
        }
        if current != original {
            child[i] = current;
            steps.push(ResolutionStep {
                position: i,
                from: original,
                to: current,
            });
        }
    }

    Ok(PmxTrace {
        cut1,
        cut2,
        exchanged,
        conflicts,
        steps,
        child,
    })
}

/// A chromosome is valid when it has no duplicate values.
pub fn is_valid_permutation(c: &[u32]) -> bool {
    let mut sorted = c.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).all(|w| w[0] != w[1])
}
