//! Exact common-node matching.
//!
//! Two routes from the same routing provider share literal node coordinates
//! wherever they travel the same roads. This module finds the first and last
//! node of route A that also appears anywhere in route B (by exact coordinate
//! equality) and locates the corresponding nodes on B.

use std::collections::HashSet;

use crate::Coordinate;

/// Boundary node indices of the shared stretch found by exact matching.
///
/// Indices satisfy `first_a <= last_a` and `first_b <= last_b`. A degenerate
/// single-node overlap (`first == last`) is valid and yields zero overlap
/// distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonNodes {
    pub first_a: usize,
    pub last_a: usize,
    pub first_b: usize,
    pub last_b: usize,
}

/// Find the first and last common nodes between two routes.
///
/// Returns `None` when the routes share no node, or when the shared nodes
/// appear in opposite travel order on B (the pair is then treated as
/// non-overlapping rather than producing an inverted range).
pub fn find_common_nodes(route_a: &[Coordinate], route_b: &[Coordinate]) -> Option<CommonNodes> {
    find_common_nodes_in(route_a, 0..route_a.len(), route_b, 0..route_b.len())
}

/// Windowed variant of [`find_common_nodes`], restricted to the given node
/// index ranges. Used to refine rectangle-approximation windows down to
/// exact shared nodes. Returned indices are into the full routes.
pub fn find_common_nodes_in(
    route_a: &[Coordinate],
    window_a: std::ops::Range<usize>,
    route_b: &[Coordinate],
    window_b: std::ops::Range<usize>,
) -> Option<CommonNodes> {
    let a = route_a.get(window_a.clone())?;
    let b = route_b.get(window_b.clone())?;
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let b_nodes: HashSet<(u64, u64)> = b.iter().map(Coordinate::bits).collect();

    let first_a = a.iter().position(|p| b_nodes.contains(&p.bits()))?;
    // A forward hit guarantees a backward hit at or after it.
    let last_a = a.iter().rposition(|p| b_nodes.contains(&p.bits()))?;

    let first_bits = a[first_a].bits();
    let last_bits = a[last_a].bits();
    let first_b = b.iter().position(|p| p.bits() == first_bits)?;
    let last_b = b.iter().rposition(|p| p.bits() == last_bits)?;

    // Shared nodes traversed in opposite order on B.
    if first_b > last_b {
        return None;
    }

    Some(CommonNodes {
        first_a: window_a.start + first_a,
        last_a: window_a.start + last_a,
        first_b: window_b.start + first_b,
        last_b: window_b.start + last_b,
    })
}
