//! Projection of a buffer intersection back onto the road polyline.
//!
//! The buffer intersection is an area; the "exact" buffer mode needs node
//! boundaries on each route. This module walks a route through the
//! intersection boundary, records every crossing in travel order, and snaps
//! the outermost crossings (earliest entry, latest exit) to the nearest
//! route nodes.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Contains, Coord, Line, MultiPolygon, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geo_utils::PlaneProjection;
use crate::Coordinate;

/// A point where the route crosses the intersection boundary, ordered by
/// travel position.
#[derive(Debug, Clone, Copy)]
struct Crossing {
    segment: usize,
    /// Position along the segment in [0, 1].
    t: f64,
    coord: Coord<f64>,
}

/// Route node in the plane, indexed for nearest-neighbor snapping.
struct IndexedNode {
    index: usize,
    x: f64,
    y: f64,
}

impl RTreeObject for IndexedNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for IndexedNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Find the node range of `route` covered by the buffer intersection.
///
/// Returns `Some((entry_node, exit_node))` with `entry_node <= exit_node`.
/// A route end lying inside the intersection pins that boundary to the
/// route end itself; otherwise it comes from the outermost crossing in
/// travel order. A route that never crosses the boundary is either fully
/// inside (full-route range) or fully outside (`None`).
pub fn project_intersection_onto_route(
    route: &[Coordinate],
    intersection: &MultiPolygon<f64>,
    projection: &PlaneProjection,
) -> Option<(usize, usize)> {
    if route.len() < 2 || intersection.0.is_empty() {
        return None;
    }

    let plane = projection.project_polyline(route);
    let last_node = route.len() - 1;
    let starts_inside = intersection.contains(&Point::new(plane[0].x, plane[0].y));
    let ends_inside =
        intersection.contains(&Point::new(plane[last_node].x, plane[last_node].y));

    let crossings = boundary_crossings(&plane, intersection);

    if crossings.is_empty() {
        // No boundary crossing: inside or outside as a whole.
        if starts_inside {
            return Some((0, last_node));
        }
        return None;
    }

    // Outermost crossings in travel order.
    let travel_order =
        |a: &&Crossing, b: &&Crossing| a.segment.cmp(&b.segment).then(a.t.total_cmp(&b.t));
    let entry = crossings.iter().min_by(travel_order)?;
    let exit = crossings.iter().max_by(travel_order)?;

    let tree: RTree<IndexedNode> = RTree::bulk_load(
        plane
            .iter()
            .enumerate()
            .map(|(index, c)| IndexedNode {
                index,
                x: c.x,
                y: c.y,
            })
            .collect(),
    );

    let entry_node = if starts_inside {
        0
    } else {
        nearest_node(&tree, entry.coord)?
    };
    let exit_node = if ends_inside {
        last_node
    } else {
        nearest_node(&tree, exit.coord)?
    };

    // Snapping can invert a very short range.
    if entry_node <= exit_node {
        Some((entry_node, exit_node))
    } else {
        Some((exit_node, entry_node))
    }
}

fn nearest_node(tree: &RTree<IndexedNode>, coord: Coord<f64>) -> Option<usize> {
    tree.nearest_neighbor(&[coord.x, coord.y])
        .map(|node| node.index)
}

/// All crossings of the route against every ring of the intersection.
fn boundary_crossings(plane: &[Coord<f64>], intersection: &MultiPolygon<f64>) -> Vec<Crossing> {
    let mut crossings = Vec::new();

    for (segment, pair) in plane.windows(2).enumerate() {
        let route_line = Line::new(pair[0], pair[1]);
        for polygon in &intersection.0 {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                for boundary_line in ring.lines() {
                    match line_intersection(route_line, boundary_line) {
                        Some(LineIntersection::SinglePoint { intersection, .. }) => {
                            crossings.push(Crossing {
                                segment,
                                t: position_along(route_line, intersection),
                                coord: intersection,
                            });
                        }
                        Some(LineIntersection::Collinear { intersection }) => {
                            for coord in [intersection.start, intersection.end] {
                                crossings.push(Crossing {
                                    segment,
                                    t: position_along(route_line, coord),
                                    coord,
                                });
                            }
                        }
                        None => {}
                    }
                }
            }
        }
    }

    crossings
}

/// Fractional position of a point along a segment, clamped to [0, 1].
fn position_along(line: Line<f64>, point: Coord<f64>) -> f64 {
    let dx = line.end.x - line.start.x;
    let dy = line.end.y - line.start.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq <= 0.0 {
        return 0.0;
    }
    let t = ((point.x - line.start.x) * dx + (point.y - line.start.y) * dy) / length_sq;
    t.clamp(0.0, 1.0)
}
