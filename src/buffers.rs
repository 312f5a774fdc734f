//! Corridor buffers around routes.
//!
//! A buffer is the set of plane points within `buffer_distance` meters of
//! the route polyline. It is built as the union of one oriented rectangle
//! per segment and one disc per node, which yields the same capsule shape a
//! round-capped line buffer produces (discs approximated as regular
//! polygons).

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};

use crate::geo_utils::PlaneProjection;
use crate::Coordinate;

/// Vertices per disc approximation. 32 keeps the area error below 0.7%.
const DISC_VERTICES: usize = 32;

/// Segments shorter than this (meters) contribute only their node discs.
const MIN_SEGMENT_LENGTH_M: f64 = 1e-6;

/// A route's corridor buffer in the shared plane.
#[derive(Debug, Clone)]
pub struct CorridorBuffer {
    pub polygon: MultiPolygon<f64>,
    /// Buffer area in square meters.
    pub area: f64,
}

/// Intersection of two corridor buffers with per-route area ratios.
#[derive(Debug, Clone)]
pub struct BufferIntersection {
    pub polygon: MultiPolygon<f64>,
    /// Intersection area in square meters.
    pub intersection_area: f64,
    /// Fraction of route A's buffer covered by the intersection, in [0, 1].
    pub a_ratio: f64,
    /// Fraction of route B's buffer covered by the intersection, in [0, 1].
    pub b_ratio: f64,
}

impl BufferIntersection {
    pub fn is_empty(&self) -> bool {
        self.intersection_area <= 0.0
    }
}

/// Build the corridor buffer of a route at the given radius.
pub fn build_corridor_buffer(
    route: &[Coordinate],
    radius_m: f64,
    projection: &PlaneProjection,
) -> CorridorBuffer {
    let plane = projection.project_polyline(route);

    let mut pieces: Vec<MultiPolygon<f64>> = Vec::new();
    let mut previous: Option<Coord<f64>> = None;
    for coord in &plane {
        // Collapse consecutive duplicate nodes.
        if previous.is_some_and(|p| p == *coord) {
            continue;
        }
        pieces.push(MultiPolygon(vec![disc(*coord, radius_m)]));
        if let Some(start) = previous {
            if let Some(rect) = segment_rectangle(start, *coord, radius_m) {
                pieces.push(MultiPolygon(vec![rect]));
            }
        }
        previous = Some(*coord);
    }

    let polygon = union_all(pieces);
    let area = polygon.unsigned_area();
    CorridorBuffer { polygon, area }
}

/// Intersect two buffers and express the intersection as a fraction of each
/// buffer's own area.
pub fn intersect_buffers(a: &CorridorBuffer, b: &CorridorBuffer) -> BufferIntersection {
    let polygon = a.polygon.intersection(&b.polygon);
    let intersection_area = polygon.unsigned_area();

    // Clamp against polygon approximation jitter.
    let ratio = |own_area: f64| {
        if own_area > 0.0 {
            (intersection_area / own_area).min(1.0)
        } else {
            0.0
        }
    };

    BufferIntersection {
        a_ratio: ratio(a.area),
        b_ratio: ratio(b.area),
        polygon,
        intersection_area,
    }
}

fn disc(center: Coord<f64>, radius_m: f64) -> Polygon<f64> {
    let mut ring = Vec::with_capacity(DISC_VERTICES + 1);
    for i in 0..=DISC_VERTICES {
        let angle = std::f64::consts::TAU * (i % DISC_VERTICES) as f64 / DISC_VERTICES as f64;
        ring.push(Coord {
            x: center.x + radius_m * angle.cos(),
            y: center.y + radius_m * angle.sin(),
        });
    }
    Polygon::new(LineString::from(ring), vec![])
}

fn segment_rectangle(start: Coord<f64>, end: Coord<f64>, radius_m: f64) -> Option<Polygon<f64>> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < MIN_SEGMENT_LENGTH_M {
        return None;
    }

    let nx = -dy / length * radius_m;
    let ny = dx / length * radius_m;
    let corners = vec![
        Coord {
            x: start.x + nx,
            y: start.y + ny,
        },
        Coord {
            x: end.x + nx,
            y: end.y + ny,
        },
        Coord {
            x: end.x - nx,
            y: end.y - ny,
        },
        Coord {
            x: start.x - nx,
            y: start.y - ny,
        },
        Coord {
            x: start.x + nx,
            y: start.y + ny,
        },
    ];
    Some(Polygon::new(LineString::from(corners), vec![]))
}

/// Balanced pairwise union. Keeps intermediate results small compared to a
/// left fold over hundreds of pieces.
fn union_all(mut pieces: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    if pieces.is_empty() {
        return MultiPolygon(vec![]);
    }
    while pieces.len() > 1 {
        let mut next = Vec::with_capacity(pieces.len().div_ceil(2));
        let mut iter = pieces.into_iter();
        while let Some(first) = iter.next() {
            match iter.next() {
                Some(second) => next.push(first.union(&second)),
                None => next.push(first),
            }
        }
        pieces = next;
    }
    pieces.pop().unwrap_or_else(|| MultiPolygon(vec![]))
}
