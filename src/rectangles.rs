//! Per-segment rectangle approximation.
//!
//! Every route segment is widened into an oriented rectangle in the shared
//! local plane. Segment pairs whose rectangles overlap strongly enough mark
//! the candidate overlap window; the window is then narrowed to node
//! boundaries on each route.

use geo::{Area, BooleanOps, Coord, LineString, Polygon};
use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::PlaneProjection;
use crate::Coordinate;

/// Segments shorter than this (meters, in the plane) produce degenerate
/// rectangles and are skipped.
const MIN_SEGMENT_LENGTH_M: f64 = 1e-6;

/// One route segment widened into an oriented rectangle.
#[derive(Debug, Clone)]
pub struct SegmentRectangle {
    /// Index of the segment (nodes `segment_index` and `segment_index + 1`).
    pub segment_index: usize,
    pub polygon: Polygon<f64>,
    /// Rectangle area in square meters.
    pub area: f64,
}

/// A retained pair of segment rectangles and their intersection ratio
/// (percent of the smaller rectangle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectanglePair {
    pub a_segment: usize,
    pub b_segment: usize,
    pub overlap_percent: f64,
}

/// Node index windows on both routes spanned by the retained pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedWindow {
    pub nodes_a: std::ops::Range<usize>,
    pub nodes_b: std::ops::Range<usize>,
}

/// Build oriented rectangles around every non-degenerate segment of a route.
///
/// The rectangle is centered on the segment: half of `width_m` extends to
/// each side, perpendicular to the direction of travel.
pub fn build_segment_rectangles(
    route: &[Coordinate],
    width_m: f64,
    projection: &PlaneProjection,
) -> Vec<SegmentRectangle> {
    let plane = projection.project_polyline(route);
    let half_width = width_m / 2.0;
    let mut rectangles = Vec::with_capacity(plane.len().saturating_sub(1));

    for (segment_index, pair) in plane.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let length = (dx * dx + dy * dy).sqrt();
        if length < MIN_SEGMENT_LENGTH_M {
            continue;
        }

        // Unit normal to the direction of travel.
        let nx = -dy / length * half_width;
        let ny = dx / length * half_width;

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
        let polygon = Polygon::new(LineString::from(corners), vec![]);
        let area = polygon.unsigned_area();

        rectangles.push(SegmentRectangle {
            segment_index,
            polygon,
            area,
        });
    }

    rectangles
}

/// Spatial index entry: a rectangle's bounding box pointing back into the
/// rectangle list.
struct RectEnvelope {
    list_index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for RectEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

fn envelope_of(polygon: &Polygon<f64>) -> AABB<[f64; 2]> {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for coord in polygon.exterior().coords() {
        min[0] = min[0].min(coord.x);
        min[1] = min[1].min(coord.y);
        max[0] = max[0].max(coord.x);
        max[1] = max[1].max(coord.y);
    }
    AABB::from_corners(min, max)
}

/// Compare rectangles of A against rectangles of B, keeping pairs whose
/// intersection ratio meets the threshold (inclusive).
///
/// The ratio is the intersection area divided by the smaller rectangle's
/// area, in percent. At a positive threshold, pairs with disjoint bounding
/// boxes have a ratio of zero and cannot pass, so an R-tree prunes them
/// without changing the retained set. A zero threshold retains every pair,
/// including zero-intersection ones, and goes through the exhaustive loop.
/// Results are sorted by `(a_segment, b_segment)` so the output is
/// deterministic.
pub fn filter_rectangle_pairs(
    rects_a: &[SegmentRectangle],
    rects_b: &[SegmentRectangle],
    threshold_percent: f64,
) -> Vec<RectanglePair> {
    let mut pairs = Vec::new();
    let mut retain = |rect_a: &SegmentRectangle, rect_b: &SegmentRectangle| {
        let smaller = rect_a.area.min(rect_b.area);
        if smaller <= 0.0 {
            return;
        }

        let intersection = rect_a.polygon.intersection(&rect_b.polygon);
        let overlap_percent = intersection.unsigned_area() / smaller * 100.0;
        if overlap_percent >= threshold_percent {
            pairs.push(RectanglePair {
                a_segment: rect_a.segment_index,
                b_segment: rect_b.segment_index,
                overlap_percent,
            });
        }
    };

    if threshold_percent <= 0.0 {
        for rect_a in rects_a {
            for rect_b in rects_b {
                retain(rect_a, rect_b);
            }
        }
    } else {
        let tree: RTree<RectEnvelope> = RTree::bulk_load(
            rects_b
                .iter()
                .enumerate()
                .map(|(list_index, rect)| RectEnvelope {
                    list_index,
                    aabb: envelope_of(&rect.polygon),
                })
                .collect(),
        );

        for rect_a in rects_a {
            let env_a = envelope_of(&rect_a.polygon);
            for candidate in tree.locate_in_envelope_intersecting(&env_a) {
                retain(rect_a, &rects_b[candidate.list_index]);
            }
        }
    }

    pairs.sort_by(|x, y| (x.a_segment, x.b_segment).cmp(&(y.a_segment, y.b_segment)));
    pairs
}

/// Convert retained pairs into node index windows on both routes.
///
/// The window starts at the start node of the earliest matched segment and
/// ends at the end node of the latest matched segment. Returns `None` when
/// no pair survived the threshold.
pub fn matched_window(pairs: &[RectanglePair]) -> Option<MatchedWindow> {
    let first_a = pairs.iter().map(|p| p.a_segment).min()?;
    let last_a = pairs.iter().map(|p| p.a_segment).max()?;
    let first_b = pairs.iter().map(|p| p.b_segment).min()?;
    let last_b = pairs.iter().map(|p| p.b_segment).max()?;

    Some(MatchedWindow {
        nodes_a: first_a..last_a + 2,
        nodes_b: first_b..last_b + 2,
    })
}
