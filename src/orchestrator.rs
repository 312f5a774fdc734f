//! Mode selection and the per-pair overlap pipeline.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::buffers::{build_corridor_buffer, intersect_buffers};
use crate::exact::{find_common_nodes, find_common_nodes_in, CommonNodes};
use crate::geo_utils::PlaneProjection;
use crate::metrics::RouteMetrics;
use crate::projector::project_intersection_onto_route;
use crate::rectangles::{build_segment_rectangles, filter_rectangle_pairs, matched_window};
use crate::{OverlapConfig, OverlapError, OverlapResult, Result, Route};

/// Boundary approximation strategy for one overlap computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApproximationMode {
    /// Exact common-node matching only.
    None,
    /// Per-segment rectangle matching with threshold filtering.
    Rectangle,
    /// Corridor-buffer area ratios; no node boundaries or splits.
    BufferRatio,
    /// Corridor buffers with the intersection projected back onto the road.
    BufferExact,
}

impl ApproximationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rectangle => "rectangle",
            Self::BufferRatio => "bufferRatio",
            Self::BufferExact => "bufferExact",
        }
    }
}

impl fmt::Display for ApproximationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApproximationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "exact" => Ok(Self::None),
            "rectangle" | "rectangles" => Ok(Self::Rectangle),
            "bufferratio" | "buffer-ratio" | "buffer_ratio" => Ok(Self::BufferRatio),
            "bufferexact" | "buffer-exact" | "buffer_exact" => Ok(Self::BufferExact),
            other => Err(format!(
                "unknown mode '{other}', expected none, rectangle, bufferRatio or bufferExact"
            )),
        }
    }
}

/// Compute the overlap between two routes.
///
/// Returns a result carrying the route totals even when no overlap exists.
/// A route degraded to [`Route::zero`] by a failed fetch short-circuits to
/// an all-zero derived result; a non-empty route with fewer than two points
/// is an error.
pub fn compute_overlap(
    route_a: &Route,
    route_b: &Route,
    config: &OverlapConfig,
) -> Result<OverlapResult> {
    config.validate()?;

    if route_a.is_zero() || route_b.is_zero() {
        debug!(
            "[overlap] degraded pair (a empty: {}, b empty: {}), returning totals only",
            route_a.is_zero(),
            route_b.is_zero()
        );
        return Ok(OverlapResult::from_totals(route_a, route_b));
    }
    for (label, route) in [("A", route_a), ("B", route_b)] {
        if route.points.len() < 2 {
            return Err(OverlapError::insufficient_points(label, route.points.len()));
        }
    }

    let mut result = OverlapResult::from_totals(route_a, route_b);

    let bounds = match config.mode {
        ApproximationMode::None => find_common_nodes(&route_a.points, &route_b.points),
        ApproximationMode::Rectangle => rectangle_bounds(route_a, route_b, config),
        ApproximationMode::BufferRatio => {
            buffer_areas(route_a, route_b, config, &mut result, false)
        }
        ApproximationMode::BufferExact => buffer_areas(route_a, route_b, config, &mut result, true),
    };

    if let Some(bounds) = bounds {
        apply_bounds(&mut result, route_a, route_b, bounds, config);
    } else {
        debug!("[overlap] no overlap found (mode {})", config.mode);
    }

    Ok(result)
}

/// Rectangle approximation: threshold-filtered segment pairs give a node
/// window on each route, narrowed to exact shared nodes when any exist
/// inside the window. With no retained pair the whole pair falls back to
/// exact matching.
fn rectangle_bounds(route_a: &Route, route_b: &Route, config: &OverlapConfig) -> Option<CommonNodes> {
    let projection = PlaneProjection::for_routes(&[&route_a.points, &route_b.points]);
    let rects_a = build_segment_rectangles(&route_a.points, config.width, &projection);
    let rects_b = build_segment_rectangles(&route_b.points, config.width, &projection);

    let pairs = filter_rectangle_pairs(&rects_a, &rects_b, config.threshold);
    debug!(
        "[overlap] rectangle filter retained {} of {}x{} segment pairs",
        pairs.len(),
        rects_a.len(),
        rects_b.len()
    );

    let Some(window) = matched_window(&pairs) else {
        return find_common_nodes(&route_a.points, &route_b.points);
    };

    if let Some(refined) = find_common_nodes_in(
        &route_a.points,
        window.nodes_a.clone(),
        &route_b.points,
        window.nodes_b.clone(),
    ) {
        return Some(refined);
    }

    Some(CommonNodes {
        first_a: window.nodes_a.start,
        last_a: window.nodes_a.end - 1,
        first_b: window.nodes_b.start,
        last_b: window.nodes_b.end - 1,
    })
}

/// Buffer modes: fill the area fields, and in exact mode also derive node
/// bounds by projecting the intersection onto each route.
fn buffer_areas(
    route_a: &Route,
    route_b: &Route,
    config: &OverlapConfig,
    result: &mut OverlapResult,
    project_to_nodes: bool,
) -> Option<CommonNodes> {
    let projection = PlaneProjection::for_routes(&[&route_a.points, &route_b.points]);
    let buffer_a = build_corridor_buffer(&route_a.points, config.buffer_distance, &projection);
    let buffer_b = build_corridor_buffer(&route_b.points, config.buffer_distance, &projection);
    let intersection = intersect_buffers(&buffer_a, &buffer_b);

    result.a_area = buffer_a.area;
    result.b_area = buffer_b.area;
    result.intersection_area = intersection.intersection_area;
    result.a_intersec_ratio = intersection.a_ratio;
    result.b_intersec_ratio = intersection.b_ratio;

    debug!(
        "[overlap] buffers a={:.0} m2, b={:.0} m2, intersection={:.0} m2",
        buffer_a.area, buffer_b.area, intersection.intersection_area
    );

    if !project_to_nodes || intersection.is_empty() {
        return None;
    }

    let (first_a, last_a) =
        project_intersection_onto_route(&route_a.points, &intersection.polygon, &projection)?;
    let (first_b, last_b) =
        project_intersection_onto_route(&route_b.points, &intersection.polygon, &projection)?;

    Some(CommonNodes {
        first_a,
        last_a,
        first_b,
        last_b,
    })
}

fn apply_bounds(
    result: &mut OverlapResult,
    route_a: &Route,
    route_b: &Route,
    bounds: CommonNodes,
    config: &OverlapConfig,
) {
    let metrics_a = RouteMetrics::new(route_a);
    let metrics_b = RouteMetrics::new(route_b);
    let split_a = metrics_a.split(bounds.first_a, bounds.last_a, config.compute_before_after);
    let split_b = metrics_b.split(bounds.first_b, bounds.last_b, config.compute_before_after);

    result.first_common_index_a = Some(bounds.first_a);
    result.last_common_index_a = Some(bounds.last_a);
    result.first_common_index_b = Some(bounds.first_b);
    result.last_common_index_b = Some(bounds.last_b);

    result.a_overlap_dist = split_a.overlap.distance_km;
    result.a_overlap_time = split_a.overlap.time_min;
    result.b_overlap_dist = split_b.overlap.distance_km;
    result.b_overlap_time = split_b.overlap.time_min;

    result.a_before_dist = split_a.before.distance_km;
    result.a_before_time = split_a.before.time_min;
    result.b_before_dist = split_b.before.distance_km;
    result.b_before_time = split_b.before.time_min;

    result.a_after_dist = split_a.after.distance_km;
    result.a_after_time = split_a.after.time_min;
    result.b_after_dist = split_b.after.distance_km;
    result.b_after_time = split_b.after.time_min;
}
