//! Distance and time allocation across node ranges.
//!
//! Distances are recomputed from the polyline (great-circle, node to node);
//! travel time is allocated proportionally to distance, since the routing
//! provider only reports a total. Splitting a route at any two nodes
//! therefore reconstructs the polyline totals exactly.

use crate::geo_utils::cumulative_distances_km;
use crate::Route;

/// Distance/time for one contiguous node range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentMetrics {
    pub distance_km: f64,
    pub time_min: f64,
}

/// Before/overlap/after split of one route.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SplitMetrics {
    pub before: SegmentMetrics,
    pub overlap: SegmentMetrics,
    pub after: SegmentMetrics,
}

/// Precomputed cumulative distances for one route.
#[derive(Debug, Clone)]
pub struct RouteMetrics<'a> {
    route: &'a Route,
    cumulative_km: Vec<f64>,
}

impl<'a> RouteMetrics<'a> {
    pub fn new(route: &'a Route) -> Self {
        Self {
            cumulative_km: cumulative_distances_km(&route.points),
            route,
        }
    }

    /// Recomputed length of the whole polyline in kilometers.
    pub fn polyline_length_km(&self) -> f64 {
        self.cumulative_km.last().copied().unwrap_or(0.0)
    }

    /// Metrics for the node range `start..=end`.
    ///
    /// Time is the provider total scaled by this range's share of the
    /// polyline length; a zero-length polyline allocates zero time.
    pub fn range(&self, start: usize, end: usize) -> SegmentMetrics {
        let last = self.cumulative_km.len().saturating_sub(1);
        let start = start.min(last);
        let end = end.min(last);
        if start >= end {
            return SegmentMetrics::default();
        }

        let distance_km = self.cumulative_km[end] - self.cumulative_km[start];
        let total_km = self.polyline_length_km();
        let time_min = if total_km > 0.0 {
            self.route.total_time_min * (distance_km / total_km)
        } else {
            0.0
        };

        SegmentMetrics {
            distance_km,
            time_min,
        }
    }

    /// Split the route at the overlap boundary nodes `first..=last`.
    ///
    /// With `compute_before_after` false only the overlap range is
    /// computed; before/after stay zero.
    pub fn split(&self, first: usize, last: usize, compute_before_after: bool) -> SplitMetrics {
        let last_node = self.cumulative_km.len().saturating_sub(1);
        let mut split = SplitMetrics {
            overlap: self.range(first, last),
            ..SplitMetrics::default()
        };
        if compute_before_after {
            split.before = self.range(0, first);
            split.after = self.range(last, last_node);
        }
        split
    }
}
