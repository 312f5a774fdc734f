//! # commutematch
//!
//! Route overlap analysis for pairs of commuting routes.
//!
//! Given two routes (ordered polylines with provider-supplied total distance
//! and travel time), this library determines how much of each route overlaps
//! with the other and splits each route's distance/time into "before overlap",
//! "overlap" and "after overlap" portions.
//!
//! Four boundary strategies are available, because real commuters rarely meet
//! and part at an exactly shared road node:
//! - exact common-node matching ([`ApproximationMode::None`])
//! - per-segment rectangle matching ([`ApproximationMode::Rectangle`])
//! - corridor-buffer area ratios ([`ApproximationMode::BufferRatio`])
//! - buffer intersection projected back onto the road ([`ApproximationMode::BufferExact`])
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch processing with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use commutematch::{compute_overlap, Coordinate, OverlapConfig, Route};
//!
//! let route_a = Route::new(
//!     vec![
//!         Coordinate::new(48.8566, 2.3522),
//!         Coordinate::new(48.8600, 2.3600),
//!         Coordinate::new(48.8650, 2.3700),
//!     ],
//!     1.2,
//!     5.0,
//! );
//! let route_b = route_a.clone();
//!
//! let result = compute_overlap(&route_a, &route_b, &OverlapConfig::default()).unwrap();
//! assert_eq!(result.first_common_index_a, Some(0));
//! assert_eq!(result.last_common_index_a, Some(2));
//! assert!(result.a_before_dist == 0.0 && result.a_after_dist == 0.0);
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Unified error handling
pub mod error;
pub use error::{OptionExt, OverlapError, Result};

// Geographic utilities (distance, bearing, planar projection)
pub mod geo_utils;

// Exact common-node matching
pub mod exact;
pub use exact::{find_common_nodes, CommonNodes};

// Per-segment rectangle approximation
pub mod rectangles;
pub use rectangles::{build_segment_rectangles, RectanglePair, SegmentRectangle};

// Corridor buffers and buffer intersection
pub mod buffers;
pub use buffers::{build_corridor_buffer, intersect_buffers, BufferIntersection, CorridorBuffer};

// Projection of a buffer intersection back onto the road
pub mod projector;

// Distance/time allocation across node ranges
pub mod metrics;
pub use metrics::{RouteMetrics, SegmentMetrics};

// Mode selection and the per-pair pipeline
pub mod orchestrator;
pub use orchestrator::{compute_overlap, ApproximationMode};

// Routing provider contract and response cache
pub mod fetch;
pub use fetch::{fetch_or_zero, CachedFetcher, FetchError, RouteFetcher};

// Batch driver for many route pairs
pub mod batch;
#[cfg(feature = "parallel")]
pub use batch::process_route_pairs_parallel;
pub use batch::{process_route_pairs, PairRecord, RoutePair};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate in WGS84 decimal degrees.
///
/// Equality is exact value equality with no tolerance; exact common-node
/// matching relies on this.
///
/// # Example
/// ```
/// use commutematch::Coordinate;
/// let point = Coordinate::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that the coordinate is finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Bit-exact key for hashing and exact membership tests.
    pub(crate) fn bits(&self) -> (u64, u64) {
        (self.latitude.to_bits(), self.longitude.to_bits())
    }
}

impl FromStr for Coordinate {
    type Err = OverlapError;

    /// Parse `"latitude,longitude"` in decimal degrees.
    fn from_str(raw: &str) -> Result<Self> {
        let malformed = || OverlapError::MalformedCoordinate {
            raw: raw.to_string(),
        };

        let (lat, lon) = raw.split_once(',').ok_or_else(malformed)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| malformed())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| malformed())?;

        let coordinate = Coordinate::new(latitude, longitude);
        if !coordinate.is_valid() {
            return Err(malformed());
        }
        Ok(coordinate)
    }
}

/// A route as returned by the routing provider: an ordered polyline plus
/// aggregate distance and travel time for the whole path.
///
/// Points are in travel order and are never reordered. The totals cover the
/// entire route; per-portion values are recomputed from the polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Polyline in travel order.
    pub points: Vec<Coordinate>,
    /// Provider total distance in kilometers.
    pub total_distance_km: f64,
    /// Provider total travel time in minutes.
    pub total_time_min: f64,
}

impl Route {
    pub fn new(points: Vec<Coordinate>, total_distance_km: f64, total_time_min: f64) -> Self {
        Self {
            points,
            total_distance_km,
            total_time_min,
        }
    }

    /// The zero-valued route used when the routing provider fails terminally.
    pub fn zero() -> Self {
        Self {
            points: Vec::new(),
            total_distance_km: 0.0,
            total_time_min: 0.0,
        }
    }

    /// A failed fetch degrades to an empty polyline with zero totals.
    pub fn is_zero(&self) -> bool {
        self.points.is_empty()
    }

    pub fn origin(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn destination(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }
}

/// Configuration for overlap computation.
///
/// All values are supplied upfront; the pipeline is non-interactive and
/// deterministic from this configuration alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapConfig {
    /// Boundary approximation strategy.
    pub mode: ApproximationMode,
    /// Rectangle intersection threshold in percent (0-100). A segment pair
    /// is retained when its intersection ratio meets the threshold
    /// (inclusive comparison).
    pub threshold: f64,
    /// Rectangle width in meters for the rectangle approximation.
    pub width: f64,
    /// Corridor buffer radius in meters for the buffer modes.
    pub buffer_distance: f64,
    /// Compute before/after splits in addition to the overlap itself.
    /// When false the before/after fields stay zero.
    pub compute_before_after: bool,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            mode: ApproximationMode::None,
            threshold: 50.0,
            width: 100.0,
            buffer_distance: 100.0,
            compute_before_after: true,
        }
    }
}

impl OverlapConfig {
    /// Validate parameter ranges before any pair is processed.
    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0) {
            return Err(OverlapError::InvalidParameter {
                name: "width",
                value: self.width,
                reason: "must be greater than zero meters",
            });
        }
        if !(self.buffer_distance > 0.0) {
            return Err(OverlapError::InvalidParameter {
                name: "buffer_distance",
                value: self.buffer_distance,
                reason: "must be greater than zero meters",
            });
        }
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(OverlapError::InvalidParameter {
                name: "threshold",
                value: self.threshold,
                reason: "must be a percentage in [0, 100]",
            });
        }
        Ok(())
    }
}

/// Result of computing the overlap between one pair of routes.
///
/// Distances are kilometers, times minutes, areas square meters. Fields
/// serialize in camelCase (`aDist`, `aOverlapDist`, `aIntersecRatio`, ...),
/// matching the batch output schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapResult {
    /// Route A provider totals.
    pub a_dist: f64,
    pub a_time: f64,
    /// Route B provider totals.
    pub b_dist: f64,
    pub b_time: f64,

    /// Overlap portion on each route.
    pub a_overlap_dist: f64,
    pub a_overlap_time: f64,
    pub b_overlap_dist: f64,
    pub b_overlap_time: f64,

    /// Portion travelled before the overlap begins.
    pub a_before_dist: f64,
    pub a_before_time: f64,
    pub b_before_dist: f64,
    pub b_before_time: f64,

    /// Portion travelled after the overlap ends.
    pub a_after_dist: f64,
    pub a_after_time: f64,
    pub b_after_dist: f64,
    pub b_after_time: f64,

    /// Boundary node indices into each route's polyline.
    /// `None` means no overlap boundary exists on that route.
    pub first_common_index_a: Option<usize>,
    pub last_common_index_a: Option<usize>,
    pub first_common_index_b: Option<usize>,
    pub last_common_index_b: Option<usize>,

    /// Buffer-mode area results (square meters; ratios in [0, 1]).
    pub intersection_area: f64,
    pub a_area: f64,
    pub b_area: f64,
    pub a_intersec_ratio: f64,
    pub b_intersec_ratio: f64,
}

impl OverlapResult {
    /// Result carrying only the route totals, all derived fields zero.
    /// Used for non-overlapping pairs and for degraded (zero) routes.
    pub fn from_totals(route_a: &Route, route_b: &Route) -> Self {
        Self {
            a_dist: route_a.total_distance_km,
            a_time: route_a.total_time_min,
            b_dist: route_b.total_distance_km,
            b_time: route_b.total_time_min,
            ..Self::default()
        }
    }

    /// True when no overlap boundary was found on either route.
    pub fn is_disjoint(&self) -> bool {
        self.first_common_index_a.is_none() && self.first_common_index_b.is_none()
    }
}
