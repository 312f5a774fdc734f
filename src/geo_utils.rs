//! Geographic utility functions for distance calculations and the local
//! planar projection shared by the geometric approximations.

use geo::Coord;

use crate::Coordinate;

/// Earth radius in meters (mean radius).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude. Longitude degrees shrink with
/// `cos(latitude)`; the projection below accounts for that.
pub const METERS_PER_DEGREE: f64 = 111_111.0;

/// Calculate the great-circle distance between two points in meters using
/// the haversine formula.
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Total polyline length in kilometers.
pub fn polyline_length_km(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum::<f64>()
        / 1000.0
}

/// Cumulative distance in kilometers from the first node to each node.
///
/// The returned vector has the same length as `points`; entry 0 is always
/// zero and the last entry equals [`polyline_length_km`].
pub fn cumulative_distances_km(points: &[Coordinate]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total_m = 0.0;
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total_m += haversine_distance(&points[i - 1], point);
        }
        cumulative.push(total_m / 1000.0);
    }
    cumulative
}

/// Equirectangular projection onto a local plane in meters.
///
/// All rectangles, buffers and area computations for one route pair happen
/// in a single shared plane anchored at the pair's combined centroid, so
/// areas come out in square meters and intersections are consistent across
/// both routes.
#[derive(Debug, Clone, Copy)]
pub struct PlaneProjection {
    origin_lat: f64,
    origin_lon: f64,
    /// Meters per degree of longitude at the anchor latitude.
    lon_scale: f64,
}

impl PlaneProjection {
    /// Anchor a projection at the center of the combined bounding box of
    /// the given point sets.
    pub fn for_routes(routes: &[&[Coordinate]]) -> Self {
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;

        for route in routes {
            for point in *route {
                min_lat = min_lat.min(point.latitude);
                max_lat = max_lat.max(point.latitude);
                min_lon = min_lon.min(point.longitude);
                max_lon = max_lon.max(point.longitude);
            }
        }

        // Empty input anchors at (0, 0); callers reject empty routes first.
        if !min_lat.is_finite() {
            min_lat = 0.0;
            max_lat = 0.0;
            min_lon = 0.0;
            max_lon = 0.0;
        }

        let origin_lat = (min_lat + max_lat) / 2.0;
        Self {
            origin_lat,
            origin_lon: (min_lon + max_lon) / 2.0,
            lon_scale: METERS_PER_DEGREE * origin_lat.to_radians().cos(),
        }
    }

    /// Project a coordinate into the local plane (meters east/north of the
    /// anchor).
    pub fn to_plane(&self, point: &Coordinate) -> Coord<f64> {
        Coord {
            x: (point.longitude - self.origin_lon) * self.lon_scale,
            y: (point.latitude - self.origin_lat) * METERS_PER_DEGREE,
        }
    }

    /// Project a whole polyline.
    pub fn project_polyline(&self, points: &[Coordinate]) -> Vec<Coord<f64>> {
        points.iter().map(|p| self.to_plane(p)).collect()
    }
}
