//! Tests for geographic utilities and the planar projection.

use commutematch::geo_utils::{
    cumulative_distances_km, haversine_distance, polyline_length_km, PlaneProjection,
    METERS_PER_DEGREE,
};
use commutematch::Coordinate;

#[test]
fn haversine_zero_for_identical_points() {
    let p = Coordinate::new(48.8566, 2.3522);
    assert_eq!(haversine_distance(&p, &p), 0.0);
}

#[test]
fn haversine_one_degree_latitude() {
    let a = Coordinate::new(0.0, 0.0);
    let b = Coordinate::new(1.0, 0.0);
    let distance = haversine_distance(&a, &b);
    // One degree of latitude is about 111.2 km.
    assert!((distance - 111_195.0).abs() < 1_200.0, "got {distance}");
}

#[test]
fn haversine_london_to_paris() {
    let london = Coordinate::new(51.5074, -0.1278);
    let paris = Coordinate::new(48.8566, 2.3522);
    let distance = haversine_distance(&london, &paris);
    assert!((330_000.0..360_000.0).contains(&distance), "got {distance}");
}

#[test]
fn haversine_is_symmetric() {
    let a = Coordinate::new(51.5074, -0.1278);
    let b = Coordinate::new(48.8566, 2.3522);
    assert!((haversine_distance(&a, &b) - haversine_distance(&b, &a)).abs() < 1e-9);
}

#[test]
fn polyline_length_sums_segments() {
    let points = vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 0.01),
        Coordinate::new(0.0, 0.02),
    ];
    let total = polyline_length_km(&points);
    let first = haversine_distance(&points[0], &points[1]) / 1000.0;
    let second = haversine_distance(&points[1], &points[2]) / 1000.0;
    assert!((total - (first + second)).abs() < 1e-12);
}

#[test]
fn polyline_length_of_short_inputs_is_zero() {
    assert_eq!(polyline_length_km(&[]), 0.0);
    assert_eq!(polyline_length_km(&[Coordinate::new(1.0, 1.0)]), 0.0);
}

#[test]
fn cumulative_distances_start_at_zero_and_end_at_total() {
    let points = vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 0.01),
        Coordinate::new(0.01, 0.01),
        Coordinate::new(0.01, 0.02),
    ];
    let cumulative = cumulative_distances_km(&points);
    assert_eq!(cumulative.len(), points.len());
    assert_eq!(cumulative[0], 0.0);
    let total = polyline_length_km(&points);
    assert!((cumulative[3] - total).abs() < 1e-12);
    for pair in cumulative.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
}

#[test]
fn projection_preserves_small_distances_at_equator() {
    let points = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.001)];
    let projection = PlaneProjection::for_routes(&[&points]);
    let a = projection.to_plane(&points[0]);
    let b = projection.to_plane(&points[1]);
    let planar = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    assert!(
        (planar - 0.001 * METERS_PER_DEGREE).abs() < 0.01,
        "got {planar}"
    );
}

#[test]
fn projection_scales_longitude_by_latitude() {
    // At 60 degrees north a degree of longitude is half as long.
    let points = vec![Coordinate::new(60.0, 10.0), Coordinate::new(60.0, 10.001)];
    let projection = PlaneProjection::for_routes(&[&points]);
    let a = projection.to_plane(&points[0]);
    let b = projection.to_plane(&points[1]);
    let planar = (b.x - a.x).abs();
    let expected = 0.001 * METERS_PER_DEGREE * 60.0_f64.to_radians().cos();
    assert!(
        (planar - expected).abs() < 0.01,
        "got {planar}, expected {expected}"
    );
}

#[test]
fn projection_is_anchored_over_both_routes() {
    let route_a = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01)];
    let route_b = vec![Coordinate::new(0.02, 0.0), Coordinate::new(0.02, 0.01)];
    let projection = PlaneProjection::for_routes(&[&route_a, &route_b]);
    // Anchor sits between the two routes, so their y offsets are symmetric.
    let ya = projection.to_plane(&route_a[0]).y;
    let yb = projection.to_plane(&route_b[0]).y;
    assert!((ya + yb).abs() < 1e-9, "ya={ya}, yb={yb}");
}
