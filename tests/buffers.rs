//! Tests for corridor buffers and buffer intersections.

use commutematch::buffers::{build_corridor_buffer, intersect_buffers};
use commutematch::geo_utils::PlaneProjection;
use commutematch::Coordinate;

fn eastward_route(lat: f64, start_lon: f64, step: f64, nodes: usize) -> Vec<Coordinate> {
    (0..nodes)
        .map(|i| Coordinate::new(lat, start_lon + step * i as f64))
        .collect()
}

#[test]
fn straight_line_buffer_has_capsule_area() {
    // 0.02 degrees at the equator is about 2222 m of route.
    let route = eastward_route(0.0, 0.0, 0.01, 3);
    let projection = PlaneProjection::for_routes(&[&route]);
    let buffer = build_corridor_buffer(&route, 100.0, &projection);

    let length = 0.02 * 111_111.0;
    let expected = 2.0 * 100.0 * length + std::f64::consts::PI * 100.0 * 100.0;
    let relative = (buffer.area - expected).abs() / expected;
    assert!(relative < 0.02, "area {} vs expected {expected}", buffer.area);
}

#[test]
fn single_node_route_buffers_to_a_disc() {
    let route = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.0)];
    let projection = PlaneProjection::for_routes(&[&route]);
    let buffer = build_corridor_buffer(&route, 100.0, &projection);

    let disc = std::f64::consts::PI * 100.0 * 100.0;
    let relative = (buffer.area - disc).abs() / disc;
    assert!(relative < 0.02, "area {} vs disc {disc}", buffer.area);
}

#[test]
fn identical_routes_intersect_completely() {
    let route = eastward_route(0.0, 0.0, 0.01, 4);
    let projection = PlaneProjection::for_routes(&[&route]);
    let a = build_corridor_buffer(&route, 100.0, &projection);
    let b = build_corridor_buffer(&route, 100.0, &projection);

    let intersection = intersect_buffers(&a, &b);
    assert!(intersection.a_ratio > 0.99, "got {}", intersection.a_ratio);
    assert!(intersection.b_ratio > 0.99, "got {}", intersection.b_ratio);
}

#[test]
fn routes_farther_apart_than_both_radii_do_not_intersect() {
    // 1111 m of separation against two 100 m radii leaves a 911 m gap.
    let a_route = eastward_route(0.0, 0.0, 0.01, 4);
    let b_route = eastward_route(0.01, 0.0, 0.01, 4);
    let projection = PlaneProjection::for_routes(&[&a_route, &b_route]);
    let a = build_corridor_buffer(&a_route, 100.0, &projection);
    let b = build_corridor_buffer(&b_route, 100.0, &projection);

    let intersection = intersect_buffers(&a, &b);
    assert_eq!(intersection.intersection_area, 0.0);
    assert_eq!(intersection.a_ratio, 0.0);
    assert_eq!(intersection.b_ratio, 0.0);
    assert!(intersection.is_empty());
}

#[test]
fn close_parallel_routes_intersect_partially() {
    // 50 m apart with 100 m radii: corridors overlap but neither contains
    // the other.
    let a_route = eastward_route(0.0, 0.0, 0.01, 4);
    let b_route = eastward_route(50.0 / 111_111.0, 0.0, 0.01, 4);
    let projection = PlaneProjection::for_routes(&[&a_route, &b_route]);
    let a = build_corridor_buffer(&a_route, 100.0, &projection);
    let b = build_corridor_buffer(&b_route, 100.0, &projection);

    let intersection = intersect_buffers(&a, &b);
    assert!(intersection.intersection_area > 0.0);
    assert!(intersection.a_ratio > 0.0 && intersection.a_ratio < 1.0);
    assert!(intersection.b_ratio > 0.0 && intersection.b_ratio < 1.0);
}

#[test]
fn crossing_routes_intersect_near_the_crossing_only() {
    let a_route = eastward_route(0.0, -0.02, 0.01, 5);
    let b_route: Vec<Coordinate> = (0..5)
        .map(|i| Coordinate::new(-0.02 + 0.01 * i as f64, 0.0))
        .collect();
    let projection = PlaneProjection::for_routes(&[&a_route, &b_route]);
    let a = build_corridor_buffer(&a_route, 100.0, &projection);
    let b = build_corridor_buffer(&b_route, 100.0, &projection);

    let intersection = intersect_buffers(&a, &b);
    assert!(intersection.intersection_area > 0.0);
    // A perpendicular crossing shares only a small patch of each corridor.
    assert!(intersection.a_ratio < 0.2, "got {}", intersection.a_ratio);
    assert!(intersection.b_ratio < 0.2, "got {}", intersection.b_ratio);
}

#[test]
fn intersection_never_exceeds_either_buffer() {
    let a_route = eastward_route(0.0, 0.0, 0.01, 4);
    let b_route = eastward_route(0.0003, 0.005, 0.01, 4);
    let projection = PlaneProjection::for_routes(&[&a_route, &b_route]);
    let a = build_corridor_buffer(&a_route, 100.0, &projection);
    let b = build_corridor_buffer(&b_route, 100.0, &projection);

    let intersection = intersect_buffers(&a, &b);
    assert!(intersection.intersection_area <= a.area * 1.001);
    assert!(intersection.intersection_area <= b.area * 1.001);
    assert!(intersection.a_ratio <= 1.0);
    assert!(intersection.b_ratio <= 1.0);
}
