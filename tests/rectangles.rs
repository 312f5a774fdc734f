//! Tests for the per-segment rectangle approximation.

use commutematch::geo_utils::PlaneProjection;
use commutematch::rectangles::{
    build_segment_rectangles, filter_rectangle_pairs, matched_window,
};
use commutematch::Coordinate;

/// Straight west-to-east route along a line of latitude.
fn eastward_route(lat: f64, start_lon: f64, step: f64, nodes: usize) -> Vec<Coordinate> {
    (0..nodes)
        .map(|i| Coordinate::new(lat, start_lon + step * i as f64))
        .collect()
}

#[test]
fn rectangle_area_matches_segment_length_times_width() {
    // One 0.01 degree segment at the equator, about 1111 m long.
    let route = eastward_route(0.0, 0.0, 0.01, 2);
    let projection = PlaneProjection::for_routes(&[&route]);
    let rects = build_segment_rectangles(&route, 100.0, &projection);
    assert_eq!(rects.len(), 1);

    let expected = 0.01 * 111_111.0 * 100.0;
    let relative = (rects[0].area - expected).abs() / expected;
    assert!(relative < 0.01, "area {} vs expected {expected}", rects[0].area);
}

#[test]
fn degenerate_segments_are_skipped() {
    let route = vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 0.01),
    ];
    let projection = PlaneProjection::for_routes(&[&route]);
    let rects = build_segment_rectangles(&route, 100.0, &projection);
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0].segment_index, 1);
}

#[test]
fn identical_segments_fully_overlap() {
    let route = eastward_route(0.0, 0.0, 0.01, 3);
    let projection = PlaneProjection::for_routes(&[&route]);
    let rects_a = build_segment_rectangles(&route, 100.0, &projection);
    let rects_b = build_segment_rectangles(&route, 100.0, &projection);

    let pairs = filter_rectangle_pairs(&rects_a, &rects_b, 50.0);
    // Each segment matches at least its own twin at essentially 100%.
    for i in 0..2 {
        let own = pairs
            .iter()
            .find(|p| p.a_segment == i && p.b_segment == i)
            .unwrap();
        assert!(own.overlap_percent > 99.0, "got {}", own.overlap_percent);
    }
}

#[test]
fn distant_routes_produce_no_pairs_at_positive_threshold() {
    let a = eastward_route(0.0, 0.0, 0.01, 4);
    let b = eastward_route(1.0, 0.0, 0.01, 4);
    let projection = PlaneProjection::for_routes(&[&a, &b]);
    let rects_a = build_segment_rectangles(&a, 100.0, &projection);
    let rects_b = build_segment_rectangles(&b, 100.0, &projection);
    assert!(filter_rectangle_pairs(&rects_a, &rects_b, 50.0).is_empty());
    assert!(filter_rectangle_pairs(&rects_a, &rects_b, 0.1).is_empty());
}

#[test]
fn zero_threshold_retains_every_pair() {
    // An inclusive comparison against zero keeps even disjoint pairs at
    // their 0% ratio, so the retained set is the full cross product.
    let a = eastward_route(0.0, 0.0, 0.01, 4);
    let b = eastward_route(1.0, 0.0, 0.01, 4);
    let projection = PlaneProjection::for_routes(&[&a, &b]);
    let rects_a = build_segment_rectangles(&a, 100.0, &projection);
    let rects_b = build_segment_rectangles(&b, 100.0, &projection);

    let pairs = filter_rectangle_pairs(&rects_a, &rects_b, 0.0);
    assert_eq!(pairs.len(), rects_a.len() * rects_b.len());
    assert!(pairs.iter().all(|p| p.overlap_percent == 0.0));
}

#[test]
fn threshold_is_inclusive_and_monotonic() {
    // B runs parallel to A, 30 m north: lateral overlap is about 70 of
    // 100 m, so same-index pairs sit near 70%.
    let a = eastward_route(0.0, 0.0, 0.01, 5);
    let b = eastward_route(30.0 / 111_111.0, 0.0, 0.01, 5);
    let projection = PlaneProjection::for_routes(&[&a, &b]);
    let rects_a = build_segment_rectangles(&a, 100.0, &projection);
    let rects_b = build_segment_rectangles(&b, 100.0, &projection);

    let loose = filter_rectangle_pairs(&rects_a, &rects_b, 50.0);
    let tight = filter_rectangle_pairs(&rects_a, &rects_b, 80.0);
    assert!(!loose.is_empty());
    assert!(tight.len() <= loose.len());
    // 70% pairs fail an 80% threshold.
    assert!(tight.iter().all(|p| p.overlap_percent >= 80.0));
    assert!(!loose
        .iter()
        .any(|p| p.a_segment == p.b_segment && p.overlap_percent >= 80.0));
}

#[test]
fn zero_threshold_keeps_touching_pairs() {
    let a = eastward_route(0.0, 0.0, 0.01, 3);
    let projection = PlaneProjection::for_routes(&[&a]);
    let rects = build_segment_rectangles(&a, 100.0, &projection);
    let pairs = filter_rectangle_pairs(&rects, &rects, 0.0);
    assert_eq!(pairs.len(), rects.len() * rects.len());
}

#[test]
fn pairs_are_sorted_deterministically() {
    let a = eastward_route(0.0, 0.0, 0.01, 5);
    let projection = PlaneProjection::for_routes(&[&a]);
    let rects = build_segment_rectangles(&a, 100.0, &projection);
    let pairs = filter_rectangle_pairs(&rects, &rects, 50.0);
    for window in pairs.windows(2) {
        assert!(
            (window[0].a_segment, window[0].b_segment)
                < (window[1].a_segment, window[1].b_segment)
        );
    }
}

#[test]
fn matched_window_spans_first_to_last_pair() {
    let a = eastward_route(0.0, 0.0, 0.01, 6);
    let projection = PlaneProjection::for_routes(&[&a]);
    let rects = build_segment_rectangles(&a, 100.0, &projection);
    let pairs = filter_rectangle_pairs(&rects, &rects, 99.0);

    let window = matched_window(&pairs).unwrap();
    // Self-matching retains every segment, so the window covers all nodes.
    assert_eq!(window.nodes_a, 0..6);
    assert_eq!(window.nodes_b, 0..6);
}

#[test]
fn matched_window_of_no_pairs_is_none() {
    assert!(matched_window(&[]).is_none());
}
