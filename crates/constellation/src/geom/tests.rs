use super::*;
use nalgebra::vector;

fn unit_square() -> Vec<Pt2> {
    vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 1.0],
    ]
}

#[test]
fn rot_quarter_turn() {
    let v = rot(vector![1.0, 0.0], std::f64::consts::FRAC_PI_2);
    assert!((v - vector![0.0, 1.0]).norm() < 1e-12);
}

#[test]
fn cross_sign_follows_winding() {
    assert!(cross(vector![1.0, 0.0], vector![0.0, 1.0]) > 0.0);
    assert!(cross(vector![0.0, 1.0], vector![1.0, 0.0]) < 0.0);
    assert_eq!(cross(vector![2.0, 2.0], vector![1.0, 1.0]), 0.0);
}

#[test]
fn proper_crossing_reports_parameters() {
    let s = Segment::new(vector![0.0, 0.0], vector![2.0, 2.0]);
    let o = Segment::new(vector![0.0, 2.0], vector![2.0, 0.0]);
    let hit = segment_intersection(&s, &o).expect("segments cross");
    assert!((hit.t - 0.5).abs() < 1e-12);
    assert!((hit.u - 0.5).abs() < 1e-12);
    assert!((hit.point - vector![1.0, 1.0]).norm() < 1e-12);
}

#[test]
fn crossing_is_half_open() {
    // Crossing at the end of `s` belongs to the next segment, not this one.
    let s = Segment::new(vector![0.0, 0.0], vector![1.0, 0.0]);
    let o = Segment::new(vector![1.0, -1.0], vector![1.0, 1.0]);
    assert!(segment_intersection(&s, &o).is_none());
    let next = Segment::new(vector![1.0, 0.0], vector![2.0, 0.0]);
    let hit = segment_intersection(&next, &o).expect("start point counts");
    assert_eq!(hit.t, 0.0);
}

#[test]
fn parallel_and_disjoint_segments_do_not_cross() {
    let s = Segment::new(vector![0.0, 0.0], vector![1.0, 0.0]);
    let p = Segment::new(vector![0.0, 1.0], vector![1.0, 1.0]);
    let c = Segment::new(vector![0.5, 0.0], vector![2.0, 0.0]);
    let far = Segment::new(vector![3.0, -1.0], vector![3.0, 1.0]);
    assert!(segment_intersection(&s, &p).is_none());
    assert!(segment_intersection(&s, &c).is_none());
    assert!(segment_intersection(&s, &far).is_none());
}

#[test]
fn signed_area_and_mean() {
    let sq = unit_square();
    assert!((signed_area(&sq) - 1.0).abs() < 1e-12);
    let mut cw = sq.clone();
    cw.reverse();
    assert!((signed_area(&cw) + 1.0).abs() < 1e-12);
    assert_eq!(vertex_mean(&sq), Some(vector![0.5, 0.5]));
    assert_eq!(vertex_mean(&[]), None);
}

#[test]
fn centroid_is_inside_square() {
    assert!(is_inside(vector![0.5, 0.5], &unit_square()));
    assert!(!is_inside(vector![1.5, 0.5], &unit_square()));
}

#[test]
fn boundary_points_are_not_inside() {
    let sq = unit_square();
    // On an edge, on a vertex: zero cross product, classified outside.
    assert!(!is_inside(vector![0.5, 0.0], &sq));
    assert!(!is_inside(vector![1.0, 0.5], &sq));
    assert!(!is_inside(vector![0.0, 0.0], &sq));
    assert!(!is_inside(vector![1.0, 1.0], &sq));
}

#[test]
fn classify_batch_matches_single() {
    let sq = unit_square();
    let pts = vec![
        vector![0.25, 0.25],
        vector![2.0, 2.0],
        vector![0.75, 0.9],
        vector![-0.1, 0.5],
        vector![0.5, 1.0],
    ];
    let batch = classify(&pts, &sq);
    let single: Vec<bool> = pts.iter().map(|p| is_inside(*p, &sq)).collect();
    assert_eq!(batch, single);
    assert_eq!(batch, vec![true, false, true, false, false]);
}

#[test]
fn classify_accepts_clockwise_winding() {
    let mut cw = unit_square();
    cw.reverse();
    assert!(is_inside(vector![0.5, 0.5], &cw));
}

#[test]
fn classify_degenerate_polygon_rejects_everything() {
    let line = vec![vector![0.0, 0.0], vector![1.0, 1.0]];
    assert_eq!(classify(&[vector![0.5, 0.5]], &line), vec![false]);
}

#[test]
fn hull_drops_interior_and_collinear_points() {
    let mut pts = unit_square();
    pts.push(vector![0.5, 0.5]);
    pts.push(vector![0.5, 0.0]); // on the bottom edge
    pts.push(vector![1.0, 1.0]); // duplicate corner
    let h = BareHull::from_point_cloud(&pts).unwrap();
    assert_eq!(h.len(), 4);
    assert!(h.area() > 0.0);
    assert!((h.area() - 1.0).abs() < 1e-12);
    assert_eq!(h.points()[0], vector![0.0, 0.0]);
}

#[test]
fn hull_indices_keep_lowest_duplicate() {
    let pts = vec![
        vector![1.0, 0.0],
        vector![0.0, 0.0],
        vector![0.0, 1.0],
        vector![0.0, 0.0],
    ];
    let idx = convex_hull_indices(&pts);
    assert_eq!(idx, vec![1, 0, 2]);
}

#[test]
fn degenerate_clouds_fail_typed() {
    assert_eq!(
        BareHull::from_point_cloud(&[vector![0.0, 0.0], vector![1.0, 1.0]]),
        Err(HullError::TooFewPoints { distinct: 2 })
    );
    assert_eq!(
        BareHull::from_point_cloud(&[vector![0.0, 0.0], vector![0.0, 0.0], vector![0.0, 0.0]]),
        Err(HullError::TooFewPoints { distinct: 1 })
    );
    assert_eq!(
        BareHull::from_point_cloud(&[
            vector![0.0, 0.0],
            vector![1.0, 1.0],
            vector![2.0, 2.0],
            vector![3.0, 3.0],
        ]),
        Err(HullError::Collinear { distinct: 4 })
    );
    assert_eq!(
        BareHull::from_point_cloud(&[vector![0.0, 0.0], vector![f64::NAN, 1.0]]),
        Err(HullError::NonFinite { index: 1 })
    );
}

#[test]
fn ring_is_normalized_to_ccw_without_repeats() {
    let ring = vec![
        vector![0.0, 1.0],
        vector![1.0, 1.0],
        vector![1.0, 1.0],
        vector![1.0, 0.0],
        vector![0.0, 0.0],
        vector![0.0, 1.0],
    ];
    let h = BareHull::from_ring(ring).unwrap();
    assert_eq!(h.len(), 4);
    assert!(h.area() > 0.0);
    let segs: Vec<_> = h.i_segments().collect();
    assert_eq!(segs, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
    assert_eq!(h.segments().count(), 4);
}

#[test]
fn bounds_cover_vertices() {
    let h = BareHull::from_point_cloud(&unit_square()).unwrap();
    let (lo, hi) = h.bounds();
    assert_eq!(lo, vector![0.0, 0.0]);
    assert_eq!(hi, vector![1.0, 1.0]);
}
