use super::*;
use crate::geom::{BareHull, Pt2};
use crate::merge::CompoundHull;
use nalgebra::vector;
use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

fn close(a: Pt2, b: Pt2) -> bool {
    (a - b).norm() < 1e-9
}

fn centroid(label: &str, x: f64, y: f64, r: f64, n_cells: u64) -> Centroid {
    Centroid {
        label: label.into(),
        name: label.to_uppercase(),
        level: "class".into(),
        n_cells,
        color: "#123456".into(),
        pixel: vector![x, y],
        pixel_r: r,
        stats: BTreeMap::new(),
    }
}

fn world(label: &str, x: f64, y: f64, n_cells: u64) -> WorldCentroid {
    WorldCentroid {
        label: label.into(),
        name: label.to_uppercase(),
        level: "class".into(),
        n_cells,
        color: "#abcdef".into(),
        x,
        y,
        stats: BTreeMap::new(),
    }
}

fn spec(src: &str, dst: &str, k_nn: u32, n_src: u64, n_dst: u64) -> ConnectionSpec {
    ConnectionSpec {
        src_label: src.into(),
        dst_label: dst.into(),
        k_nn,
        src_neighbors: n_src,
        dst_neighbors: n_dst,
    }
}

#[test]
fn transform_insets_by_max_radius_and_flips_y() {
    let canvas = Canvas::default();
    let bounds = WorldBounds::from_points([vector![0.0, 0.0], vector![10.0, 5.0]]).unwrap();
    let t = PixelTransform::fit(bounds, &canvas);
    assert!(close(t.to_pixel(vector![0.0, 0.0]), vector![20.0, 1060.0]));
    assert!(close(t.to_pixel(vector![10.0, 5.0]), vector![780.0, 20.0]));
    assert!(close(t.to_pixel(vector![5.0, 2.5]), vector![400.0, 540.0]));
}

#[test]
fn zero_extent_maps_to_canvas_middle() {
    let canvas = Canvas::default();
    let t = fit_transform([vector![3.0, 3.0]], &canvas).unwrap();
    assert!(close(t.to_pixel(vector![3.0, 3.0]), vector![400.0, 540.0]));
}

#[test]
fn empty_scene_has_no_transform() {
    let canvas = Canvas::default();
    assert_eq!(
        fit_transform(std::iter::empty(), &canvas),
        Err(LayoutError::EmptyScene)
    );
    assert_eq!(
        fit_transform([vector![f64::NAN, 0.0]], &canvas),
        Err(LayoutError::EmptyScene)
    );
}

#[test]
fn radius_endpoints_and_midpoint() {
    let canvas = Canvas::default();
    assert_eq!(node_radius(1000, 1000, &canvas), canvas.max_radius);
    assert_eq!(node_radius(0, 1000, &canvas), canvas.min_radius);
    assert_eq!(node_radius(0, 0, &canvas), canvas.min_radius);
    let half = node_radius(500, 1000, &canvas);
    assert!((half - 20.0 * 1.5f64.log2()).abs() < 1e-12);
}

#[test]
fn ribbon_corners_follow_wedge_angles() {
    let src = centroid("a", 100.0, 100.0, 10.0, 100);
    let dst = centroid("b", 200.0, 100.0, 10.0, 100);
    let s = spec("a", "b", 15, 300, 150);
    let max_ratio = max_connection_ratio(std::slice::from_ref(&s), |l| match l {
        "a" => Some(&src),
        "b" => Some(&dst),
        _ => None,
    });
    assert_eq!(max_ratio, 3.0);
    let r = ribbon(&s, &src, &dst, max_ratio).unwrap();
    let h = 10.0 * std::f64::consts::FRAC_1_SQRT_2;
    assert!(close(r.corners[0], vector![100.0, 110.0]));
    assert!(close(r.corners[1], vector![200.0 - h, 100.0 + h]));
    assert!(close(r.corners[2], vector![200.0 - h, 100.0 - h]));
    assert!(close(r.corners[3], vector![100.0, 90.0]));
    // Both long sides bend the same way, perpendicular to the axis.
    let mid0 = 0.5 * (r.corners[0] + r.corners[1]);
    let mid1 = 0.5 * (r.corners[2] + r.corners[3]);
    assert!(r.ctrl[0].y > mid0.y);
    assert!(r.ctrl[1].y > mid1.y);
    let bow = 0.1 * crate::geom::rot(r.corners[1] - r.corners[0], FRAC_PI_2);
    assert!(close(r.ctrl[0] - mid0, bow));
}

#[test]
fn thin_ribbon_is_widened_to_minimum_chord() {
    let src = centroid("a", 0.0, 0.0, 10.0, 1_000_000);
    let dst = centroid("b", 50.0, 0.0, 4.0, 10);
    let s = spec("a", "b", 15, 0, 1);
    let r = ribbon(&s, &src, &dst, 15.0).unwrap();
    let w_src = (r.corners[0] - r.corners[3]).norm();
    let w_dst = (r.corners[1] - r.corners[2]).norm();
    assert!(w_src >= MIN_RIBBON_WIDTH - 1e-12, "{w_src}");
    assert!(w_dst >= MIN_RIBBON_WIDTH - 1e-12, "{w_dst}");
}

#[test]
fn tiny_node_opens_fully() {
    assert_eq!(wedge_half_angle(0.0, 1.0, 0.1), FRAC_PI_2);
    assert_eq!(wedge_half_angle(1.0, 1.0, 5.0), FRAC_PI_2);
    assert_eq!(wedge_half_angle(1.0, 0.0, 5.0), (0.025f64).asin());
}

#[test]
fn ribbon_rejects_bad_inputs() {
    let a = centroid("a", 0.0, 0.0, 5.0, 10);
    let b = centroid("b", 0.0, 0.0, 5.0, 10);
    assert_eq!(
        ribbon(&spec("a", "b", 15, 1, 1), &a, &b, 1.0),
        Err(LayoutError::CoincidentCentroids {
            src: "a".into(),
            dst: "b".into()
        })
    );
    let c = centroid("c", 10.0, 0.0, 5.0, 10);
    assert_eq!(
        ribbon(&spec("a", "c", 15, 151, 1), &a, &c, 1.0),
        Err(LayoutError::NeighborCountOutOfRange {
            label: "a".into(),
            neighbors: 151,
            bound: 150
        })
    );
}

#[test]
fn corner_control_point_on_square_corner() {
    let ctrl = corner_control_point(vector![0.0, 10.0], vector![0.0, 0.0], vector![10.0, 0.0])
        .unwrap();
    let h = std::f64::consts::FRAC_1_SQRT_2;
    assert!(close(ctrl, vector![h, -h]));
}

#[test]
fn straight_corner_falls_back_to_line() {
    assert!(corner_control_point(vector![-1.0, 0.0], vector![0.0, 0.0], vector![1.0, 0.0]).is_none());
    assert!(corner_control_point(vector![0.0, 0.0], vector![0.0, 0.0], vector![1.0, 0.0]).is_none());

    let ring = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![2.0, 0.0],
        vector![2.0, 2.0],
        vector![0.0, 2.0],
    ];
    let path = smooth_boundary(&ring);
    assert_eq!(path.len(), 5);
    assert!(path[0].ctrl.is_none());
    assert!(path[1].ctrl.is_none());
    assert!(path[2].ctrl.is_some());
    assert!(path[4].end == ring[0]);
}

#[test]
fn path_points_round_trip_exactly() {
    let ring = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![2.0, 0.0],
        vector![2.5, 1.7],
        vector![0.3, 2.1],
    ];
    let path = smooth_boundary(&ring);
    let flat = to_path_points(&path);
    assert_eq!(flat.len(), 4 * ring.len());
    assert!(flat.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    assert_eq!(from_path_points(&flat), Some(path));
    assert_eq!(from_path_points(&flat[..3]), None);
}

#[test]
fn level_layout_places_everything_and_skips_bad_ribbons() {
    let canvas = Canvas::default();
    let world_centroids = vec![world("a", 0.0, 0.0, 100), world("b", 10.0, 5.0, 50)];
    let square = BareHull::from_ring(vec![
        vector![0.0, 0.0],
        vector![2.0, 0.0],
        vector![2.0, 2.0],
        vector![0.0, 2.0],
    ])
    .unwrap();
    let hull = CompoundHull::assemble("a", "A", 100, "#abcdef", vec![square]).unwrap();
    let t = fit_transform(world_centroids.iter().map(WorldCentroid::world), &canvas).unwrap();
    let specs = vec![spec("a", "b", 15, 30, 20), spec("a", "z", 15, 1, 1)];
    let layout = lay_out_level("class", &world_centroids, &specs, &[hull], &t, &canvas);

    assert_eq!(layout.level, "class");
    assert_eq!(layout.centroids.len(), 2);
    let a = layout.centroid("a").unwrap();
    assert!(close(a.pixel, vector![20.0, 1060.0]));
    assert_eq!(a.pixel_r, canvas.max_radius);
    assert!(layout.centroid("b").unwrap().pixel_r < canvas.max_radius);
    assert_eq!(layout.ribbons.len(), 1);
    assert_eq!(layout.ribbons[0].spec.dst_label, "b");
    let h = layout.hull("a").unwrap();
    assert_eq!(h.boundaries.len(), 1);
    assert_eq!(h.boundaries[0].len(), 4);
    assert!(close(h.boundaries[0][0].start, t.to_pixel(vector![0.0, 0.0])));
}

fn ribbon_width_at_src(r: &Ribbon) -> f64 {
    (r.corners[0] - r.corners[3]).norm()
}

#[test]
fn rejected_connection_does_not_narrow_siblings() {
    let cs = vec![
        centroid("a", 0.0, 0.0, 10.0, 100),
        centroid("b", 100.0, 0.0, 10.0, 100),
        centroid("c", 200.0, 0.0, 10.0, 100),
        centroid("d", 0.0, 0.0, 10.0, 100),
    ];
    let good = spec("a", "b", 15, 750, 750);
    let alone = lay_out_ribbons(std::slice::from_ref(&good), &cs);
    assert_eq!(alone.len(), 1);
    assert!((ribbon_width_at_src(&alone[0]) - 20.0).abs() < 1e-9);

    // Out-of-range counts and coincident endpoints are skipped and must not
    // set the ratio the kept ribbon is scaled against.
    let specs = vec![
        good.clone(),
        spec("b", "c", 15, 1_000_000, 10),
        spec("a", "d", 15, 1500, 1500),
    ];
    assert_eq!(
        max_connection_ratio(&specs, |l| cs.iter().find(|c| c.label == l)),
        7.5
    );
    let laid = lay_out_ribbons(&specs, &cs);
    assert_eq!(laid.len(), 1);
    assert_eq!(laid[0].spec, good);
    assert!((ribbon_width_at_src(&laid[0]) - 20.0).abs() < 1e-9);
}

#[test]
fn centroids_without_finite_position_are_skipped() {
    let canvas = Canvas::default();
    let t = fit_transform([vector![0.0, 0.0], vector![10.0, 5.0]], &canvas).unwrap();
    let world_centroids = vec![
        world("a", 0.0, 0.0, 50),
        world("lost", f64::NAN, 1.0, 500),
        world("far", 1.0, f64::INFINITY, 10),
    ];
    let placed = place_centroids(&world_centroids, &t, &canvas);
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].label, "a");
    assert!(placed[0].pixel.iter().all(|v| v.is_finite()));
    // Radii scale against the placed centroids only.
    assert_eq!(placed[0].pixel_r, canvas.max_radius);
}
