use std::collections::BTreeMap;

use constellation::layout::{
    from_path_points, node_radius, ribbon, smooth_boundary, to_path_points, Canvas, Centroid,
    ConnectionSpec, MIN_RIBBON_WIDTH,
};
use constellation::prelude::*;
use constellation::synth::regular_polygon;
use proptest::prelude::*;

fn cloud_strategy() -> impl Strategy<Value = Vec<Pt2>> {
    prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 3..40)
        .prop_map(|v| v.into_iter().map(|(x, y)| Pt2::new(x, y)).collect())
}

fn square(x0: f64, y0: f64, side: f64) -> BareHull {
    BareHull::from_ring(vec![
        Pt2::new(x0, y0),
        Pt2::new(x0 + side, y0),
        Pt2::new(x0 + side, y0 + side),
        Pt2::new(x0, y0 + side),
    ])
    .unwrap()
}

fn node(label: &str, x: f64, r: f64, n_cells: u64) -> Centroid {
    Centroid {
        label: label.into(),
        name: label.into(),
        level: "cluster".into(),
        n_cells,
        color: "#000000".into(),
        pixel: Pt2::new(x, 0.0),
        pixel_r: r,
        stats: BTreeMap::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 512, .. ProptestConfig::default() })]

    #[test]
    fn hull_contains_its_vertex_mean(cloud in cloud_strategy()) {
        let hull = BareHull::from_point_cloud(&cloud);
        prop_assume!(hull.is_ok());
        let hull = hull.unwrap();
        prop_assume!(hull.area() > 1.0);
        prop_assert!(hull.area() > 0.0);
        prop_assert!(is_inside(hull.vertex_mean(), hull.points()));
        // Vertices sit on the boundary and are never strictly inside.
        prop_assert!(classify(hull.points(), hull.points()).iter().all(|b| !b));
    }

    #[test]
    fn radius_is_monotone(a in 0u64..100_000, b in 0u64..100_000, extra in 0u64..100_000) {
        let canvas = Canvas::default();
        let (lo, hi) = (a.min(b), a.max(b));
        let max_n = hi + extra;
        let r_lo = node_radius(lo, max_n, &canvas);
        let r_hi = node_radius(hi, max_n, &canvas);
        prop_assert!(r_lo <= r_hi);
        prop_assert!(r_lo >= canvas.min_radius);
        prop_assert!(r_hi <= canvas.max_radius + 1e-12);
    }

    #[test]
    fn ribbon_ends_are_never_thinner_than_minimum(
        n_src in 1u64..1_000_000,
        n_dst in 1u64..1_000_000,
        k_nn in 1u32..30,
        f_src in 0.0f64..=1.0,
        f_dst in 0.0f64..=1.0,
        r_src in 0.125f64..30.0,
        r_dst in 0.125f64..30.0,
    ) {
        let src = node("s", 0.0, r_src, n_src);
        let dst = node("d", 100.0, r_dst, n_dst);
        let spec = ConnectionSpec {
            src_label: "s".into(),
            dst_label: "d".into(),
            k_nn,
            src_neighbors: ((k_nn as u64 * n_src) as f64 * f_src) as u64,
            dst_neighbors: ((k_nn as u64 * n_dst) as f64 * f_dst) as u64,
        };
        let max_ratio = f64::from(k_nn);
        let r = ribbon(&spec, &src, &dst, max_ratio).unwrap();
        let w_src = (r.corners[0] - r.corners[3]).norm();
        let w_dst = (r.corners[1] - r.corners[2]).norm();
        prop_assert!(w_src >= MIN_RIBBON_WIDTH - 1e-9, "src width {}", w_src);
        prop_assert!(w_dst >= MIN_RIBBON_WIDTH - 1e-9, "dst width {}", w_dst);
    }

    #[test]
    fn merge_all_is_a_fixed_point(
        cells in prop::collection::vec((0u8..8, 0u8..8, 1u8..4), 0..12)
    ) {
        // Squares on a half-unit lattice: overlaps, containment, touching edges.
        let hulls: Vec<BareHull> = cells
            .iter()
            .map(|&(x, y, s)| square(0.5 * f64::from(x), 0.5 * f64::from(y), 0.5 * f64::from(s)))
            .collect();
        let n = hulls.len();
        let once = merge_all(hulls);
        prop_assert!(once.len() <= n);
        let twice = merge_all(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn path_points_survive_json(n in 3usize..12, r in 1.0f64..500.0, cx in -50.0f64..50.0) {
        let ring = regular_polygon(n, r, Pt2::new(cx, 3.0));
        let path = smooth_boundary(&ring);
        let flat: Vec<[f64; 2]> = to_path_points(&path).iter().map(|p| [p.x, p.y]).collect();
        let text = serde_json::to_string(&flat).unwrap();
        let back: Vec<[f64; 2]> = serde_json::from_str(&text).unwrap();
        let pts: Vec<Pt2> = back.iter().map(|a| Pt2::new(a[0], a[1])).collect();
        prop_assert_eq!(from_path_points(&pts), Some(path));
    }
}
