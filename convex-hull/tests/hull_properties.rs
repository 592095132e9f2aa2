//! Property and scenario tests for the hull engine

use convex_hull::{compute_hull, compute_hull_with_tolerance, HullKind, HullPolytope, Point3};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

fn unit_cube() -> Vec<Point3> {
    (0..8)
        .map(|i| Point3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
        .collect()
}

fn random_cloud(rng: &mut StdRng, count: usize) -> Vec<Point3> {
    (0..count)
        .map(|_| {
            Point3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            )
        })
        .collect()
}

fn slack(hull: &HullPolytope) -> f64 {
    8.0 * hull.tolerance() + 1e-12
}

fn assert_closed_manifold(hull: &HullPolytope) {
    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
    let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
    for f in hull.faces() {
        for (a, b) in [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])] {
            *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            *directed.entry((a, b)).or_insert(0) += 1;
        }
    }
    assert!(
        counts.values().all(|&c| c == 2),
        "every edge must be shared by exactly two faces"
    );
    assert!(
        directed.values().all(|&c| c == 1),
        "faces must wind consistently"
    );

    // Euler characteristic of a sphere
    let v = hull.vertex_count() as i64;
    let e = counts.len() as i64;
    let f = hull.face_count() as i64;
    assert_eq!(v - e + f, 2);
}

fn assert_contains_all(hull: &HullPolytope, points: &[Point3]) {
    for p in points {
        let d = hull.distance_outside(*p);
        assert!(d <= slack(hull), "{p:?} lies {d} outside the hull");
    }
}

fn assert_convex(hull: &HullPolytope) {
    for i in 0..hull.face_count() {
        let (normal, offset) = hull.face_plane(i);
        for v in hull.vertices() {
            assert!(
                normal.dot(*v) - offset <= slack(hull),
                "hull vertex {v:?} lies in front of face {i}"
            );
        }
    }
}

fn sorted_vertices(hull: &HullPolytope) -> Vec<[f64; 3]> {
    let mut v: Vec<[f64; 3]> = hull.vertices().iter().map(|p| p.to_array()).collect();
    v.sort_by(|a, b| {
        a[0].total_cmp(&b[0])
            .then(a[1].total_cmp(&b[1]))
            .then(a[2].total_cmp(&b[2]))
    });
    v
}

#[test]
fn test_box_scenario() {
    let hull = compute_hull(&unit_cube());

    assert_eq!(hull.kind(), HullKind::Polyhedron);
    assert_eq!(hull.vertex_count(), 8);
    assert_eq!(hull.face_count(), 12);
    assert_closed_manifold(&hull);
    assert_convex(&hull);
}

#[test]
fn test_box_faces_point_outward() {
    let hull = compute_hull(&unit_cube());
    let center = Point3::splat(0.5);
    for i in 0..hull.face_count() {
        let (normal, offset) = hull.face_plane(i);
        assert!(normal.dot(center) - offset < -0.4);
    }
}

#[test]
fn test_interior_and_duplicate_points_are_ignored() {
    let mut points = unit_cube();
    points.push(Point3::splat(0.5));
    points.push(Point3::new(0.5, 0.5, 0.0)); // on a face
    points.push(Point3::new(1.0, 0.5, 0.0)); // on an edge
    points.extend(unit_cube());

    let hull = compute_hull(&points);
    assert_eq!(hull.vertex_count(), 8);
    assert_eq!(hull.face_count(), 12);
    assert_contains_all(&hull, &points);
}

#[test]
fn test_single_point() {
    let hull = compute_hull(&[Point3::new(1.0, 2.0, 3.0)]);
    assert_eq!(hull.kind(), HullKind::Point);
    assert_eq!(hull.vertices(), &[Point3::new(1.0, 2.0, 3.0)]);
    assert!(hull.faces().is_empty());
}

#[test]
fn test_coincident_points_collapse_to_one_vertex() {
    let hull = compute_hull(&[Point3::ONE; 5]);
    assert_eq!(hull.kind(), HullKind::Point);
    assert_eq!(hull.vertex_count(), 1);
}

#[test]
fn test_two_points_make_a_segment() {
    let a = Point3::new(0.0, 0.0, 0.0);
    let b = Point3::new(1.0, 2.0, 3.0);
    let hull = compute_hull(&[a, b]);
    assert_eq!(hull.kind(), HullKind::Segment);
    assert_eq!(hull.vertices(), &[a, b]);
    assert!(hull.faces().is_empty());
}

#[test]
fn test_collinear_points_keep_extreme_endpoints() {
    let points: Vec<Point3> = [0.3, -2.0, 0.0, 5.0, 1.0]
        .iter()
        .map(|&t| Point3::new(t, 2.0 * t, -t))
        .collect();
    let hull = compute_hull(&points);
    assert_eq!(hull.kind(), HullKind::Segment);
    assert_eq!(hull.vertices(), &[points[1], points[3]]);
    assert_contains_all(&hull, &points);
}

#[test]
fn test_flat_scenario() {
    let square = [
        Point3::new(-1.0, -1.0, 0.0),
        Point3::new(1.0, -1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(-1.0, 1.0, 0.0),
    ];
    let hull = compute_hull(&square);
    assert_eq!(hull.kind(), HullKind::Polygon);
    assert_eq!(hull.vertex_count(), 4);
    assert!(hull.faces().is_empty());
    assert_contains_all(&hull, &square);
}

#[test]
fn test_polygon_vertices_trace_the_boundary() {
    let mut rng = StdRng::seed_from_u64(11);
    // Tilted plane through the origin
    let u = Point3::new(1.0, 0.0, 1.0).normalize();
    let v = Point3::new(0.0, 1.0, 0.0);
    let points: Vec<Point3> = (0..200)
        .map(|_| u * rng.random_range(-3.0..3.0) + v * rng.random_range(-1.0..1.0))
        .collect();

    let hull = compute_hull(&points);
    assert_eq!(hull.kind(), HullKind::Polygon);
    assert!(hull.vertex_count() >= 3);
    assert_contains_all(&hull, &points);

    // Consecutive boundary vertices turn the same way everywhere.
    let verts = hull.vertices();
    let n = verts.len();
    let reference = (verts[1] - verts[0]).cross(verts[2] - verts[1]);
    for i in 0..n {
        let turn = (verts[(i + 1) % n] - verts[i]).cross(verts[(i + 2) % n] - verts[(i + 1) % n]);
        assert!(turn.dot(reference) > 0.0, "boundary is not convex at {i}");
    }
}

#[test]
fn test_random_clouds_contain_every_input_point() {
    let mut rng = StdRng::seed_from_u64(42);
    for count in [4, 10, 50, 500] {
        let points = random_cloud(&mut rng, count);
        let hull = compute_hull(&points);
        assert_eq!(hull.kind(), HullKind::Polyhedron);
        assert_contains_all(&hull, &points);
        assert_convex(&hull);
        assert_closed_manifold(&hull);
    }
}

#[test]
fn test_hull_is_invariant_to_input_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut points = random_cloud(&mut rng, 300);
    let expected = sorted_vertices(&compute_hull(&points));

    for _ in 0..5 {
        points.shuffle(&mut rng);
        assert_eq!(sorted_vertices(&compute_hull(&points)), expected);
    }
}

#[test]
fn test_points_on_a_sphere_are_all_hull_vertices() {
    let mut rng = StdRng::seed_from_u64(3);
    let points: Vec<Point3> = std::iter::repeat_with(|| {
        Point3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        )
    })
    .filter(|p| p.length() > 0.1 && p.length() < 1.0)
    .take(200)
    .map(|p| p.normalize() * 10.0)
    .collect();

    let hull = compute_hull(&points);
    assert_eq!(hull.vertex_count(), 200);
    assert_closed_manifold(&hull);
}

/// Points in a box `[-1, 1]` along the axes in `wide` and `[-t, t]` along the rest.
fn thin_box_cloud(rng: &mut StdRng, count: usize, t: f64, wide: [bool; 3]) -> Vec<Point3> {
    (0..count)
        .map(|_| {
            let [x, y, z] = wide.map(|w| {
                let half = if w { 1.0 } else { t };
                rng.random_range(-half..half)
            });
            Point3::new(x, y, z)
        })
        .collect()
}

#[test]
fn test_thin_slabs_and_slivers_stay_closed_and_contain_their_points() {
    let shapes = [("slab", [true, true, false]), ("sliver", [true, false, false])];
    for t in [1e-2, 1e-3, 1e-4, 1e-5, 1e-6, 1e-7] {
        for (shape, wide) in shapes {
            for seed in 0..20 {
                let mut rng = StdRng::seed_from_u64(seed);
                let points = thin_box_cloud(&mut rng, 300, t, wide);
                let hull = compute_hull(&points);

                assert_eq!(hull.kind(), HullKind::Polyhedron, "{shape} t={t} seed={seed}");
                assert_contains_all(&hull, &points);
                assert_closed_manifold(&hull);
                assert_convex(&hull);
            }
        }
    }
}

#[test]
fn test_coplanar_clusters_terminate() {
    // Dense grid on every face of a cube: many points exactly on hull planes.
    let mut points = Vec::new();
    for i in 0..=10 {
        for j in 0..=10 {
            let (a, b) = (i as f64 / 10.0, j as f64 / 10.0);
            points.extend([
                Point3::new(a, b, 0.0),
                Point3::new(a, b, 1.0),
                Point3::new(a, 0.0, b),
                Point3::new(a, 1.0, b),
                Point3::new(0.0, a, b),
                Point3::new(1.0, a, b),
            ]);
        }
    }

    let hull = compute_hull(&points);
    assert_eq!(hull.vertex_count(), 8);
    assert_eq!(hull.face_count(), 12);
    assert_contains_all(&hull, &points);
}

#[test]
fn test_non_finite_points_are_skipped() {
    let mut points = unit_cube();
    points.push(Point3::new(f64::NAN, 0.0, 0.0));
    points.push(Point3::new(0.0, f64::INFINITY, 0.0));

    let hull = compute_hull(&points);
    assert_eq!(hull.vertex_count(), 8);
    assert!(hull.vertices().iter().all(|v| v.is_finite()));
}

#[test]
fn test_tolerance_scales_with_the_point_cloud() {
    let big: Vec<Point3> = unit_cube().into_iter().map(|p| p * 1000.0).collect();
    let hull = compute_hull(&big);
    assert_eq!(hull.vertex_count(), 8);
    assert!((hull.tolerance() - 1000.0 * 3f64.sqrt() * 1e-9).abs() < 1e-12);

    // A coarse tolerance swallows a bump that a fine one keeps.
    let mut bumped = unit_cube();
    bumped.push(Point3::new(0.5, 0.5, 1.001));
    assert_eq!(compute_hull(&bumped).vertex_count(), 9);
    assert_eq!(compute_hull_with_tolerance(&bumped, 1e-2).vertex_count(), 8);
}
