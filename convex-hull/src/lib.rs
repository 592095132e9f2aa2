//! Convex hull engine for collision-shape export
//!
//! Computes the 3D convex hull of a point cloud with a quickhull-style
//! incremental construction. The computation is total: any slice of points
//! produces a [`HullPolytope`], and inputs that do not span three dimensions
//! come back as explicit degenerate results instead of errors.
//!
//! | Input spans | Result kind | Vertices | Faces |
//! |-------------|-------------|----------|-------|
//! | nothing | [`HullKind::Empty`] | 0 | 0 |
//! | a single location | [`HullKind::Point`] | 1 | 0 |
//! | a line | [`HullKind::Segment`] | 2 (extreme endpoints) | 0 |
//! | a plane | [`HullKind::Polygon`] | boundary, in order | 0 |
//! | a volume | [`HullKind::Polyhedron`] | hull corners | triangles, outward |
//!
//! # Tolerance
//!
//! All "on plane" and "outside" tests use one absolute tolerance derived from
//! the point cloud: `relative_tolerance × bounding-box diagonal`. Points within
//! that distance of the current hull are not added, which keeps coplanar
//! clusters from being refined forever. Which faces a point can see is decided
//! with exact predicates, so thin slabs and slivers still close up convex.
//! Afterwards any vertex within tolerance of the hull of its neighbours (a
//! point on a flat facet or along an edge) is dropped and the hull rebuilt
//! without it. When several candidates are exactly equidistant the one with
//! the lowest input index wins, so the result is deterministic for a given
//! input order.
//!
//! # Usage
//!
//! ```
//! use convex_hull::{compute_hull, HullKind, Point3};
//!
//! let corners: Vec<Point3> = (0..8)
//!     .map(|i| Point3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
//!     .collect();
//!
//! let hull = compute_hull(&corners);
//! assert_eq!(hull.kind(), HullKind::Polyhedron);
//! assert_eq!(hull.vertex_count(), 8);
//! assert_eq!(hull.face_count(), 12);
//! ```

mod planar;
mod polytope;
mod prune;
mod quickhull;

pub use polytope::{HullKind, HullPolytope};

use glam::DVec3;
use hashbrown::HashSet;

/// A point in export space. Coordinates are expected to be finite.
pub type Point3 = DVec3;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance, relative to the bounding-box diagonal of the input.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Rebuilds after dropping redundant vertices; one round nearly always suffices.
const MAX_PRUNE_ROUNDS: usize = 4;

// =============================================================================
// Entry points
// =============================================================================

/// Computes the convex hull of `points` with [`DEFAULT_RELATIVE_TOLERANCE`].
pub fn compute_hull(points: &[Point3]) -> HullPolytope {
    compute_hull_with_tolerance(points, DEFAULT_RELATIVE_TOLERANCE)
}

/// Computes the convex hull of `points` with a caller-chosen relative tolerance.
///
/// Non-finite points are skipped and exact duplicates collapse onto their
/// first occurrence. A negative tolerance is treated as zero.
pub fn compute_hull_with_tolerance(points: &[Point3], relative_tolerance: f64) -> HullPolytope {
    let unique = unique_points(points);
    if unique.is_empty() {
        return HullPolytope::empty();
    }

    let (min, max) = bounds(&unique);
    let diagonal = (max - min).length();
    let eps = diagonal * relative_tolerance.max(0.0);

    let hull = hull_of_unique(&unique, eps, true);

    tracing::debug!(
        input = points.len(),
        unique = unique.len(),
        kind = ?hull.kind(),
        vertices = hull.vertex_count(),
        faces = hull.face_count(),
        "computed convex hull"
    );

    hull
}

/// Hull of finite, duplicate-free points with an absolute tolerance.
///
/// With `prune` set, polyhedron vertices that do not stick out of the hull
/// of their neighbours by more than `eps` are removed.
pub(crate) fn hull_of_unique(points: &[DVec3], eps: f64, prune: bool) -> HullPolytope {
    match select_simplex(points, eps) {
        Simplex::Point(i) => HullPolytope::point(points[i], eps),
        Simplex::Segment(a, b) => {
            let (first, last) = planar::segment_endpoints(points, a, b);
            HullPolytope::segment(points[first], points[last], eps)
        }
        Simplex::Triangle(a, b, c) => {
            let boundary = planar::polygon_boundary(points, [a, b, c], eps);
            HullPolytope::polygon(boundary.iter().map(|&i| points[i]).collect(), eps)
        }
        Simplex::Tetrahedron(tetra) => {
            let mut faces = quickhull::build(points, tetra, eps);
            if prune {
                faces = prune_faces(points, faces, eps);
            }
            HullPolytope::polyhedron_from_indices(points, &faces, eps)
        }
    }
}

fn prune_faces(points: &[DVec3], mut faces: Vec<[usize; 3]>, eps: f64) -> Vec<[usize; 3]> {
    let mut pruned = false;
    for _ in 0..MAX_PRUNE_ROUNDS {
        let redundant = prune::redundant_vertices(points, &faces, eps);
        if redundant.is_empty() {
            break;
        }

        let mut kept: Vec<usize> = faces.iter().flatten().copied().collect();
        kept.sort_unstable();
        kept.dedup();
        kept.retain(|v| redundant.binary_search(v).is_err());

        let subset: Vec<DVec3> = kept.iter().map(|&i| points[i]).collect();
        let Simplex::Tetrahedron(tetra) = select_simplex(&subset, eps) else {
            break;
        };
        tracing::trace!(dropped = redundant.len(), "rebuilding hull without redundant vertices");
        faces = quickhull::build(&subset, tetra, eps)
            .into_iter()
            .map(|f| f.map(|i| kept[i]))
            .collect();
        pruned = true;
    }

    // Dropped points must still end up inside.
    if pruned {
        faces = quickhull::extend(points, &faces, eps);
    }
    faces
}

// =============================================================================
// Preprocessing
// =============================================================================

/// Drops non-finite points and exact duplicates, keeping first occurrences in input order.
fn unique_points(points: &[Point3]) -> Vec<DVec3> {
    let mut seen: HashSet<[u64; 3]> = HashSet::with_capacity(points.len());
    let mut unique = Vec::with_capacity(points.len());

    for p in points {
        if !p.is_finite() {
            tracing::trace!(?p, "skipping non-finite hull input");
            continue;
        }
        // Adding 0.0 folds -0.0 into 0.0 so both hash alike.
        let key = [
            (p.x + 0.0).to_bits(),
            (p.y + 0.0).to_bits(),
            (p.z + 0.0).to_bits(),
        ];
        if seen.insert(key) {
            unique.push(*p);
        }
    }

    unique
}

fn bounds(points: &[DVec3]) -> (DVec3, DVec3) {
    points.iter().fold(
        (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    )
}

// =============================================================================
// Initial simplex
// =============================================================================

/// Largest simplex found while growing from the extreme points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Simplex {
    Point(usize),
    Segment(usize, usize),
    Triangle(usize, usize, usize),
    Tetrahedron([usize; 4]),
}

fn select_simplex(points: &[DVec3], eps: f64) -> Simplex {
    let extremes = axis_extremes(points);
    let (p0, p1) = farthest_pair(&extremes, points);
    if points[p0].distance(points[p1]) <= eps {
        return Simplex::Point(p0.min(p1));
    }

    let Some(p2) = farthest_from_line(points, p0, p1, eps) else {
        return Simplex::Segment(p0, p1);
    };

    let Some(p3) = farthest_from_plane(points, p0, p1, p2, eps) else {
        return Simplex::Triangle(p0, p1, p2);
    };

    Simplex::Tetrahedron([p0, p1, p2, p3])
}

/// Min and max point index along each axis (ties keep the lower index).
fn axis_extremes(points: &[DVec3]) -> [usize; 6] {
    let mut ext = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[ext[axis * 2]][axis] {
                ext[axis * 2] = i;
            }
            if p[axis] > points[ext[axis * 2 + 1]][axis] {
                ext[axis * 2 + 1] = i;
            }
        }
    }
    ext
}

fn farthest_pair(candidates: &[usize], points: &[DVec3]) -> (usize, usize) {
    let mut best = (candidates[0], candidates[0]);
    let mut best_dist = -1.0;

    for (i, &a) in candidates.iter().enumerate() {
        for &b in &candidates[i + 1..] {
            let d = points[a].distance_squared(points[b]);
            if d > best_dist {
                best_dist = d;
                best = (a.min(b), a.max(b));
            }
        }
    }
    best
}

fn farthest_from_line(points: &[DVec3], a: usize, b: usize, eps: f64) -> Option<usize> {
    let origin = points[a];
    let dir = (points[b] - origin).normalize();

    let mut best = None;
    let mut best_dist = eps;
    for (i, p) in points.iter().enumerate() {
        let v = *p - origin;
        let dist = (v - v.dot(dir) * dir).length();
        if dist > best_dist {
            best_dist = dist;
            best = Some(i);
        }
    }
    best
}

fn farthest_from_plane(points: &[DVec3], a: usize, b: usize, c: usize, eps: f64) -> Option<usize> {
    let origin = points[a];
    let normal = (points[b] - origin)
        .cross(points[c] - origin)
        .normalize();

    let mut best = None;
    let mut best_dist = eps;
    for (i, p) in points.iter().enumerate() {
        let dist = normal.dot(*p - origin).abs();
        if dist > best_dist {
            best_dist = dist;
            best = Some(i);
        }
    }
    best
}
