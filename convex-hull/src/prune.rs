//! Removal of vertices that do not stick out of the hull
//!
//! Exact construction keeps every point that was ever strictly outside, so
//! a point lying on a flat facet or on a straight edge can survive as a
//! vertex. Such a vertex lies (within tolerance) inside the hull of its
//! neighbours, and that is the test used here.

use crate::polytope::HullKind;
use glam::DVec3;
use hashbrown::HashMap;

/// Vertices of `faces` within `eps` of the convex hull of their neighbours,
/// ascending.
pub(crate) fn redundant_vertices(points: &[DVec3], faces: &[[usize; 3]], eps: f64) -> Vec<usize> {
    let mut redundant: Vec<usize> = vertex_links(faces)
        .into_iter()
        .filter(|(v, link)| distance_to_link_hull(points, link, points[*v], eps) <= eps)
        .map(|(v, _)| v)
        .collect();
    redundant.sort_unstable();
    redundant
}

/// Neighbour set of every vertex, sorted.
fn vertex_links(faces: &[[usize; 3]]) -> HashMap<usize, Vec<usize>> {
    let mut links: HashMap<usize, Vec<usize>> = HashMap::new();
    for &[a, b, c] in faces {
        links.entry(a).or_default().extend([b, c]);
        links.entry(b).or_default().extend([c, a]);
        links.entry(c).or_default().extend([a, b]);
    }
    for link in links.values_mut() {
        link.sort_unstable();
        link.dedup();
    }
    links
}

/// Euclidean distance from `v` to the hull of `link`.
///
/// `v` is a vertex of a hull that contains the link, so it is never strictly
/// inside the link hull and the nearest boundary triangle gives the distance.
fn distance_to_link_hull(points: &[DVec3], link: &[usize], v: DVec3, eps: f64) -> f64 {
    let cloud: Vec<DVec3> = link.iter().map(|&i| points[i]).collect();
    let hull = crate::hull_of_unique(&cloud, eps, false);

    match hull.kind() {
        HullKind::Polyhedron => hull
            .faces()
            .iter()
            .map(|f| {
                let [a, b, c] = f.map(|i| hull.vertices()[i]);
                v.distance(closest_point_on_triangle(v, a, b, c))
            })
            .fold(f64::INFINITY, f64::min),
        _ => hull.distance_outside(v),
    }
}

/// Closest point to `p` on triangle `abc` (Voronoi-region walk).
fn closest_point_on_triangle(p: DVec3, a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}
