//! Hulls of point sets that do not span three dimensions.

use glam::{DVec2, DVec3};

/// Extreme points of a collinear set along the direction `a -> b`.
///
/// Returns `(first, last)` ordered by input index.
pub(crate) fn segment_endpoints(points: &[DVec3], a: usize, b: usize) -> (usize, usize) {
    let origin = points[a];
    let dir = points[b] - origin;

    let mut lo = (0, f64::INFINITY);
    let mut hi = (0, f64::NEG_INFINITY);
    for (i, p) in points.iter().enumerate() {
        let t = dir.dot(*p - origin);
        if t < lo.1 {
            lo = (i, t);
        }
        if t > hi.1 {
            hi = (i, t);
        }
    }

    (lo.0.min(hi.0), lo.0.max(hi.0))
}

/// Boundary of a coplanar point set, counter-clockwise about the normal of
/// the seed triangle `(a, b, c)`.
///
/// Uses Andrew's monotone chain on coordinates projected into the plane.
/// Boundary points within `eps` of the line through their neighbours are dropped.
pub(crate) fn polygon_boundary(points: &[DVec3], seed: [usize; 3], eps: f64) -> Vec<usize> {
    let [a, b, c] = seed;
    let origin = points[a];
    let normal = (points[b] - origin).cross(points[c] - origin).normalize();
    let u = (points[b] - origin).normalize();
    let v = normal.cross(u);

    let projected: Vec<DVec2> = points
        .iter()
        .map(|p| {
            let d = *p - origin;
            DVec2::new(d.dot(u), d.dot(v))
        })
        .collect();

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        let (pi, pj) = (projected[i], projected[j]);
        pi.x.total_cmp(&pj.x)
            .then(pi.y.total_cmp(&pj.y))
            .then(i.cmp(&j))
    });

    // Pops while `mid` is not strictly left of `from -> to` by more than eps.
    let turns_left = |from: usize, mid: usize, to: usize| {
        let (o, m, t) = (projected[from], projected[mid], projected[to]);
        (m - o).perp_dot(t - o) > eps * (t - o).length()
    };

    let mut lower: Vec<usize> = Vec::with_capacity(order.len());
    for &i in &order {
        while lower.len() >= 2 && !turns_left(lower[lower.len() - 2], lower[lower.len() - 1], i) {
            lower.pop();
        }
        lower.push(i);
    }

    let mut upper: Vec<usize> = Vec::with_capacity(order.len());
    for &i in order.iter().rev() {
        while upper.len() >= 2 && !turns_left(upper[upper.len() - 2], upper[upper.len() - 1], i) {
            upper.pop();
        }
        upper.push(i);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_endpoints_pick_extremes() {
        let points = [
            DVec3::new(0.5, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
        ];
        assert_eq!(segment_endpoints(&points, 0, 3), (1, 2));
    }

    #[test]
    fn test_polygon_boundary_square_with_interior_and_edge_points() {
        let points = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.5, 0.5, 0.0),
            DVec3::new(0.5, 0.0, 0.0),
        ];
        let boundary = polygon_boundary(&points, [0, 1, 2], 1e-9);
        assert_eq!(boundary.len(), 4);
        assert!(!boundary.contains(&4));
        assert!(!boundary.contains(&5));
        // Counter-clockwise about +Z starting at the lexicographic minimum.
        assert_eq!(boundary, vec![0, 1, 2, 3]);
    }
}
