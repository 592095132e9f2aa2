//! # QuickHull
//!
//! Incremental 3D hull construction starting from a tetrahedron.
//!
//! 1. Orient the four seed faces away from the tetrahedron
//! 2. Give every remaining point to the first face it lies outside of
//! 3. Pop a face with a non-empty outside set and take its farthest point (the eye)
//! 4. Flood-fill the faces visible from the eye and collect their horizon edges
//! 5. Replace the visible faces with a cone from the horizon to the eye
//! 6. Hand the orphaned outside points to the new faces; points outside none are interior
//! 7. Once no face has outside points, sweep every non-vertex point against
//!    the finished faces and go back to 3 with any that still lie outside
//!
//! Visibility uses exact orientation predicates, so the visible region is
//! always one disk and the hull stays convex. The tolerance only decides
//! which points are worth adding.
//!
//! Faces are kept in an arena and adjacency is recovered through a map of
//! directed edges: the face across edge `(a, b)` is the one owning `(b, a)`.

use glam::DVec3;
use hashbrown::{HashMap, HashSet};
use robust::{orient3d, Coord3D};
use std::collections::VecDeque;

type FaceId = usize;

#[derive(Debug, Clone)]
struct Face {
    vertices: [usize; 3],
    normal: DVec3,
    offset: f64,
    /// Points beyond this face, ascending by index.
    outside: Vec<usize>,
    alive: bool,
}

impl Face {
    fn new(vertices: [usize; 3], points: &[DVec3]) -> Self {
        let [a, b, c] = vertices.map(|v| points[v]);
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            vertices,
            normal,
            offset: normal.dot(a),
            outside: Vec::new(),
            alive: true,
        }
    }

    fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

fn coord(p: DVec3) -> Coord3D<f64> {
    Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

/// Exact test: `p` lies strictly on the side `(b - a) × (c - a)` points to.
fn in_front(a: DVec3, b: DVec3, c: DVec3, p: DVec3) -> bool {
    orient3d(coord(a), coord(b), coord(c), coord(p)) < 0.0
}

struct QuickHull<'a> {
    points: &'a [DVec3],
    eps: f64,
    faces: Vec<Face>,
    edges: HashMap<(usize, usize), FaceId>,
    pending: VecDeque<FaceId>,
    /// Eyes that could not be inserted; never offered again
    rejected: HashSet<usize>,
    steps: usize,
}

/// Runs quickhull from the seed tetrahedron and returns outward triangles
/// indexing into `points`.
pub(crate) fn build(points: &[DVec3], tetra: [usize; 4], eps: f64) -> Vec<[usize; 3]> {
    let mut hull = QuickHull::new(points, eps);

    let seeds = hull.seed(tetra);
    let remaining: Vec<usize> = (0..points.len()).filter(|i| !tetra.contains(i)).collect();
    hull.assign(&remaining, &seeds);
    hull.pending.extend(seeds);

    hull.settle();
    hull.into_faces()
}

/// Grows an existing closed convex triangulation until every point in
/// `points` lies inside it or within `eps` of it.
pub(crate) fn extend(points: &[DVec3], faces: &[[usize; 3]], eps: f64) -> Vec<[usize; 3]> {
    let mut hull = QuickHull::new(points, eps);
    for &face in faces {
        hull.add_face(face);
    }
    hull.settle();
    hull.into_faces()
}

impl<'a> QuickHull<'a> {
    fn new(points: &'a [DVec3], eps: f64) -> Self {
        Self {
            points,
            eps,
            faces: Vec::with_capacity(points.len().min(1 << 16) * 2),
            edges: HashMap::new(),
            pending: VecDeque::new(),
            rejected: HashSet::new(),
            steps: 0,
        }
    }

    fn into_faces(self) -> Vec<[usize; 3]> {
        tracing::trace!(
            steps = self.steps,
            rejected = self.rejected.len(),
            faces = self.faces.len(),
            "quickhull finished"
        );
        self.faces
            .into_iter()
            .filter(|f| f.alive)
            .map(|f| f.vertices)
            .collect()
    }

    fn seed(&mut self, [p0, p1, p2, p3]: [usize; 4]) -> Vec<FaceId> {
        let pts = self.points;

        // Base triangle faces away from the apex; the sides follow from
        // reversing each base edge and closing it at the apex.
        let [a, b, c] = if in_front(pts[p0], pts[p1], pts[p2], pts[p3]) {
            [p0, p2, p1]
        } else {
            [p0, p1, p2]
        };

        [[a, b, c], [b, a, p3], [c, b, p3], [a, c, p3]]
            .into_iter()
            .map(|verts| self.add_face(verts))
            .collect()
    }

    fn add_face(&mut self, vertices: [usize; 3]) -> FaceId {
        let id = self.faces.len();
        let face = Face::new(vertices, self.points);
        for edge in face.edges() {
            if self.edges.insert(edge, id).is_some() {
                tracing::warn!(?edge, "hull edge claimed twice; topology may be inconsistent");
            }
        }
        self.faces.push(face);
        id
    }

    fn remove_face(&mut self, id: FaceId) -> Vec<usize> {
        let face = &mut self.faces[id];
        face.alive = false;
        let outside = std::mem::take(&mut face.outside);
        for edge in face.edges() {
            if self.edges.get(&edge) == Some(&id) {
                self.edges.remove(&edge);
            }
        }
        outside
    }

    fn neighbor(&self, (a, b): (usize, usize)) -> Option<FaceId> {
        self.edges.get(&(b, a)).copied()
    }

    /// Exact visibility of `p` from face `fid`.
    fn sees(&self, fid: FaceId, p: DVec3) -> bool {
        let [a, b, c] = self.faces[fid].vertices.map(|v| self.points[v]);
        in_front(a, b, c, p)
    }

    /// More than `eps` beyond the face and strictly visible from it.
    fn is_outside(&self, fid: FaceId, p: DVec3) -> bool {
        self.faces[fid].distance(p) > self.eps && self.sees(fid, p)
    }

    /// Gives each point to the first face in `faces` it lies beyond.
    fn assign(&mut self, candidates: &[usize], faces: &[FaceId]) {
        for &p in candidates {
            let point = self.points[p];
            if let Some(&fid) = faces.iter().find(|&&fid| self.is_outside(fid, point)) {
                self.faces[fid].outside.push(p);
            }
        }
    }

    /// Adds points until no face has an outside set and no point is left
    /// beyond the finished faces.
    fn settle(&mut self) {
        loop {
            while let Some(fid) = self.pending.pop_front() {
                let face = &self.faces[fid];
                if !face.alive || face.outside.is_empty() {
                    continue;
                }
                self.add_point(fid);
            }
            if self.sweep() == 0 {
                break;
            }
        }
    }

    /// Re-tests every point that is not a hull vertex against all live faces
    /// and queues the faces that picked up strays. Returns the stray count.
    fn sweep(&mut self) -> usize {
        let alive: Vec<FaceId> = (0..self.faces.len())
            .filter(|&f| self.faces[f].alive)
            .collect();
        let mut on_hull = vec![false; self.points.len()];
        for &f in &alive {
            for v in self.faces[f].vertices {
                on_hull[v] = true;
            }
        }

        let strays: Vec<usize> = (0..self.points.len())
            .filter(|&p| !on_hull[p] && !self.rejected.contains(&p))
            .collect();
        let before = self.outside_count(&alive);
        self.assign(&strays, &alive);
        let found = self.outside_count(&alive) - before;

        if found > 0 {
            tracing::debug!(found, "sweep found points outside the hull");
            self.pending
                .extend(alive.into_iter().filter(|&f| !self.faces[f].outside.is_empty()));
        }
        found
    }

    fn outside_count(&self, faces: &[FaceId]) -> usize {
        faces.iter().map(|&f| self.faces[f].outside.len()).sum()
    }

    /// Farthest outside point of a face; the lowest index wins exact ties.
    fn farthest_outside(&self, fid: FaceId) -> usize {
        let face = &self.faces[fid];
        let mut best = face.outside[0];
        let mut best_dist = face.distance(self.points[best]);
        for &p in &face.outside[1..] {
            let d = face.distance(self.points[p]);
            if d > best_dist {
                best = p;
                best_dist = d;
            }
        }
        best
    }

    fn add_point(&mut self, fid: FaceId) {
        let eye = self.farthest_outside(fid);
        let eye_point = self.points[eye];

        let visible = self.visible_region(fid, eye_point);
        let horizon = self.horizon(&visible);
        if !is_simple_loop(&horizon) {
            tracing::warn!(eye, "horizon is not a simple loop; leaving point out");
            self.faces[fid].outside.retain(|&p| p != eye);
            self.rejected.insert(eye);
            self.pending.push_back(fid);
            return;
        }

        let mut orphans = Vec::new();
        for &v in &visible {
            orphans.extend(self.remove_face(v));
        }
        orphans.retain(|&p| p != eye);
        orphans.sort_unstable();

        let cone: Vec<FaceId> = horizon
            .into_iter()
            .map(|(a, b)| self.add_face([a, b, eye]))
            .collect();

        self.assign(&orphans, &cone);
        for id in cone {
            if !self.faces[id].outside.is_empty() {
                self.pending.push_back(id);
            }
        }
        self.steps += 1;
    }

    /// Edges of `region` whose neighbour lies outside it, in region winding.
    fn horizon(&self, region: &[FaceId]) -> Vec<(usize, usize)> {
        let inside: HashSet<FaceId> = region.iter().copied().collect();
        let mut horizon = Vec::new();
        for &f in region {
            for edge in self.faces[f].edges() {
                match self.neighbor(edge) {
                    Some(n) if inside.contains(&n) => {}
                    _ => horizon.push(edge),
                }
            }
        }
        horizon
    }

    /// Faces connected to `start` that `eye` lies strictly in front of.
    fn visible_region(&self, start: FaceId, eye: DVec3) -> Vec<FaceId> {
        let mut region = vec![start];
        let mut marked: HashSet<FaceId> = HashSet::new();
        marked.insert(start);
        let mut stack = vec![start];

        while let Some(f) = stack.pop() {
            for edge in self.faces[f].edges() {
                let Some(n) = self.neighbor(edge) else {
                    continue;
                };
                if !marked.contains(&n) && self.sees(n, eye) {
                    marked.insert(n);
                    region.push(n);
                    stack.push(n);
                }
            }
        }

        region
    }
}

/// A horizon is usable when it closes into one loop with no pinched vertex.
fn is_simple_loop(horizon: &[(usize, usize)]) -> bool {
    if horizon.len() < 3 {
        return false;
    }
    let mut next: HashMap<usize, usize> = HashMap::with_capacity(horizon.len());
    for &(a, b) in horizon {
        if next.insert(a, b).is_some() {
            return false;
        }
    }

    let start = horizon[0].0;
    let mut at = start;
    for _ in 0..horizon.len() {
        match next.get(&at) {
            Some(&b) => at = b,
            None => return false,
        }
    }
    at == start
        && std::iter::successors(Some(start), |v| next.get(v).copied().filter(|&n| n != start))
            .count()
            == horizon.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_use_counts(faces: &[[usize; 3]]) -> HashMap<(usize, usize), usize> {
        let mut counts = HashMap::new();
        for f in faces {
            for (a, b) in [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])] {
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_seed_tetrahedron_faces_point_outward() {
        let points = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
        let faces = build(&points, [0, 1, 2, 3], 1e-12);
        assert_eq!(faces.len(), 4);

        let centroid = DVec3::splat(0.25);
        for f in &faces {
            let face = Face::new(*f, &points);
            assert!(face.distance(centroid) < 0.0, "face {:?} points inward", f);
        }
        assert!(edge_use_counts(&faces).values().all(|&c| c == 2));
    }

    #[test]
    fn test_is_simple_loop() {
        assert!(is_simple_loop(&[(0, 1), (1, 2), (2, 0)]));
        assert!(!is_simple_loop(&[(0, 1), (1, 2)]));
        // Two triangles sharing vertex 0
        assert!(!is_simple_loop(&[(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)]));
        // Two disjoint loops
        assert!(!is_simple_loop(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]));
    }

    #[test]
    fn test_octahedron_is_closed() {
        let points = [
            DVec3::X,
            DVec3::NEG_X,
            DVec3::Y,
            DVec3::NEG_Y,
            DVec3::Z,
            DVec3::NEG_Z,
            DVec3::ZERO,
        ];
        let faces = build(&points, [0, 1, 2, 4], 1e-12);
        assert_eq!(faces.len(), 8);
        assert!(faces.iter().all(|f| !f.contains(&6)));
        assert!(edge_use_counts(&faces).values().all(|&c| c == 2));
    }
}
