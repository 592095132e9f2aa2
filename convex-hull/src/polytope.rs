//! Hull result types

use glam::DVec3;

/// Dimension class of a computed hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HullKind {
    /// No finite input points
    Empty,
    /// All points coincide within tolerance
    Point,
    /// All points are collinear; vertices are the two extreme endpoints
    Segment,
    /// All points are coplanar; vertices trace the boundary in order
    Polygon,
    /// Full 3D hull with outward-oriented triangular faces
    Polyhedron,
}

/// Result of a convex hull computation.
///
/// Vertices are deduplicated. Faces index into [`HullPolytope::vertices`] and
/// wind counter-clockwise when seen from outside, so `(b - a) × (c - a)`
/// points away from the hull. Degenerate kinds carry no faces.
#[derive(Debug, Clone, PartialEq)]
pub struct HullPolytope {
    kind: HullKind,
    vertices: Vec<DVec3>,
    faces: Vec<[usize; 3]>,
    tolerance: f64,
}

impl HullPolytope {
    pub(crate) fn empty() -> Self {
        Self {
            kind: HullKind::Empty,
            vertices: Vec::new(),
            faces: Vec::new(),
            tolerance: 0.0,
        }
    }

    pub(crate) fn point(p: DVec3, tolerance: f64) -> Self {
        Self {
            kind: HullKind::Point,
            vertices: vec![p],
            faces: Vec::new(),
            tolerance,
        }
    }

    pub(crate) fn segment(a: DVec3, b: DVec3, tolerance: f64) -> Self {
        Self {
            kind: HullKind::Segment,
            vertices: vec![a, b],
            faces: Vec::new(),
            tolerance,
        }
    }

    pub(crate) fn polygon(boundary: Vec<DVec3>, tolerance: f64) -> Self {
        Self {
            kind: HullKind::Polygon,
            vertices: boundary,
            faces: Vec::new(),
            tolerance,
        }
    }

    /// Builds a polyhedron from faces indexing into `points`.
    ///
    /// Only referenced points survive, kept in ascending point index.
    pub(crate) fn polyhedron_from_indices(
        points: &[DVec3],
        faces: &[[usize; 3]],
        tolerance: f64,
    ) -> Self {
        let mut remap = vec![usize::MAX; points.len()];
        for face in faces {
            for &v in face {
                remap[v] = 0;
            }
        }

        let mut vertices = Vec::new();
        for (i, slot) in remap.iter_mut().enumerate() {
            if *slot == 0 {
                *slot = vertices.len();
                vertices.push(points[i]);
            }
        }

        let faces = faces
            .iter()
            .map(|f| [remap[f[0]], remap[f[1]], remap[f[2]]])
            .collect();

        Self {
            kind: HullKind::Polyhedron,
            vertices,
            faces,
            tolerance,
        }
    }

    pub fn kind(&self) -> HullKind {
        self.kind
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kind == HullKind::Empty
    }

    /// True for every kind except [`HullKind::Polyhedron`].
    pub fn is_degenerate(&self) -> bool {
        self.kind != HullKind::Polyhedron
    }

    /// Absolute tolerance used while building this hull.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Unit outward normal and plane offset of face `index`.
    ///
    /// A point `p` lies on the plane when `normal.dot(p) == offset`.
    pub fn face_plane(&self, index: usize) -> (DVec3, f64) {
        let [a, b, c] = self.faces[index].map(|i| self.vertices[i]);
        let normal = (b - a).cross(c - a).normalize_or_zero();
        (normal, normal.dot(a))
    }

    /// How far `p` lies outside the hull.
    ///
    /// For a polyhedron this is the largest signed plane distance, so values
    /// `<= 0` mean inside. Degenerate hulls report the Euclidean distance to
    /// their point, segment, or polygon. An empty hull reports infinity.
    pub fn distance_outside(&self, p: DVec3) -> f64 {
        match self.kind {
            HullKind::Empty => f64::INFINITY,
            HullKind::Point => p.distance(self.vertices[0]),
            HullKind::Segment => distance_to_segment(p, self.vertices[0], self.vertices[1]),
            HullKind::Polygon => self.distance_to_polygon(p),
            HullKind::Polyhedron => (0..self.faces.len())
                .map(|i| {
                    let (normal, offset) = self.face_plane(i);
                    normal.dot(p) - offset
                })
                .fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// True when `p` is inside or within [`HullPolytope::tolerance`] of the boundary.
    pub fn contains(&self, p: DVec3) -> bool {
        self.distance_outside(p) <= self.tolerance
    }

    fn distance_to_polygon(&self, p: DVec3) -> f64 {
        let n = self.vertices.len();
        // Newell's method gives a stable normal for any simple polygon.
        let normal = (0..n)
            .fold(DVec3::ZERO, |acc, i| {
                let (a, b) = (self.vertices[i], self.vertices[(i + 1) % n]);
                acc + DVec3::new(
                    (a.y - b.y) * (a.z + b.z),
                    (a.z - b.z) * (a.x + b.x),
                    (a.x - b.x) * (a.y + b.y),
                )
            })
            .normalize_or_zero();

        let height = normal.dot(p - self.vertices[0]);
        let inside = (0..n).all(|i| {
            let (a, b) = (self.vertices[i], self.vertices[(i + 1) % n]);
            (b - a).cross(normal).dot(p - a) <= 0.0
        });

        if inside {
            height.abs()
        } else {
            (0..n)
                .map(|i| distance_to_segment(p, self.vertices[i], self.vertices[(i + 1) % n]))
                .fold(f64::INFINITY, f64::min)
        }
    }
}

fn distance_to_segment(p: DVec3, a: DVec3, b: DVec3) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
