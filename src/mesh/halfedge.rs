//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for polygon meshes. Faces may have any number of vertices (three or more),
//! which keeps quads from modeling applications intact instead of forcing a
//! triangulation.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin**, **next**, **prev**, **origin vertex**,
//!   and **incident face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! An interior half-edge doubles as a *vertex-face* corner: the vertex it
//! leaves, as used by the face it borders. See [`VertexFace`].
//!
//! # Boundary Handling
//!
//! Boundary half-edges have an invalid face ID. Their twins are interior
//! half-edges, and boundary loops can be walked with `next`.

use std::fmt;

use nalgebra::Point3;

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::math::{closest_point_on_triangle, magnitude};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is a boundary half-edge.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new, unconnected vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Invalid on the boundary.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unconnected half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

/// One vertex as used by one face (a face corner).
///
/// A vertex shared by several faces has one vertex-face per incident face.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexFace<I: MeshIndex = u32> {
    /// The vertex at this corner.
    pub vertex: VertexId<I>,
    /// The face owning this corner.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> fmt::Debug for VertexFace<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VF({}, {})", self.vertex.index(), self.face.index())
    }
}

/// A half-edge mesh for polygon meshes.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_corners: usize, num_faces: usize) -> Self {
        // Every corner owns one interior half-edge; boundary half-edges are
        // extra, a quarter is a generous guess for open meshes.
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_corners + num_corners / 4),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges, boundary half-edges included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Check whether a vertex ID addresses a vertex of this mesh.
    #[inline]
    pub fn contains_vertex(&self, v: VertexId<I>) -> bool {
        v.is_valid() && v.index() < self.vertices.len()
    }

    /// Check whether a face ID addresses a face of this mesh.
    #[inline]
    pub fn contains_face(&self, f: FaceId<I>) -> bool {
        f.is_valid() && f.index() < self.faces.len()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over the vertices of a face, in winding order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Iterate over the vertex-face corners of a face, in winding order.
    pub fn face_vertex_faces(&self, f: FaceId<I>) -> impl Iterator<Item = VertexFace<I>> + '_ {
        self.face_halfedges(f).map(move |he| VertexFace {
            vertex: self.origin(he),
            face: f,
        })
    }

    /// Number of vertices around a face.
    pub fn face_vertex_count(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    /// Positions of the vertices of a face, in winding order.
    pub fn face_positions(&self, f: FaceId<I>) -> Vec<Point3<f64>> {
        self.face_vertices(f).map(|v| *self.position(v)).collect()
    }

    // ==================== Geometry ====================

    /// Closest point on a face to `point`.
    ///
    /// Non-triangular faces are fanned from their first vertex, which is exact
    /// for planar convex faces.
    pub fn closest_point_on_face(&self, f: FaceId<I>, point: &Point3<f64>) -> Point3<f64> {
        let positions = self.face_positions(f);
        let p0 = positions[0];

        let mut best = p0;
        let mut best_dist = f64::INFINITY;
        for w in positions.windows(2).skip(1) {
            let candidate = closest_point_on_triangle(point, &p0, &w[0], &w[1]);
            let dist = magnitude(point, &candidate);
            if dist < best_dist {
                best_dist = dist;
                best = candidate;
            }
        }
        best
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        let vertices_ok = self.vertex_ids().all(|v| {
            let he = self.vertex(v).halfedge;
            !he.is_valid() || self.origin(he) == v
        });

        let halfedges_ok = self.halfedge_ids().all(|id| {
            let he = self.halfedge(id);
            (!he.twin.is_valid() || self.twin(he.twin) == id)
                && (!he.next.is_valid() || self.prev(he.next) == id)
                && (!he.prev.is_valid() || self.next(he.prev) == id)
        });

        let faces_ok = self.face_ids().all(|f| {
            let he = self.face(f).halfedge;
            he.is_valid() && self.face_of(he) == f
        });

        vertices_ok && halfedges_ok && faces_ok
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_quads;

    fn unit_square() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));

        assert_eq!(mesh.num_vertices(), 2);
        assert_eq!(v0.index(), 0);
        assert_eq!(v1.index(), 1);
        assert!(!mesh.vertex(v0).halfedge.is_valid());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_face_vertex_faces_follow_winding() {
        let mesh = unit_square();
        let f = FaceId::new(0);

        let corners: Vec<_> = mesh.face_vertex_faces(f).collect();
        assert_eq!(corners.len(), 4);
        for (i, corner) in corners.iter().enumerate() {
            assert_eq!(corner.vertex.index(), i);
            assert_eq!(corner.face, f);
        }
        assert_eq!(format!("{:?}", corners[2]), "VF(2, 0)");
    }

    #[test]
    fn test_face_positions() {
        let mesh = unit_square();
        let f = FaceId::new(0);

        assert_eq!(mesh.face_vertex_count(f), 4);
        assert_eq!(
            mesh.face_positions(f),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_closest_point_on_face() {
        let mesh = unit_square();
        let f = FaceId::new(0);

        // Above the interior: projects straight down
        let p = mesh.closest_point_on_face(f, &Point3::new(0.3, 0.7, 2.0));
        assert!((p - Point3::new(0.3, 0.7, 0.0)).norm() < 1e-10);

        // Outside a corner: clamps to the corner
        let p = mesh.closest_point_on_face(f, &Point3::new(2.0, 2.0, 1.0));
        assert!((p - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_shared_edge_is_twinned() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh =
            build_from_quads(&vertices, &[[0, 1, 2, 3], [1, 4, 5, 2]]).unwrap();

        // 1 -> 2 in the first quad, 2 -> 1 in the second
        let he = mesh
            .face_halfedges(FaceId::new(0))
            .find(|&he| mesh.origin(he) == VertexId::new(1))
            .unwrap();
        let twin = mesh.twin(he);
        assert_eq!(mesh.dest(he).index(), 2);
        assert_eq!(mesh.face_of(twin), FaceId::new(1));
        assert_eq!(mesh.origin(twin).index(), 2);
        assert!(!mesh.is_boundary_halfedge(he));

        // 0 -> 1 has no neighbour
        let outer = mesh.twin(mesh.face(FaceId::new(0)).halfedge);
        assert!(mesh.is_boundary_halfedge(outer));
        assert!(mesh.is_valid());
    }
}
