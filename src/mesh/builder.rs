//! Mesh construction utilities.
//!
//! Builds half-edge meshes from face-vertex lists as found in mesh files.
//! Polygon faces of any arity are supported; triangle and quad helpers are
//! thin wrappers around [`build_from_polygons`].

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{Result, SnapError};

/// Build a half-edge mesh from vertices and polygon faces.
///
/// Each face lists its vertex indices in winding order and must have at least
/// three distinct vertices.
///
/// # Example
/// ```
/// use vertsnap::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.5, 2.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// ```
pub fn build_from_polygons<I, F>(vertices: &[Point3<f64>], faces: &[F]) -> Result<HalfEdgeMesh<I>>
where
    I: MeshIndex,
    F: AsRef<[usize]>,
{
    if faces.is_empty() {
        return Err(SnapError::EmptyMesh);
    }

    let mut num_corners = 0;
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(SnapError::FaceTooSmall {
                face: fi,
                count: face.len(),
            });
        }
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(SnapError::InvalidVertexIndex { face: fi, vertex: vi });
        }
        let mut sorted = face.to_vec();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(SnapError::DegenerateFace { face: fi });
        }
        num_corners += face.len();
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), num_corners, faces.len());

    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    // Directed edge (from, to) -> interior half-edge
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(num_corners);

    for face in faces {
        let face = face.as_ref();
        let n = face.len();
        let first = mesh.num_halfedges();
        let face_id = FaceId::<I>::new(mesh.num_faces());
        mesh.faces.push(Face::new(HalfEdgeId::new(first)));

        for (k, &vi) in face.iter().enumerate() {
            let he_id = HalfEdgeId::<I>::new(first + k);
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[vi],
                twin: HalfEdgeId::invalid(),
                next: HalfEdgeId::new(first + (k + 1) % n),
                prev: HalfEdgeId::new(first + (k + n - 1) % n),
                face: face_id,
            });
            mesh.vertex_mut(vertex_ids[vi]).halfedge = he_id;

            let to = face[(k + 1) % n];
            if edge_map.insert((vi, to), he_id).is_some() {
                return Err(SnapError::NonManifoldEdge { v0: vi, v1: to });
            }
        }
    }

    // Link twins, creating boundary half-edges where no opposite face exists.
    // Sorted so half-edge numbering does not depend on hash order.
    let mut directed: Vec<((usize, usize), HalfEdgeId<I>)> =
        edge_map.iter().map(|(&k, &v)| (k, v)).collect();
    directed.sort_unstable_by_key(|&(k, _)| k);

    for ((from, to), he) in directed {
        if let Some(&twin) = edge_map.get(&(to, from)) {
            mesh.halfedge_mut(he).twin = twin;
        } else {
            let boundary = HalfEdgeId::<I>::new(mesh.num_halfedges());
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[to],
                twin: he,
                ..HalfEdge::new()
            });
            mesh.halfedge_mut(he).twin = boundary;
        }
    }

    link_boundary_loops(&mut mesh);
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use vertsnap::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a half-edge mesh from vertices and quad faces (counter-clockwise).
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a `cols` x `rows` grid of unit quads in the z = 0 plane.
///
/// Vertices sit on the integer lattice `0..=cols` x `0..=rows`, numbered row by
/// row starting at the origin.
pub fn build_quad_grid<I: MeshIndex>(cols: usize, rows: usize) -> Result<HalfEdgeMesh<I>> {
    let mut vertices = Vec::with_capacity((cols + 1) * (rows + 1));
    for j in 0..=rows {
        for i in 0..=cols {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(cols * rows);
    for j in 0..rows {
        for i in 0..cols {
            let v00 = j * (cols + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + cols + 1;
            let v11 = v01 + 1;
            faces.push([v00, v10, v11, v01]);
        }
    }

    build_from_quads(&vertices, &faces)
}

/// Link boundary half-edges into loops.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    let outgoing: HashMap<VertexId<I>, HalfEdgeId<I>> = boundary_hes
        .iter()
        .map(|&he| (mesh.origin(he), he))
        .collect();

    for &he in &boundary_hes {
        // The next boundary half-edge starts where this one ends
        let dest = mesh.dest(he);
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }
}

/// Point boundary vertices at an outgoing boundary half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    for he in boundary_hes {
        let origin = mesh.origin(he);
        mesh.vertex_mut(origin).halfedge = he;
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns `(vertices, faces)`, each face in winding order.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();

    (vertices, faces)
}

/// Fan-triangulate every face into `[v0, vi, vi+1]` triangles.
pub fn to_triangles<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<[usize; 3]> {
    let count = mesh.face_ids().map(|f| mesh.face_vertex_count(f) - 2).sum();
    let mut triangles = Vec::with_capacity(count);
    for f in mesh.face_ids() {
        let verts: Vec<usize> = mesh.face_vertices(f).map(|v| v.index()).collect();
        for w in verts.windows(2).skip(1) {
            triangles.push([verts[0], w[0], w[1]]);
        }
    }
    triangles
}
