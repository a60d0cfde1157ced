//! Core mesh data structures.
//!
//! This module provides the half-edge polygon mesh that backs the in-memory
//! scene: reference surfaces are queried through it and source vertices are
//! moved in it.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! A [`VertexFace`] names one corner of a face (a vertex as used by that face).
//!
//! # Construction
//!
//! ```
//! use vertsnap::mesh::{build_quad_grid, HalfEdgeMesh, FaceId};
//!
//! let mesh: HalfEdgeMesh = build_quad_grid(2, 2).unwrap();
//! assert_eq!(mesh.num_faces(), 4);
//! assert_eq!(mesh.face_vertex_faces(FaceId::new(0)).count(), 4);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{
    build_from_polygons, build_from_quads, build_from_triangles, build_quad_grid, to_face_vertex,
    to_triangles,
};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexFace};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
