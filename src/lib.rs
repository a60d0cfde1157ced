//! # Vertsnap
//!
//! Snap mesh vertices onto the closest vertex of a reference surface.
//!
//! For every vertex to snap, the face of the reference closest to the vertex
//! is looked up, and the vertex moves onto the nearest corner of that face if
//! it lies within a tolerance. Only the corners of the nearest face are
//! considered, so the search stays local to where the vertex actually sits.
//!
//! ## Features
//!
//! - **Half-edge data structure**: polygon meshes with type-safe indices
//! - **Host abstraction**: the snapper talks to its application through
//!   [`host::MeshHost`], so it can drive an in-memory [`scene::Scene`] or a
//!   modeling package
//! - **Parallel queries**: nearest-face search runs on rayon
//! - **Progress and cancellation**: reported per vertex
//! - **Multiple file formats**: OBJ, PLY, STL
//!
//! ## Quick Start
//!
//! ```no_run
//! use vertsnap::prelude::*;
//! use vertsnap::algo::snap::{snap_to_reference, SnapOptions};
//!
//! let mut scene = Scene::new();
//! scene.add_object("reference", vertsnap::io::load("body.obj").unwrap());
//! let shape = scene.add_object("source", vertsnap::io::load("garment.obj").unwrap());
//!
//! let vertices = scene.vertices_of("source").unwrap();
//! let options = SnapOptions::default().with_tolerance(0.5);
//! let report = snap_to_reference(&mut scene, "reference", &vertices, &options, &Progress::none()).unwrap();
//! println!("Moved {} vertices", report.moved);
//!
//! vertsnap::io::save(scene.mesh(shape).unwrap(), "snapped.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use vertsnap::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(2.0, 0.5, 0.0),
//! ];
//! let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_faces(), 2);
//! assert_eq!(mesh.face_vertex_count(FaceId::new(0)), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod host;
pub mod io;
pub mod math;
pub mod mesh;
pub mod scene;

/// Prelude module for convenient imports.
///
/// ```
/// use vertsnap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::progress::{CancelToken, Progress, ProgressChannel};
    pub use crate::error::{Result, SnapError};
    pub use crate::host::MeshHost;
    pub use crate::mesh::{
        build_from_polygons, build_from_triangles, build_quad_grid, to_face_vertex, Face, FaceId,
        HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexFace, VertexId,
    };
    pub use crate::scene::{Scene, SceneVertex, ShapeId};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
