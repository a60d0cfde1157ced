//! In-memory scene implementing the host capabilities.
//!
//! A [`Scene`] holds named objects, each owning one or more shapes backed by a
//! [`HalfEdgeMesh`]. It implements [`MeshHost`], so the snapper can run on
//! meshes loaded from disk or built in code without any modeling application.
//!
//! # Example
//!
//! ```
//! use vertsnap::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut scene = Scene::new();
//! let grid: HalfEdgeMesh = build_quad_grid(2, 2).unwrap();
//! scene.add_object("ground", grid);
//!
//! let shapes = scene.shapes_of("ground");
//! assert_eq!(shapes.len(), 1);
//! assert_eq!(scene.shape_name(shapes[0]), Some("groundShape"));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, info};
use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{Result, SnapError};
use crate::host::{MeshHost, NEAREST_POINT_CAPABILITY};
use crate::math::magnitude;
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex, VertexFace, VertexId};

/// Identifies a shape in a [`Scene`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({})", self.0)
    }
}

/// A vertex of a shape in a [`Scene`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct SceneVertex {
    /// The shape owning the vertex.
    pub shape: ShapeId,
    /// The vertex within the shape's mesh.
    pub vertex: VertexId,
}

impl fmt::Debug for SceneVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}.vtx[{}]", self.shape, self.vertex.index())
    }
}

/// A face corner of a shape in a [`Scene`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct SceneVertexFace {
    /// The shape owning the corner.
    pub shape: ShapeId,
    /// The corner within the shape's mesh.
    pub corner: VertexFace,
}

impl fmt::Debug for SceneVertexFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}.vtxFace[{}][{}]",
            self.shape,
            self.corner.vertex.index(),
            self.corner.face.index()
        )
    }
}

/// Handle of a nearest-point query created by a [`Scene`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct QueryId(usize);

/// A nearest-face query bound to one shape.
#[derive(Debug, Clone, Copy)]
struct NearestFaceQuery {
    shape: ShapeId,
    parallel: bool,
}

#[derive(Debug, Clone)]
struct Shape {
    name: String,
    mesh: HalfEdgeMesh,
}

/// Named objects and their meshes.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: HashMap<String, Vec<ShapeId>>,
    shapes: Vec<Shape>,
    available: HashSet<String>,
    loaded: HashSet<String>,
    queries: HashMap<QueryId, NearestFaceQuery>,
    next_query: usize,
    parallel: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene. The nearest-point capability is available but
    /// not yet loaded.
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            shapes: Vec::new(),
            available: HashSet::from([NEAREST_POINT_CAPABILITY.to_string()]),
            loaded: HashSet::new(),
            queries: HashMap::new(),
            next_query: 0,
            parallel: true,
        }
    }

    /// Set whether nearest-face queries search faces in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Add a mesh as a new shape under `object`, creating the object if needed.
    pub fn add_object(&mut self, object: &str, mesh: HalfEdgeMesh) -> ShapeId {
        let shapes = self.objects.entry(object.to_string()).or_default();
        let name = if shapes.is_empty() {
            format!("{}Shape", object)
        } else {
            format!("{}Shape{}", object, shapes.len())
        };

        let id = ShapeId(self.shapes.len());
        self.shapes.push(Shape { name, mesh });
        shapes.push(id);
        id
    }

    /// Add an object without any shape (an empty transform).
    pub fn add_empty_object(&mut self, object: &str) {
        self.objects.entry(object.to_string()).or_default();
    }

    /// Name of a shape.
    pub fn shape_name(&self, shape: ShapeId) -> Option<&str> {
        self.shapes.get(shape.0).map(|s| s.name.as_str())
    }

    /// The mesh of a shape.
    pub fn mesh(&self, shape: ShapeId) -> Option<&HalfEdgeMesh> {
        self.shapes.get(shape.0).map(|s| &s.mesh)
    }

    /// The mesh of a shape, mutably.
    pub fn mesh_mut(&mut self, shape: ShapeId) -> Option<&mut HalfEdgeMesh> {
        self.shapes.get_mut(shape.0).map(|s| &mut s.mesh)
    }

    /// Every vertex of the first shape of `object`, in index order.
    pub fn vertices_of(&self, object: &str) -> Result<Vec<SceneVertex>> {
        let shape = self.first_shape(object)?;
        let mesh = self.shape(shape)?;
        Ok(mesh
            .vertex_ids()
            .map(|vertex| SceneVertex { shape, vertex })
            .collect())
    }

    /// Selected vertices of the first shape of `object`, in the given order.
    pub fn select_vertices(&self, object: &str, indices: &[usize]) -> Result<Vec<SceneVertex>> {
        let shape = self.first_shape(object)?;
        let mesh = self.shape(shape)?;
        indices
            .iter()
            .map(|&i| {
                let vertex = VertexId::new(i);
                if mesh.contains_vertex(vertex) {
                    Ok(SceneVertex { shape, vertex })
                } else {
                    Err(self.unknown_vertex(shape, i))
                }
            })
            .collect()
    }

    /// Mark a capability as available (or not) for loading.
    pub fn set_capability_available(&mut self, name: &str, available: bool) {
        if available {
            self.available.insert(name.to_string());
        } else {
            self.available.remove(name);
        }
    }

    /// Check whether a capability has been loaded.
    pub fn is_capability_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Number of nearest-point queries currently alive.
    pub fn live_queries(&self) -> usize {
        self.queries.len()
    }

    fn first_shape(&self, object: &str) -> Result<ShapeId> {
        self.objects
            .get(object)
            .and_then(|shapes| shapes.first().copied())
            .ok_or_else(|| SnapError::UnknownObject(object.to_string()))
    }

    fn shape(&self, shape: ShapeId) -> Result<&HalfEdgeMesh> {
        self.mesh(shape)
            .ok_or_else(|| SnapError::UnknownShape(format!("{:?}", shape)))
    }

    fn unknown_vertex(&self, shape: ShapeId, index: usize) -> SnapError {
        SnapError::UnknownVertex {
            shape: self
                .shape_name(shape)
                .map_or_else(|| format!("{:?}", shape), str::to_string),
            index,
        }
    }
}

impl MeshHost for Scene {
    type Shape = ShapeId;
    type Vertex = SceneVertex;
    type VertexFace = SceneVertexFace;
    type Query = QueryId;

    fn shapes_of(&self, object: &str) -> Vec<ShapeId> {
        self.objects.get(object).cloned().unwrap_or_default()
    }

    fn ensure_capability_loaded(&mut self, name: &str) -> Result<()> {
        if self.loaded.contains(name) {
            return Ok(());
        }
        if !self.available.contains(name) {
            return Err(SnapError::CapabilityUnavailable(name.to_string()));
        }
        self.loaded.insert(name.to_string());
        info!("Loaded capability '{}'", name);
        Ok(())
    }

    fn create_nearest_point_query(&mut self, surface: &ShapeId) -> Result<QueryId> {
        if !self.loaded.contains(NEAREST_POINT_CAPABILITY) {
            return Err(SnapError::CapabilityUnavailable(
                NEAREST_POINT_CAPABILITY.to_string(),
            ));
        }
        self.shape(*surface)?;

        let id = QueryId(self.next_query);
        self.next_query += 1;
        self.queries.insert(
            id,
            NearestFaceQuery {
                shape: *surface,
                parallel: self.parallel,
            },
        );
        Ok(id)
    }

    fn destroy_query(&mut self, query: QueryId) {
        if self.queries.remove(&query).is_none() {
            debug!("query {:?} was already destroyed", query);
        }
    }

    fn query_nearest_face(&self, query: &QueryId, point: &Point3<f64>) -> Result<Option<usize>> {
        let q = self
            .queries
            .get(query)
            .ok_or(SnapError::UnknownQuery(query.0))?;
        let mesh = self.shape(q.shape)?;
        Ok(nearest_face(mesh, point, q.parallel).map(FaceId::index))
    }

    fn faces_to_vertex_faces(&self, surface: &ShapeId, face: usize) -> Result<Vec<SceneVertexFace>> {
        let mesh = self.shape(*surface)?;
        let face = FaceId::new(face);
        if !mesh.contains_face(face) {
            debug!("{:?} has no face {}", surface, face.index());
            return Ok(Vec::new());
        }
        Ok(mesh
            .face_vertex_faces(face)
            .map(|corner| SceneVertexFace {
                shape: *surface,
                corner,
            })
            .collect())
    }

    fn vertex_face_to_vertex(&self, element: &SceneVertexFace) -> SceneVertex {
        SceneVertex {
            shape: element.shape,
            vertex: element.corner.vertex,
        }
    }

    fn position_of(&self, vertex: &SceneVertex) -> Result<Point3<f64>> {
        let mesh = self.shape(vertex.shape)?;
        if !mesh.contains_vertex(vertex.vertex) {
            return Err(self.unknown_vertex(vertex.shape, vertex.vertex.index()));
        }
        Ok(*mesh.position(vertex.vertex))
    }

    fn move_vertex(&mut self, vertex: &SceneVertex, position: Point3<f64>) -> Result<()> {
        if !self.shape(vertex.shape)?.contains_vertex(vertex.vertex) {
            return Err(self.unknown_vertex(vertex.shape, vertex.vertex.index()));
        }
        if let Some(mesh) = self.mesh_mut(vertex.shape) {
            mesh.set_position(vertex.vertex, position);
        }
        Ok(())
    }
}

/// Face of `mesh` closest to `point`.
///
/// Every face is measured by its closest point to `point`. Equal distances
/// resolve to the lower face index, so parallel and sequential searches agree.
/// Returns `None` for a mesh without faces.
pub fn nearest_face<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    point: &Point3<f64>,
    parallel: bool,
) -> Option<FaceId<I>> {
    let measure = |i: usize| {
        let f = FaceId::new(i);
        (magnitude(point, &mesh.closest_point_on_face(f, point)), f)
    };

    let best = if parallel {
        (0..mesh.num_faces())
            .into_par_iter()
            .map(measure)
            .reduce_with(closer)
    } else {
        (0..mesh.num_faces()).map(measure).reduce(closer)
    };

    best.map(|(_, f)| f)
}

#[inline]
fn closer<I: MeshIndex>(a: (f64, FaceId<I>), b: (f64, FaceId<I>)) -> (f64, FaceId<I>) {
    if b.0 < a.0 || (b.0 == a.0 && b.1 < a.1) {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::QueryScope;
    use crate::mesh::{build_from_triangles, build_quad_grid};

    fn grid_scene() -> (Scene, ShapeId) {
        let mut scene = Scene::new();
        let shape = scene.add_object("reference", build_quad_grid(2, 2).unwrap());
        (scene, shape)
    }

    #[test]
    fn test_shapes_of() {
        let (mut scene, shape) = grid_scene();
        assert_eq!(scene.shapes_of("reference"), vec![shape]);
        assert!(scene.shapes_of("missing").is_empty());

        scene.add_empty_object("locator");
        assert!(scene.shapes_of("locator").is_empty());

        let second = scene.add_object("reference", build_quad_grid(1, 1).unwrap());
        assert_eq!(scene.shape_name(second), Some("referenceShape1"));
        assert_eq!(scene.shapes_of("reference"), vec![shape, second]);
    }

    #[test]
    fn test_capability_loading_is_idempotent() {
        let (mut scene, _) = grid_scene();
        assert!(!scene.is_capability_loaded(NEAREST_POINT_CAPABILITY));

        scene.ensure_capability_loaded(NEAREST_POINT_CAPABILITY).unwrap();
        scene.ensure_capability_loaded(NEAREST_POINT_CAPABILITY).unwrap();
        assert!(scene.is_capability_loaded(NEAREST_POINT_CAPABILITY));

        let err = scene.ensure_capability_loaded("fancyPlugin").unwrap_err();
        assert!(matches!(err, SnapError::CapabilityUnavailable(_)));
    }

    #[test]
    fn test_query_requires_capability() {
        let (mut scene, shape) = grid_scene();
        let err = scene.create_nearest_point_query(&shape).unwrap_err();
        assert!(matches!(err, SnapError::CapabilityUnavailable(_)));
        assert_eq!(scene.live_queries(), 0);
    }

    #[test]
    fn test_query_lifecycle() {
        let (mut scene, shape) = grid_scene();
        scene.ensure_capability_loaded(NEAREST_POINT_CAPABILITY).unwrap();

        let query = scene.create_nearest_point_query(&shape).unwrap();
        assert_eq!(scene.live_queries(), 1);

        let face = scene
            .query_nearest_face(&query, &Point3::new(1.7, 0.2, 3.0))
            .unwrap();
        assert_eq!(face, Some(1));

        scene.destroy_query(query);
        assert_eq!(scene.live_queries(), 0);
        assert!(matches!(
            scene.query_nearest_face(&query, &Point3::origin()),
            Err(SnapError::UnknownQuery(_))
        ));
    }

    #[test]
    fn test_query_scope_releases_on_drop() {
        let (mut scene, shape) = grid_scene();
        {
            let scope = QueryScope::open(&mut scene, &shape).unwrap();
            assert_eq!(scope.host().live_queries(), 1);
            assert_eq!(
                scope.nearest_face(&Point3::new(0.2, 1.8, 0.0)).unwrap(),
                Some(2)
            );
        }
        assert_eq!(scene.live_queries(), 0);
        assert!(scene.is_capability_loaded(NEAREST_POINT_CAPABILITY));
    }

    #[test]
    fn test_query_scope_fails_without_capability() {
        let (mut scene, shape) = grid_scene();
        scene.set_capability_available(NEAREST_POINT_CAPABILITY, false);

        assert!(QueryScope::open(&mut scene, &shape).is_err());
        assert_eq!(scene.live_queries(), 0);
    }

    #[test]
    fn test_vertex_faces_of_face() {
        let (scene, shape) = grid_scene();

        let corners = scene.faces_to_vertex_faces(&shape, 3).unwrap();
        let positions: Vec<Point3<f64>> = corners
            .iter()
            .map(|c| scene.position_of(&scene.vertex_face_to_vertex(c)).unwrap())
            .collect();
        assert_eq!(
            positions,
            vec![
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
            ]
        );

        // Out-of-range faces have no corners
        assert!(scene.faces_to_vertex_faces(&shape, 99).unwrap().is_empty());
    }

    #[test]
    fn test_move_vertex() {
        let (mut scene, shape) = grid_scene();
        let v = SceneVertex {
            shape,
            vertex: VertexId::new(4),
        };

        scene.move_vertex(&v, Point3::new(1.0, 1.0, 0.5)).unwrap();
        assert_eq!(scene.position_of(&v).unwrap(), Point3::new(1.0, 1.0, 0.5));

        let bad = SceneVertex {
            shape,
            vertex: VertexId::new(100),
        };
        assert!(matches!(
            scene.move_vertex(&bad, Point3::origin()),
            Err(SnapError::UnknownVertex { index: 100, .. })
        ));
    }

    #[test]
    fn test_select_vertices() {
        let (scene, shape) = grid_scene();

        let all = scene.vertices_of("reference").unwrap();
        assert_eq!(all.len(), 9);
        assert_eq!(format!("{:?}", all[3]), "Shape(0).vtx[3]");

        let picked = scene.select_vertices("reference", &[8, 0]).unwrap();
        assert_eq!(picked[0].vertex.index(), 8);
        assert_eq!(picked[1].shape, shape);

        assert!(scene.select_vertices("reference", &[9]).is_err());
        assert!(matches!(
            scene.vertices_of("nothing"),
            Err(SnapError::UnknownObject(_))
        ));
    }

    #[test]
    fn test_nearest_face_parallel_matches_sequential() {
        let mesh: HalfEdgeMesh = build_quad_grid(8, 5).unwrap();

        let probes = [
            Point3::new(0.1, 0.1, 1.0),
            Point3::new(7.5, 4.5, -2.0),
            Point3::new(3.3, 2.9, 0.0),
            Point3::new(-4.0, 10.0, 3.0),
            Point3::new(4.0, 2.0, 1.0), // lattice point shared by four faces
        ];
        for p in &probes {
            assert_eq!(nearest_face(&mesh, p, true), nearest_face(&mesh, p, false));
        }

        // Ties resolve to the lowest face index
        let f = nearest_face(&mesh, &Point3::new(4.0, 2.0, 1.0), false).unwrap();
        assert_eq!(f.index(), 11);
    }

    #[test]
    fn test_nearest_face_matches_cell_lookup() {
        let (cols, rows) = (6, 4);
        let mesh: HalfEdgeMesh = build_quad_grid(cols, rows).unwrap();

        for j in 0..rows {
            for i in 0..cols {
                let p = Point3::new(i as f64 + 0.37, j as f64 + 0.61, 0.8);
                let f = nearest_face(&mesh, &p, true).unwrap();
                assert_eq!(f.index(), j * cols + i, "probe {:?}", p);
            }
        }
    }

    #[test]
    fn test_nearest_face_on_triangles() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2], [1, 3, 2]]).unwrap();

        let f = nearest_face(&mesh, &Point3::new(0.9, 0.9, 0.2), true).unwrap();
        assert_eq!(f.index(), 1);

        let empty = HalfEdgeMesh::<u32>::new();
        assert!(nearest_face(&empty, &Point3::origin(), true).is_none());
    }
}
