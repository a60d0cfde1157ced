//! Host capabilities consumed by the snapper.
//!
//! The snapping algorithm never touches mesh storage directly. Everything it
//! needs from the surrounding application (resolving shapes, the nearest-face
//! query, face topology, reading and writing vertex positions) goes through
//! [`MeshHost`]. The crate's own [`Scene`](crate::scene::Scene) implements it
//! for in-memory meshes; a plugin for a modeling package would implement it on
//! top of that package's API.

use log::debug;
use nalgebra::Point3;

use crate::error::Result;

/// Name of the capability providing nearest-point-on-mesh queries.
pub const NEAREST_POINT_CAPABILITY: &str = "nearestPointOnMesh";

/// Operations a host application provides to the snapper.
pub trait MeshHost {
    /// Identifies a shape (the mesh data under an object).
    type Shape: Clone + std::fmt::Debug;
    /// Identifies one mesh vertex.
    type Vertex: Clone + std::fmt::Debug;
    /// Identifies one vertex as used by one face.
    type VertexFace: Clone + std::fmt::Debug;
    /// Handle of an auxiliary nearest-point query.
    type Query;

    /// Shapes under a named object. Empty if the object does not exist or has
    /// no shapes.
    fn shapes_of(&self, object: &str) -> Vec<Self::Shape>;

    /// Make sure a named capability is active. Calling it again is a no-op.
    fn ensure_capability_loaded(&mut self, name: &str) -> Result<()>;

    /// Create a nearest-point query bound to `surface`.
    fn create_nearest_point_query(&mut self, surface: &Self::Shape) -> Result<Self::Query>;

    /// Release a query created by [`create_nearest_point_query`](Self::create_nearest_point_query).
    fn destroy_query(&mut self, query: Self::Query);

    /// Index of the face of the query's surface closest to `point`, or `None`
    /// when the surface has no faces.
    fn query_nearest_face(&self, query: &Self::Query, point: &Point3<f64>) -> Result<Option<usize>>;

    /// Vertex-face elements of one face of `surface`.
    fn faces_to_vertex_faces(&self, surface: &Self::Shape, face: usize) -> Result<Vec<Self::VertexFace>>;

    /// The vertex underlying a vertex-face element.
    fn vertex_face_to_vertex(&self, element: &Self::VertexFace) -> Self::Vertex;

    /// World-space position of a vertex.
    fn position_of(&self, vertex: &Self::Vertex) -> Result<Point3<f64>>;

    /// Move a vertex to a world-space position.
    fn move_vertex(&mut self, vertex: &Self::Vertex, position: Point3<f64>) -> Result<()>;
}

/// Exclusive use of one nearest-point query for the duration of an operation.
///
/// Opening the scope loads the query capability and creates the query;
/// dropping it destroys the query, on every exit path. The scope holds the
/// host mutably and lends it out through [`host`](Self::host) and
/// [`host_mut`](Self::host_mut).
pub struct QueryScope<'h, H: MeshHost> {
    host: &'h mut H,
    surface: H::Shape,
    query: Option<H::Query>,
}

impl<'h, H: MeshHost> QueryScope<'h, H> {
    /// Create a nearest-point query on `surface`.
    pub fn open(host: &'h mut H, surface: &H::Shape) -> Result<Self> {
        host.ensure_capability_loaded(NEAREST_POINT_CAPABILITY)?;
        let query = host.create_nearest_point_query(surface)?;
        debug!("opened nearest point query on {:?}", surface);

        Ok(Self {
            host,
            surface: surface.clone(),
            query: Some(query),
        })
    }

    /// The surface this query searches.
    pub fn surface(&self) -> &H::Shape {
        &self.surface
    }

    /// Index of the face closest to `point`.
    pub fn nearest_face(&self, point: &Point3<f64>) -> Result<Option<usize>> {
        match &self.query {
            Some(query) => self.host.query_nearest_face(query, point),
            None => Ok(None),
        }
    }

    /// Shared access to the host.
    pub fn host(&self) -> &H {
        self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: MeshHost> Drop for QueryScope<'_, H> {
    fn drop(&mut self) {
        if let Some(query) = self.query.take() {
            debug!("releasing nearest point query on {:?}", self.surface);
            self.host.destroy_query(query);
        }
    }
}
