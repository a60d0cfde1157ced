//! Closest-vertex snapping.
//!
//! Moves vertices onto the nearest vertex of a reference surface. For each
//! input vertex the nearest face of the reference is looked up, and only the
//! vertices of that face are considered as snap targets. The closest of them
//! wins, provided it lies within the tolerance.
//!
//! # Algorithm
//!
//! For each vertex `v`, in input order:
//! 1. Stop if the progress channel reports cancellation
//! 2. Read the world position `p` of `v` and find the nearest face to `p`
//! 3. Walk the face's vertex-face elements; for each candidate `c`:
//!    - if `|p - c|` beats the running minimum, remember `c`
//!    - then, if the running minimum is under tolerance, move `v` to the
//!      remembered candidate
//! 4. Report one step of progress
//!
//! The move happens inside the candidate walk rather than once at the end.
//! Because the running minimum never increases, the final position is the
//! same as a single deferred move.
//!
//! # Example
//!
//! ```
//! use vertsnap::prelude::*;
//! use vertsnap::algo::snap::{snap_to_reference, SnapOptions};
//! use nalgebra::Point3;
//!
//! let mut scene = Scene::new();
//! scene.add_object("reference", build_quad_grid(2, 2).unwrap());
//!
//! let source = vec![
//!     Point3::new(0.3, 0.3, 0.5),
//!     Point3::new(1.9, 0.1, 0.2),
//!     Point3::new(1.0, 2.0, 40.0),
//! ];
//! let shape = scene.add_object("source", build_from_polygons(&source, &[[0, 1, 2]]).unwrap());
//! let vertices = scene.vertices_of("source").unwrap();
//!
//! let options = SnapOptions::default().with_tolerance(1.0);
//! let report = snap_to_reference(&mut scene, "reference", &vertices, &options, &Progress::none()).unwrap();
//! assert_eq!(report.moved, 2);
//!
//! let mesh = scene.mesh(shape).unwrap();
//! assert_eq!(*mesh.position(VertexId::new(0)), Point3::new(0.0, 0.0, 0.0));
//! assert_eq!(*mesh.position(VertexId::new(1)), Point3::new(2.0, 0.0, 0.0));
//! assert_eq!(*mesh.position(VertexId::new(2)), Point3::new(1.0, 2.0, 40.0));
//! ```

use std::fmt;

use log::{debug, info};
use nalgebra::Point3;

use crate::error::Result;
use crate::host::{MeshHost, QueryScope};
use crate::math::magnitude;

use super::progress::ProgressChannel;

/// Status text shown while snapping.
pub const SNAP_STATUS: &str = "Snapping Vertices ...";

/// Options for closest-vertex snapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOptions {
    /// Maximum distance a vertex may travel to its snap target.
    /// Targets at exactly this distance are rejected.
    pub tolerance: f64,

    /// Starting value of the running minimum distance for each vertex.
    /// Candidates at or beyond it are never considered.
    pub initial_distance: f64,
}

impl SnapOptions {
    /// Default snap tolerance, in world units.
    pub const DEFAULT_TOLERANCE: f64 = 10.0;

    /// Default initial distance, `2^32 - 1`.
    pub const DEFAULT_INITIAL_DISTANCE: f64 = 4_294_967_295.0;

    /// Set the snap tolerance.
    ///
    /// Zero or negative tolerances are accepted; nothing will be moved.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the initial running-minimum distance.
    pub fn with_initial_distance(mut self, initial_distance: f64) -> Self {
        self.initial_distance = initial_distance;
        self
    }
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            initial_distance: Self::DEFAULT_INITIAL_DISTANCE,
        }
    }
}

/// Why a snap command did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The reference object does not exist or has no shape.
    MissingReference,
    /// No vertices were given.
    EmptySelection,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingReference => write!(f, "reference mesh not found"),
            SkipReason::EmptySelection => write!(f, "no vertices selected"),
        }
    }
}

/// Summary of a snap run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapReport {
    /// Vertices that were evaluated before the run ended.
    pub processed: usize,
    /// Vertices whose position was written at least once.
    pub moved: usize,
    /// Total number of move calls issued to the host.
    pub moves: usize,
    /// Vertices left alone because their nearest face had no vertices.
    pub skipped_anomalies: usize,
    /// Whether the run stopped early on cancellation.
    pub cancelled: bool,
    /// Set when the whole command was skipped.
    pub skipped: Option<SkipReason>,
}

impl SnapReport {
    /// Report for a command that was skipped entirely.
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }
}

/// Snap `vertices` onto the closest vertex of `surface`'s nearest face.
///
/// The nearest-point query is created once up front, after the progress run
/// begins, and released after it ends, on success, cancellation and error
/// alike. Cancellation is
/// polled before each vertex; vertices moved before it stay moved.
///
/// # Errors
///
/// Fails if the query capability cannot be loaded, the query cannot be
/// created, or the host rejects a position read or move. Vertices processed
/// before the failure keep their new positions.
pub fn snap_to_closest_vertex<H, P>(
    host: &mut H,
    surface: &H::Shape,
    vertices: &[H::Vertex],
    options: &SnapOptions,
    progress: &P,
) -> Result<SnapReport>
where
    H: MeshHost,
    P: ProgressChannel + ?Sized,
{
    let mut report = SnapReport::default();

    progress.begin_progress(vertices.len(), SNAP_STATUS);
    let mut scope = match QueryScope::open(host, surface) {
        Ok(scope) => scope,
        Err(e) => {
            progress.end_progress();
            return Err(e);
        }
    };
    let outcome = snap_each(&mut scope, vertices, options, progress, &mut report);
    // The progress run closes while the query is still alive
    progress.end_progress();
    drop(scope);
    outcome?;

    info!(
        "Snapped {} of {} vertices ({} processed{})",
        report.moved,
        vertices.len(),
        report.processed,
        if report.cancelled { ", cancelled" } else { "" }
    );

    Ok(report)
}

fn snap_each<H, P>(
    scope: &mut QueryScope<'_, H>,
    vertices: &[H::Vertex],
    options: &SnapOptions,
    progress: &P,
    report: &mut SnapReport,
) -> Result<()>
where
    H: MeshHost,
    P: ProgressChannel + ?Sized,
{
    for (i, vertex) in vertices.iter().enumerate() {
        if progress.is_cancelled() {
            info!("Snapping cancelled after {} of {} vertices", i, vertices.len());
            report.cancelled = true;
            break;
        }

        let moves = snap_vertex(scope, vertex, options)?;
        match moves {
            None => report.skipped_anomalies += 1,
            Some(0) => {}
            Some(n) => {
                report.moved += 1;
                report.moves += n;
            }
        }
        report.processed += 1;

        progress.report_progress(i + 1);
    }

    Ok(())
}

/// Snap one vertex. Returns the number of moves issued, or `None` when the
/// nearest face yields no candidates.
fn snap_vertex<H: MeshHost>(
    scope: &mut QueryScope<'_, H>,
    vertex: &H::Vertex,
    options: &SnapOptions,
) -> Result<Option<usize>> {
    let position = scope.host().position_of(vertex)?;

    let candidates = match scope.nearest_face(&position)? {
        Some(face) => scope.host().faces_to_vertex_faces(scope.surface(), face)?,
        None => Vec::new(),
    };
    if candidates.is_empty() {
        debug!("{:?}: nearest face has no vertices, left in place", vertex);
        return Ok(None);
    }

    let mut closest_distance = options.initial_distance;
    let mut closest_position: Option<Point3<f64>> = None;
    let mut moves = 0;

    for element in &candidates {
        let candidate = scope.host().vertex_face_to_vertex(element);
        let candidate_position = scope.host().position_of(&candidate)?;

        let distance = magnitude(&position, &candidate_position);
        if distance < closest_distance {
            closest_distance = distance;
            closest_position = Some(candidate_position);
        }

        if closest_distance < options.tolerance {
            if let Some(target) = closest_position {
                scope.host_mut().move_vertex(vertex, target)?;
                moves += 1;
            }
        }
    }

    if moves > 0 {
        if let Some(target) = closest_position {
            debug!(
                "{:?}: snapped to ({}, {}, {}), distance {}",
                vertex, target.x, target.y, target.z, closest_distance
            );
        }
    }

    Ok(Some(moves))
}

/// Snap `vertices` onto the reference object named `reference`.
///
/// This is the user-facing command. A reference that does not resolve to a
/// shape, or an empty vertex list, makes it a silent no-op reported through
/// [`SnapReport::skipped`]. Otherwise the first shape of the reference is used
/// as the surface for [`snap_to_closest_vertex`].
pub fn snap_to_reference<H, P>(
    host: &mut H,
    reference: &str,
    vertices: &[H::Vertex],
    options: &SnapOptions,
    progress: &P,
) -> Result<SnapReport>
where
    H: MeshHost,
    P: ProgressChannel + ?Sized,
{
    let shapes = host.shapes_of(reference);
    let Some(surface) = shapes.first() else {
        info!("Reference '{}' has no mesh, nothing to snap", reference);
        return Ok(SnapReport::skipped(SkipReason::MissingReference));
    };
    if vertices.is_empty() {
        info!("No vertices selected, nothing to snap");
        return Ok(SnapReport::skipped(SkipReason::EmptySelection));
    }

    snap_to_closest_vertex(host, surface, vertices, options, progress)
}
