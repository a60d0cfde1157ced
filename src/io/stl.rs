//! STL (stereolithography) format support.
//!
//! STL only stores triangles: polygons are fan-triangulated on save, and a
//! loaded mesh is always a triangle mesh. Both binary and ASCII files load.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{Result, SnapError};
use crate::mesh::{build_from_triangles, to_triangles, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an STL file.
///
/// Coincident corners are merged, and triangles that collapse onto fewer than
/// three distinct vertices are dropped.
///
/// # Example
///
/// ```no_run
/// use vertsnap::io::stl;
/// use vertsnap::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| SnapError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();

    let faces: Vec<[usize; 3]> = stl
        .faces
        .iter()
        .map(|tri| tri.vertices)
        .filter(|&[i0, i1, i2]| i0 != i1 && i1 != i2 && i0 != i2)
        .collect();

    if faces.is_empty() {
        return Err(SnapError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to a binary STL file.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let vertex = |i: usize| {
        let p = mesh.position(i.into());
        stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32])
    };

    let triangles: Vec<stl_io::Triangle> = to_triangles(mesh)
        .into_iter()
        .map(|[i0, i1, i2]| {
            let e1 = mesh.position(i1.into()) - mesh.position(i0.into());
            let e2 = mesh.position(i2.into()) - mesh.position(i0.into());
            let n = e1.cross(&e2).try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(i0), vertex(i1), vertex(i2)],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| SnapError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    writer.flush()?;
    Ok(())
}
