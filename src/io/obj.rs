//! Wavefront OBJ format support.
//!
//! Faces keep their arity: quads and larger polygons load as single faces.
//! Vertices keep their file numbering, including vertices no face uses, and
//! all objects and groups in a file are merged into one mesh.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use nalgebra::Point3;

use crate::error::{Result, SnapError};
use crate::mesh::{build_from_polygons, to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an OBJ file.
///
/// Vertex `i` of the mesh is the `i`-th `v` statement of the file. Seams in
/// texture coordinates or normals do not split vertices. Line and point
/// elements are ignored.
///
/// # Example
///
/// ```no_run
/// use vertsnap::io::obj;
/// use vertsnap::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let load_error = |message: String| SnapError::LoadError {
        path: path.to_path_buf(),
        message,
    };

    let text = std::fs::read_to_string(path)?;
    let (source, vertex_count) = anchor_vertices(&text);

    let (models, _materials) = tobj::load_obj_buf(
        &mut source.as_bytes(),
        &tobj::LoadOptions {
            single_index: false,
            triangulate: false,
            ignore_points: true,
            ignore_lines: false,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )
    .map_err(|e| load_error(e.to_string()))?;

    let Some(model) = models.first() else {
        return Err(load_error("OBJ file contains no faces".to_string()));
    };
    let obj_mesh = &model.mesh;

    let vertices: Vec<Point3<f64>> = obj_mesh
        .positions
        .chunks_exact(3)
        .map(|c| Point3::new(c[0] as f64, c[1] as f64, c[2] as f64))
        .collect();
    if vertices.len() != vertex_count {
        return Err(load_error(format!(
            "expected {} vertices, read {}",
            vertex_count,
            vertices.len()
        )));
    }

    let mut faces: Vec<Vec<usize>> = Vec::new();
    let mut indices = obj_mesh.indices.iter().map(|&i| i as usize);
    for &arity in &obj_mesh.face_arities {
        let face: Vec<usize> = indices.by_ref().take(arity as usize).collect();
        // Skip the numbering anchors
        if face.len() >= 3 {
            faces.push(face);
        }
    }

    debug!(
        "OBJ '{}': {} vertices, {} faces",
        path.display(),
        vertices.len(),
        faces.len()
    );

    if faces.is_empty() {
        return Err(load_error("OBJ file contains no faces".to_string()));
    }

    build_from_polygons(&vertices, &faces)
}

/// Prepare OBJ text so tobj numbers positions in file order.
///
/// tobj numbers positions by first use and drops unused ones, so a leading
/// `l k k` anchor per position makes first use match file order. Object,
/// group and material statements are removed to keep a single model, and the
/// file's own line elements are removed so only anchors and faces remain.
/// Returns the text and the number of positions.
fn anchor_vertices(text: &str) -> (String, usize) {
    let body: Vec<&str> = text
        .lines()
        .filter(|line| {
            !matches!(
                line.split_whitespace().next(),
                Some("o" | "g" | "usemtl" | "mtllib" | "l")
            )
        })
        .collect();
    let vertex_count = body
        .iter()
        .filter(|line| line.split_whitespace().next() == Some("v"))
        .count();

    let mut source = String::with_capacity(text.len() + vertex_count * 16);
    for k in 1..=vertex_count {
        source.push_str(&format!("l {} {}\n", k, k));
    }
    for line in body {
        source.push_str(line);
        source.push('\n');
    }
    (source, vertex_count)
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use vertsnap::io::obj;
/// use vertsnap::mesh::{build_quad_grid, HalfEdgeMesh};
///
/// let mesh: HalfEdgeMesh = build_quad_grid(2, 2).unwrap();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);

    writeln!(writer, "# Generated by vertsnap")?;
    writeln!(writer, "# Vertices: {}", vertices.len())?;
    writeln!(writer, "# Faces: {}", faces.len())?;

    for v in &vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    for f in &faces {
        write!(writer, "f")?;
        for &i in f {
            write!(writer, " {}", i + 1)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
