//! Wavefront OBJ export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use glam::Vec3;

use super::types::UnpackedMesh;

/// Write a mesh to an OBJ file
///
/// `offset` is added to every position, so an object-local mesh can be written
/// at its world location.
pub fn write_obj(mesh: &UnpackedMesh, path: &Path, name: &str, offset: Vec3) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj_to(mesh, &mut writer, name, offset)?;
    writer.flush()
}

/// Write a mesh as OBJ text to any writer
pub fn write_obj_to<W: Write>(
    mesh: &UnpackedMesh,
    writer: &mut W,
    name: &str,
    offset: Vec3,
) -> io::Result<()> {
    writeln!(writer, "# rock-builder")?;
    writeln!(
        writer,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;
    writeln!(writer, "o {}", name)?;

    for p in &mesh.positions {
        let p = Vec3::from(*p) + offset;
        writeln!(writer, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }

    let has_normals = mesh.normals.len() == mesh.positions.len();
    if has_normals {
        for n in &mesh.normals {
            writeln!(writer, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2])?;
        }
    }

    // OBJ indices are 1-based
    for [a, b, c] in mesh.triangles() {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        if has_normals {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(writer, "f {a} {b} {c}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural::generate_icosphere;

    #[test]
    fn test_obj_line_counts() {
        let mesh: UnpackedMesh = generate_icosphere(1.0, 1);
        let mut out = Vec::new();
        write_obj_to(&mesh, &mut out, "rock", Vec3::ZERO).unwrap();
        let text = String::from_utf8(out).unwrap();

        let v = text.lines().filter(|l| l.starts_with("v ")).count();
        let vn = text.lines().filter(|l| l.starts_with("vn ")).count();
        let f = text.lines().filter(|l| l.starts_with("f ")).count();
        assert_eq!(v, mesh.vertex_count());
        assert_eq!(vn, mesh.vertex_count());
        assert_eq!(f, mesh.triangle_count());
        assert!(text.contains("o rock"));
    }

    #[test]
    fn test_obj_offset_applied() {
        let mut mesh = UnpackedMesh::new();
        mesh.positions.push([1.0, 2.0, 3.0]);
        let mut out = Vec::new();
        write_obj_to(&mesh, &mut out, "p", Vec3::new(10.0, 0.0, -3.0)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("v 11.000000 2.000000 0.000000"));
    }

    #[test]
    fn test_obj_indices_one_based() {
        let mesh: UnpackedMesh = generate_icosphere(1.0, 0);
        let mut out = Vec::new();
        write_obj_to(&mesh, &mut out, "ico", Vec3::ZERO).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.lines().any(|l| l.starts_with("f ") && l.contains(" 0//")));
    }
}
