//! Debug artifacts for the external solver demo: Wavefront `.obj` triangle
//! dumps and `.gset` solver-parameter files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::settings::NavMeshSettings;
use crate::soup::{OffMeshConnections, TriangleSoup};

/// Writes `v x y z` lines followed by 1-based `f i j k` faces.
pub fn write_obj(path: &Path, soup: &TriangleSoup) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    for v in soup.vertices.chunks_exact(3) {
        writeln!(out, "v {} {} {}", v[0], v[1], v[2])?;
    }
    for t in soup.triangles.chunks_exact(3) {
        writeln!(out, "f {} {} {}", t[0] + 1, t[1] + 1, t[2] + 1)?;
    }
    out.flush()
}

/// Writes the solver-parameter line and one `c` line per off-mesh
/// connection.
#[allow(clippy::too_many_arguments)]
pub fn write_gset(
    path: &Path,
    obj_file_name: &str,
    settings: &NavMeshSettings,
    bbox_min: (f32, f32),
    bbox_max: (f32, f32),
    lowest_level: i32,
    highest_level: i32,
    connections: &OffMeshConnections,
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "f {obj_file_name}")?;

    write!(
        out,
        "s {} {} {} {} {} {} {} {} {} {} 6 {} {} {} ",
        settings.cell_size,
        settings.cell_height,
        settings.agent_height,
        settings.agent_radius,
        settings.agent_max_climb,
        settings.agent_max_slope,
        settings.region_min_area,
        settings.region_merge_area,
        settings.max_edge_len,
        settings.max_simplification_error,
        settings.detail_sample_dist,
        settings.detail_sample_max_error,
        settings.partition_type.id(),
    )?;
    // bbox with raw numeric levels on the Y axis, as the solver demo expects
    writeln!(
        out,
        "{} {} {} {} {} {} 0",
        bbox_min.0, lowest_level, bbox_min.1, bbox_max.0, highest_level, bbox_max.1
    )?;

    for idx in 0..connections.count() {
        let (p1, p2) = connections.endpoints(idx);
        writeln!(
            out,
            "c {} {} {} {} {} {} {} {} {} {}",
            p1[0],
            p1[1],
            p1[2],
            p2[0],
            p2[1],
            p2[2],
            connections.radii[idx],
            connections.directions[idx],
            connections.areas[idx],
            connections.flags[idx],
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaType;
    use crate::soup::LinkDirection;

    #[test]
    fn obj_faces_are_one_based() {
        let mut soup = TriangleSoup::default();
        soup.add_vertex(0.0, 0.0, 0.0);
        soup.add_vertex(1.0, 0.0, 0.0);
        soup.add_vertex(0.0, 0.0, 1.0);
        soup.add_face(0, 1, 2, AreaType::Walkable);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.obj");
        write_obj(&path, &soup).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("v 0 0 0\n"));
        assert!(content.contains("f 1 2 3\n"));
    }

    #[test]
    fn gset_carries_parameters_and_connections() {
        let mut connections = OffMeshConnections::default();
        connections.add(
            [0.0, 0.0, 0.0],
            [0.0, 3.0, 0.0],
            LinkDirection::Bidirectional,
            AreaType::Elevator,
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.gset");
        write_gset(
            &path,
            "mesh.obj",
            &NavMeshSettings::default(),
            (-10.0, -20.0),
            (10.0, 20.0),
            -10,
            20,
            &connections,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("f mesh.obj"));
        let s_line = lines.next().unwrap();
        assert!(s_line.starts_with("s 0.2 0.2 1.8 0.3 0.5 45 8 20 12 1.3 6 "));
        assert!(s_line.ends_with("-10 -10 -20 10 20 20 0"));
        let c_line = lines.next().unwrap();
        assert_eq!(c_line, "c 0 0 0 0 3 0 0.6 1 2 8");
    }
}
