//! Triangle soup and off-mesh connection buffers.

use crate::area::AreaType;

/// Link flag bits handed through to the routing query layer.
pub const OFF_MESH_FLAGS: u16 = 8;
/// Traversal radius of off-mesh connections, in meters.
pub const OFF_MESH_RADIUS: f32 = 0.6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkDirection {
    Forward,
    Backward,
    Bidirectional,
}

/// Vertex, triangle-index and triangle-area arrays, laid out the way the
/// voxel rasterizer consumes them (3 floats per vertex, 3 indices per
/// triangle, one area id per triangle).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleSoup {
    pub vertices: Vec<f32>,
    pub triangles: Vec<i32>,
    pub triangle_area_ids: Vec<u8>,
}

impl TriangleSoup {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) {
        self.vertices.extend_from_slice(&[x, y, z]);
    }

    pub fn add_face(&mut self, i: usize, j: usize, k: usize, area: AreaType) {
        self.triangles
            .extend_from_slice(&[i as i32, j as i32, k as i32]);
        self.triangle_area_ids.push(area.id());
    }

    pub fn vertex(&self, idx: usize) -> [f32; 3] {
        [
            self.vertices[idx * 3],
            self.vertices[idx * 3 + 1],
            self.vertices[idx * 3 + 2],
        ]
    }
}

/// Off-mesh connection records in structure-of-arrays layout: 6 endpoint
/// floats, radius, flags, area, direction and user id per connection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OffMeshConnections {
    pub vertices: Vec<f32>,
    pub radii: Vec<f32>,
    pub flags: Vec<u16>,
    pub areas: Vec<u8>,
    pub directions: Vec<u8>,
    pub user_ids: Vec<u32>,
}

impl OffMeshConnections {
    pub fn count(&self) -> usize {
        self.radii.len()
    }

    /// Adds a connection. Backward links are normalized to forward by
    /// swapping the endpoints.
    pub fn add(
        &mut self,
        mut p1: [f32; 3],
        mut p2: [f32; 3],
        mut direction: LinkDirection,
        area: AreaType,
    ) {
        if direction == LinkDirection::Backward {
            std::mem::swap(&mut p1, &mut p2);
            direction = LinkDirection::Forward;
        }

        self.vertices.extend_from_slice(&p1);
        self.vertices.extend_from_slice(&p2);
        self.radii.push(OFF_MESH_RADIUS);
        self.flags.push(OFF_MESH_FLAGS);
        self.areas.push(area.id());
        self.directions
            .push(if direction == LinkDirection::Bidirectional {
                1
            } else {
                0
            });
        self.user_ids.push(0);
    }

    pub fn endpoints(&self, idx: usize) -> ([f32; 3], [f32; 3]) {
        let base = idx * 6;
        (
            [
                self.vertices[base],
                self.vertices[base + 1],
                self.vertices[base + 2],
            ],
            [
                self.vertices[base + 3],
                self.vertices[base + 4],
                self.vertices[base + 5],
            ],
        )
    }
}
