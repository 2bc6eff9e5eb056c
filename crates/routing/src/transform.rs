//! Geographic to navmesh coordinate mapping.

use osm::{BoundingBox, Coordinate};

/// Height of one full level (10 numeric units) in meters.
pub const STORY_HEIGHT: f64 = 3.0;

const METERS_PER_LAT_DEGREE: f64 = 111_319.9;

/// Affine mapping from geographic coordinates into the navmesh frame: a
/// local metric plane centered on the map bounding box with X east and
/// Z south (mirroring scene axes), and Y encoding the floor level.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NavMeshTransform {
    origin_lat: f64,
    origin_lon: f64,
    meters_per_lon_degree: f64,
}

impl NavMeshTransform {
    pub fn new(bbox: BoundingBox) -> Self {
        let center = bbox.center();
        let origin_lat = center.lat_f64();
        NavMeshTransform {
            origin_lat,
            origin_lon: center.lon_f64(),
            meters_per_lon_degree: METERS_PER_LAT_DEGREE * origin_lat.to_radians().cos(),
        }
    }

    /// Maps to the metric XZ plane.
    pub fn map_geo_to_nav(&self, coord: Coordinate) -> (f32, f32) {
        let x = (coord.lon_f64() - self.origin_lon) * self.meters_per_lon_degree;
        let z = (self.origin_lat - coord.lat_f64()) * METERS_PER_LAT_DEGREE;
        (x as f32, z as f32)
    }

    /// Y coordinate of a numeric level.
    pub fn map_height_to_nav(&self, numeric_level: i32) -> f32 {
        (numeric_level as f64 * STORY_HEIGHT / 10.0) as f32
    }

    pub fn map_geo_height_to_nav(&self, coord: Coordinate, numeric_level: i32) -> [f32; 3] {
        let (x, z) = self.map_geo_to_nav(coord);
        [x, self.map_height_to_nav(numeric_level), z]
    }
}
