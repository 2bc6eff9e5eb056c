//! Web-mercator scene projection.
//!
//! Scene space is a 256-unit square: x grows east, y grows south, so
//! ascending screen-Y matches ascending scene-Y without an extra flip.

use crate::point::PointF;

/// Width and height of the projected world in scene units.
pub const SCENE_WORLD_SIZE: f64 = 256.0;

/// Mean earth circumference at the equator (meters).
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_016.686;

/// Latitude clamp of the web-mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

pub fn geo_to_scene(lat_deg: f64, lon_deg: f64) -> PointF {
    let lat = lat_deg.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = (lon_deg + 180.0) / 360.0 * SCENE_WORLD_SIZE;
    let lat_rad = lat.to_radians();
    let y = (1.0 - ((lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI)) / 2.0
        * SCENE_WORLD_SIZE;
    PointF::new(x, y)
}

pub fn scene_to_geo(p: PointF) -> (f64, f64) {
    let lon = p.x / SCENE_WORLD_SIZE * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * p.y / SCENE_WORLD_SIZE);
    let lat = n.sinh().atan().to_degrees();
    (lat, lon)
}

/// Scene units per meter at the given latitude.
pub fn scene_units_per_meter(lat_deg: f64) -> f64 {
    let lat = lat_deg.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    SCENE_WORLD_SIZE / (EARTH_CIRCUMFERENCE * lat.to_radians().cos())
}
