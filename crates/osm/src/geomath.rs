//! Geographic distance helpers.

use crate::datatypes::{Coordinate, Node};

const EARTH_RADIUS: f64 = 6_371_000.0; // meters

/// Haversine distance between two coordinates, in meters.
pub fn distance(c1: Coordinate, c2: Coordinate) -> f64 {
    distance_degrees(c1.lat_f64(), c1.lon_f64(), c2.lat_f64(), c2.lon_f64())
}

/// see <https://en.wikipedia.org/wiki/Haversine_formula>
pub fn distance_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat1 - lat2).to_radians();
    let d_lon = (lon1 - lon2).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distance from `coord` to an outer path, in meters.
///
/// The path may consist of several closed loops (see
/// [`Element::outer_path`]); the virtual segment between two loops is not
/// part of the path and is skipped.
pub fn distance_to_path(path: &[&Node], coord: Coordinate) -> f64 {
    if path.is_empty() {
        return f64::MAX;
    }
    if path.len() == 1 {
        return distance(path[0].coordinate, coord);
    }

    let mut dist = f64::MAX;
    let mut loop_start: Option<i64> = None;
    for pair in path.windows(2) {
        let start = loop_start.get_or_insert(pair[0].id);
        if pair[1].id == *start {
            // just closed a loop, the next segment starts a new one
            loop_start = None;
            continue;
        }
        dist = dist.min(segment_distance(
            pair[0].coordinate,
            pair[1].coordinate,
            coord,
        ));
    }
    dist
}

fn segment_distance(a: Coordinate, b: Coordinate, p: Coordinate) -> f64 {
    // Project in the local equirectangular plane; indoor maps are small
    // enough for this to hold.
    let scale = p.lat_f64().to_radians().cos();
    let ax = a.lon_f64() * scale;
    let bx = b.lon_f64() * scale;
    let px = p.lon_f64() * scale;
    let (ay, by, py) = (a.lat_f64(), b.lat_f64(), p.lat_f64());

    let dx = bx - ax;
    let dy = by - ay;
    let len2 = dx * dx + dy * dy;
    let t = if len2 <= 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    };
    let proj_lat = ay + dy * t;
    let proj_lon = (ax + dx * t) / scale;
    distance_degrees(proj_lat, proj_lon, p.lat_f64(), p.lon_f64())
}
