//! Flat-cap polyline stroking into a triangle strip.

/// Expands `path` into triangle-strip vertices for a stroke of `width`.
///
/// Emits two offset vertices per path point (left, right of the line),
/// using the averaged segment normals at interior points with the miter
/// length clamped. Degenerate input (fewer than 2 distinct points)
/// produces no vertices.
pub fn stroke_polyline(path: &[[f64; 2]], width: f64) -> Vec<[f64; 2]> {
    if path.len() < 2 || width <= 0.0 {
        return Vec::new();
    }

    let half = width * 0.5;
    let mut out = Vec::with_capacity(path.len() * 2);

    for i in 0..path.len() {
        let dir_in = if i > 0 {
            normalize(sub(path[i], path[i - 1]))
        } else {
            None
        };
        let dir_out = if i + 1 < path.len() {
            normalize(sub(path[i + 1], path[i]))
        } else {
            None
        };

        let dir = match (dir_in, dir_out) {
            (Some(a), Some(b)) => {
                let sum = [a[0] + b[0], a[1] + b[1]];
                normalize(sum).unwrap_or(a)
            }
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => continue,
        };
        let normal = [-dir[1], dir[0]];

        // miter scaling, clamped to avoid spikes at sharp corners
        let scale = match (dir_in, dir_out) {
            (Some(a), Some(_)) => {
                let cos_half = dir[0] * a[0] + dir[1] * a[1];
                if cos_half.abs() > 0.1 { 1.0 / cos_half } else { 1.0 }
            }
            _ => 1.0,
        };
        let offset = half * scale;

        out.push([path[i][0] + normal[0] * offset, path[i][1] + normal[1] * offset]);
        out.push([path[i][0] - normal[0] * offset, path[i][1] - normal[1] * offset]);
    }

    if out.len() < 4 { Vec::new() } else { out }
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

fn normalize(v: [f64; 2]) -> Option<[f64; 2]> {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    if len <= 1e-12 {
        return None;
    }
    Some([v[0] / len, v[1] / len])
}

#[cfg(test)]
mod tests {
    use super::stroke_polyline;

    #[test]
    fn straight_segment_strokes_to_rectangle() {
        let verts = stroke_polyline(&[[0.0, 0.0], [10.0, 0.0]], 2.0);
        assert_eq!(verts.len(), 4);
        // left/right offsets of both endpoints, one unit off the axis
        assert!(verts.iter().all(|v| v[1].abs() == 1.0));
        assert!(verts[0][0] == 0.0 && verts[2][0] == 10.0);
    }

    #[test]
    fn interior_points_use_averaged_normals() {
        let verts = stroke_polyline(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]], 2.0);
        assert_eq!(verts.len(), 6);
        // corner offsets lie on the 45 degree miter
        let corner_left = verts[2];
        assert!((corner_left[0] - 10.0).abs() < 2.0);
        assert!((corner_left[1]).abs() < 2.0);
    }

    #[test]
    fn degenerate_input_yields_nothing() {
        assert!(stroke_polyline(&[[0.0, 0.0]], 2.0).is_empty());
        assert!(stroke_polyline(&[[0.0, 0.0], [0.0, 0.0]], 2.0).is_empty());
        assert!(stroke_polyline(&[[0.0, 0.0], [1.0, 0.0]], 0.0).is_empty());
    }
}
