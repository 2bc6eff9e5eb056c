//! Viewport state and coordinate transforms.
//!
//! Scene space is the 256-unit web-mercator square from [`geom::mercator`];
//! screen coordinates are device pixels. At zoom level `z` one scene unit
//! covers `2^z` logical pixels, which lines up with the zoom numbers style
//! sheets are written against.

use geom::mercator;
use geom::{PointF, RectF};

use crate::renderer::Transform2D;

#[derive(Debug, Clone)]
pub struct View {
    screen_width: f64,
    screen_height: f64,
    device_pixel_ratio: f64,
    viewport: RectF,
    scene_bbox: RectF,
    floor_level: i32,
}

impl Default for View {
    fn default() -> Self {
        View {
            screen_width: 100.0,
            screen_height: 100.0,
            device_pixel_ratio: 1.0,
            viewport: RectF::from_size(PointF::new(0.0, 0.0), 256.0, 256.0),
            scene_bbox: RectF::from_size(PointF::new(0.0, 0.0), 256.0, 256.0),
            floor_level: 0,
        }
    }
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen size in logical pixels.
    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.screen_width = width;
        self.screen_height = height;
        self.lock_viewport_aspect();
    }

    pub fn screen_width(&self) -> f64 {
        self.screen_width
    }

    pub fn screen_height(&self) -> f64 {
        self.screen_height
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn set_device_pixel_ratio(&mut self, dpr: f64) {
        if dpr > 0.0 {
            self.device_pixel_ratio = dpr;
        }
    }

    /// Sets the scene bounding box from the map's geographic bounds and
    /// resets the viewport to show all of it.
    pub fn set_scene_bounding_box(&mut self, bbox: osm::BoundingBox) {
        if !bbox.is_valid() {
            return;
        }
        let p1 = mercator::geo_to_scene(bbox.max.lat_f64(), bbox.min.lon_f64());
        let p2 = mercator::geo_to_scene(bbox.min.lat_f64(), bbox.max.lon_f64());
        self.scene_bbox = RectF::new(p1, p2);
        self.viewport = self.scene_bbox;
        self.lock_viewport_aspect();
    }

    pub fn scene_bounding_box(&self) -> RectF {
        self.scene_bbox
    }

    pub fn viewport(&self) -> RectF {
        self.viewport
    }

    pub fn floor_level(&self) -> i32 {
        self.floor_level
    }

    /// Returns whether the level actually changed; callers rebuild the
    /// scene when it did.
    pub fn set_floor_level(&mut self, level: i32) -> bool {
        if self.floor_level == level {
            return false;
        }
        self.floor_level = level;
        true
    }

    /// Logical pixels per scene unit, as a power of two.
    pub fn zoom_level(&self) -> f64 {
        (self.screen_width / self.viewport.width()).log2()
    }

    /// Zooms so that the scene position under `screen_anchor` stays put.
    pub fn set_zoom_level(&mut self, zoom: f64, screen_anchor: PointF) {
        let zoom = zoom.clamp(0.0, 28.0);
        let anchor_scene = self.map_screen_to_scene(screen_anchor);

        let pixels_per_unit = 2f64.powf(zoom);
        let width = self.screen_width / pixels_per_unit;
        let height = self.screen_height / pixels_per_unit;

        // keep the anchor at the same relative viewport position
        let rel_x = (anchor_scene.x - self.viewport.min.x) / self.viewport.width();
        let rel_y = (anchor_scene.y - self.viewport.min.y) / self.viewport.height();
        let origin = PointF::new(
            anchor_scene.x - rel_x * width,
            anchor_scene.y - rel_y * height,
        );
        self.viewport = RectF::from_size(origin, width, height);
        self.constrain_viewport();
    }

    pub fn zoom_in(&mut self, screen_anchor: PointF) {
        self.set_zoom_level(self.zoom_level() + 1.0, screen_anchor);
    }

    pub fn zoom_out(&mut self, screen_anchor: PointF) {
        self.set_zoom_level(self.zoom_level() - 1.0, screen_anchor);
    }

    /// Moves the viewport by a screen-space delta, clamped to the scene
    /// bounding box.
    pub fn pan_screen_space(&mut self, dx: f64, dy: f64) {
        let scale = self.scene_units_per_screen_pixel();
        self.viewport = RectF::from_size(
            PointF::new(
                self.viewport.min.x + dx * scale,
                self.viewport.min.y + dy * scale,
            ),
            self.viewport.width(),
            self.viewport.height(),
        );
        self.constrain_viewport();
    }

    pub fn map_screen_to_scene(&self, p: PointF) -> PointF {
        let scale = self.scene_units_per_screen_pixel();
        PointF::new(
            self.viewport.min.x + p.x * scale,
            self.viewport.min.y + p.y * scale,
        )
    }

    pub fn map_scene_to_screen(&self, p: PointF) -> PointF {
        let scale = 1.0 / self.scene_units_per_screen_pixel();
        PointF::new(
            (p.x - self.viewport.min.x) * scale,
            (p.y - self.viewport.min.y) * scale,
        )
    }

    pub fn map_screen_distance_to_scene_distance(&self, d: f64) -> f64 {
        d * self.scene_units_per_screen_pixel()
    }

    /// Meters to scene units at the current view center latitude.
    pub fn map_meters_to_scene(&self, meters: f64) -> f64 {
        let (lat, _lon) = mercator::scene_to_geo(self.viewport.center());
        meters * mercator::scene_units_per_meter(lat)
    }

    pub fn map_geo_to_scene(&self, coord: osm::Coordinate) -> PointF {
        mercator::geo_to_scene(coord.lat_f64(), coord.lon_f64())
    }

    /// The scene-to-screen transform for the renderer.
    pub fn scene_to_screen_transform(&self) -> Transform2D {
        let scale = 1.0 / self.scene_units_per_screen_pixel();
        Transform2D {
            scale,
            tx: -self.viewport.min.x * scale,
            ty: -self.viewport.min.y * scale,
        }
    }

    /// The visible screen rect in device pixels.
    pub fn screen_rect(&self) -> RectF {
        RectF::from_size(
            PointF::new(0.0, 0.0),
            self.screen_width * self.device_pixel_ratio,
            self.screen_height * self.device_pixel_ratio,
        )
    }

    fn scene_units_per_screen_pixel(&self) -> f64 {
        self.viewport.width() / (self.screen_width * self.device_pixel_ratio)
    }

    fn lock_viewport_aspect(&mut self) {
        let height = self.viewport.width() * self.screen_height / self.screen_width;
        self.viewport = RectF::from_size(self.viewport.min, self.viewport.width(), height);
        self.constrain_viewport();
    }

    fn constrain_viewport(&mut self) {
        let mut origin = self.viewport.min;
        let width = self.viewport.width();
        let height = self.viewport.height();

        if width >= self.scene_bbox.width() {
            origin.x = self.scene_bbox.center().x - width * 0.5;
        } else {
            origin.x = origin
                .x
                .clamp(self.scene_bbox.min.x, self.scene_bbox.max.x - width);
        }
        if height >= self.scene_bbox.height() {
            origin.y = self.scene_bbox.center().y - height * 0.5;
        } else {
            origin.y = origin
                .y
                .clamp(self.scene_bbox.min.y, self.scene_bbox.max.y - height);
        }
        self.viewport = RectF::from_size(origin, width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osm::{BoundingBox, Coordinate};

    fn test_view(dpr: f64) -> View {
        let mut view = View::new();
        view.set_screen_size(400.0, 300.0);
        view.set_device_pixel_ratio(dpr);
        view.set_scene_bounding_box(BoundingBox::new(
            Coordinate::from_degrees(52.0, 13.0),
            Coordinate::from_degrees(52.01, 13.01),
        ));
        view
    }

    #[test]
    fn screen_scene_round_trip_within_a_pixel() {
        for dpr in [1.0, 2.0] {
            let view = test_view(dpr);
            for p in [
                PointF::new(0.0, 0.0),
                PointF::new(200.0, 150.0),
                PointF::new(399.0, 299.0),
            ] {
                let rt = view.map_scene_to_screen(view.map_screen_to_scene(p));
                assert!(
                    rt.distance_to(p) <= 1.0,
                    "dpr {dpr}: {p:?} -> {rt:?}"
                );
            }
        }
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut view = test_view(1.0);
        let anchor = PointF::new(100.0, 100.0);
        let before = view.map_screen_to_scene(anchor);
        view.zoom_in(anchor);
        let after = view.map_screen_to_scene(anchor);
        assert!(before.distance_to(after) < view.map_screen_distance_to_scene_distance(1.0));
        assert!(view.viewport().width() < view.scene_bounding_box().width());
    }

    #[test]
    fn pan_is_clamped_to_scene_bbox() {
        let mut view = test_view(1.0);
        let anchor = PointF::new(200.0, 150.0);
        view.zoom_in(anchor);
        view.zoom_in(anchor);
        view.pan_screen_space(1.0e7, 1.0e7);
        let vp = view.viewport();
        let bbox = view.scene_bounding_box();
        assert!(vp.max.x <= bbox.max.x + 1e-9);
        assert!(vp.max.y <= bbox.max.y + 1e-9);
    }

    #[test]
    fn meters_map_to_positive_scene_distance() {
        let view = test_view(1.0);
        let d = view.map_meters_to_scene(10.0);
        assert!(d > 0.0);
        // 10m is tiny relative to the 256-unit world
        assert!(d < 1.0);
    }

    #[test]
    fn floor_level_change_reports_delta() {
        let mut view = test_view(1.0);
        assert!(view.set_floor_level(10));
        assert!(!view.set_floor_level(10));
        assert_eq!(view.floor_level(), 10);
    }
}
