//! Maps a screen position to the semantically best scene graph item.

use geom::PointF;
use geom::polygon::{distance_to_polyline, polygon_contains, rings_contain};
use style::Unit;

use crate::graph::SceneGraph;
use crate::item::{Pen, SceneGraphItem, SceneItemPayload};
use crate::view::View;

#[derive(Default)]
pub struct HitDetector;

impl HitDetector {
    pub fn new() -> Self {
        Self
    }

    /// The best item under `screen_pos` (device pixels), or `None`.
    ///
    /// With multiple candidates, a mostly opaque top item wins; under
    /// transparency the smallest item by bounding-box area does, which
    /// surfaces nested rooms over the building around them. Determinism
    /// follows from the scene-graph iteration order.
    pub fn item_at<'a>(
        &self,
        screen_pos: PointF,
        sg: &'a SceneGraph,
        view: &View,
    ) -> Option<&'a SceneGraphItem> {
        let mut items = self.items_at(screen_pos, sg, view);
        if items.is_empty() {
            return None;
        }
        if items.len() == 1 {
            return Some(items[0]);
        }

        // (1) topmost mostly opaque element, use that
        if let Some(top) = items
            .iter()
            .rev()
            .copied()
            .find(|item| item_fill_alpha(item) >= 0.5)
        {
            return Some(top);
        }

        // (2) in presence of transparency, use the smallest item here
        items.sort_by(|lhs, rhs| {
            let lhs_area = lhs.payload.bounding_rect().area();
            let rhs_area = rhs.payload.bounding_rect().area();
            lhs_area.total_cmp(&rhs_area)
        });
        items.first().copied()
    }

    /// All items containing `screen_pos`, in scene-graph iteration order.
    pub fn items_at<'a>(
        &self,
        screen_pos: PointF,
        sg: &'a SceneGraph,
        view: &View,
    ) -> Vec<&'a SceneGraphItem> {
        let scene_pos = view.map_screen_to_scene(screen_pos);
        let mut result = Vec::new();
        for item in sg.items() {
            if item.payload.render_phases().is_empty() {
                continue;
            }
            let in_bbox = if item.payload.in_hud_space() {
                true // HUD bboxes are screen-sized, tested precisely below
            } else {
                item.payload.bounding_rect().contains_point(scene_pos)
            };
            if !in_bbox {
                continue;
            }
            if item_contains_point(item, screen_pos, scene_pos, view) {
                result.push(item);
            }
        }
        result
    }
}

fn item_contains_point(
    item: &SceneGraphItem,
    screen_pos: PointF,
    scene_pos: PointF,
    view: &View,
) -> bool {
    match &item.payload {
        SceneItemPayload::Polygon(p) => polygon_contains(&p.polygon, scene_pos),
        SceneItemPayload::MultiPolygon(p) => rings_contain(&p.rings, scene_pos),
        SceneItemPayload::Polyline(p) => {
            if p.path.len() < 2 {
                return false;
            }
            let line_width = pen_scene_width(&p.pen, view) + pen_scene_width(&p.casing_pen, view);
            distance_to_polyline(&p.path, scene_pos) <= line_width
        }
        SceneItemPayload::Label(label) => {
            let bbox = label.bounding_rect();
            let hit_box = bbox.moved_center(view.map_scene_to_screen(bbox.center()));
            hit_box.contains_point(screen_pos)
        }
    }
}

fn pen_scene_width(pen: &Pen, view: &View) -> f64 {
    match pen.width_unit {
        Unit::Meters => view.map_meters_to_scene(pen.width),
        Unit::Pixels | Unit::Points | Unit::NoUnit => {
            view.map_screen_distance_to_scene_distance(pen.width)
        }
    }
}

fn item_fill_alpha(item: &SceneGraphItem) -> f32 {
    match &item.payload {
        SceneItemPayload::Polygon(p) => p.fill_color.alpha_f(),
        SceneItemPayload::MultiPolygon(p) => p.fill_color.alpha_f(),
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::PolygonItem;
    use osm::{BoundingBox, Coordinate, ElementId, ElementType};
    use style::Color;

    fn test_view() -> View {
        let mut view = View::new();
        view.set_screen_size(400.0, 400.0);
        view.set_scene_bounding_box(BoundingBox::new(
            Coordinate::from_degrees(51.999, 12.999),
            Coordinate::from_degrees(52.001, 13.001),
        ));
        view
    }

    fn polygon_at(view: &View, half_extent: f64, alpha: f32, id: i64) -> SceneGraphItem {
        let c = view.viewport().center();
        let ring = vec![
            PointF::new(c.x - half_extent, c.y - half_extent),
            PointF::new(c.x + half_extent, c.y - half_extent),
            PointF::new(c.x + half_extent, c.y + half_extent),
            PointF::new(c.x - half_extent, c.y + half_extent),
        ];
        SceneGraphItem {
            layer: 0,
            z: 0,
            element: ElementId::new(ElementType::Way, id),
            payload: SceneItemPayload::Polygon(PolygonItem::new(
                ring,
                Color::from_rgb(255, 0, 0).with_alpha_f(alpha),
                Pen::default(),
            )),
        }
    }

    fn center_screen(view: &View) -> PointF {
        view.map_scene_to_screen(view.viewport().center())
    }

    #[test]
    fn empty_scene_yields_no_element() {
        let view = test_view();
        let sg = SceneGraph::new();
        assert!(
            HitDetector::new()
                .item_at(PointF::new(200.0, 200.0), &sg, &view)
                .is_none()
        );
    }

    #[test]
    fn single_candidate_is_returned() {
        let view = test_view();
        let mut sg = SceneGraph::new();
        sg.add_item(polygon_at(&view, 1e-5, 1.0, 1));
        sg.finalize();

        let hit = HitDetector::new()
            .item_at(center_screen(&view), &sg, &view)
            .unwrap();
        assert_eq!(hit.element.id, 1);
    }

    #[test]
    fn opaque_top_item_wins() {
        let view = test_view();
        let mut sg = SceneGraph::new();
        sg.add_item(polygon_at(&view, 1e-5, 0.3, 1));
        sg.add_item(polygon_at(&view, 2e-5, 0.9, 2));
        sg.finalize();

        let hit = HitDetector::new()
            .item_at(center_screen(&view), &sg, &view)
            .unwrap();
        assert_eq!(hit.element.id, 2);
    }

    #[test]
    fn transparent_overlap_prefers_smaller_bbox() {
        let view = test_view();
        let mut sg = SceneGraph::new();
        sg.add_item(polygon_at(&view, 2e-5, 0.3, 1));
        sg.add_item(polygon_at(&view, 1e-5, 0.3, 2));
        sg.finalize();

        let hit = HitDetector::new()
            .item_at(center_screen(&view), &sg, &view)
            .unwrap();
        assert_eq!(hit.element.id, 2);
    }

    #[test]
    fn hit_test_is_deterministic() {
        let view = test_view();
        let mut sg = SceneGraph::new();
        sg.add_item(polygon_at(&view, 1e-5, 0.3, 1));
        sg.add_item(polygon_at(&view, 1e-5, 0.3, 2));
        sg.finalize();

        let detector = HitDetector::new();
        let first = detector
            .item_at(center_screen(&view), &sg, &view)
            .unwrap()
            .element;
        for _ in 0..5 {
            let again = detector
                .item_at(center_screen(&view), &sg, &view)
                .unwrap()
                .element;
            assert_eq!(again, first);
        }
    }
}
