//! Phase-ordered rendering of a scene graph onto an abstract 2D canvas.

use geom::{PointF, RectF};
use style::{Color, Unit};

use crate::graph::SceneGraph;
use crate::item::{
    CapStyle, FontSpec, JoinStyle, LabelItem, Pen, RenderPhases, SceneItemPayload,
};
use crate::view::View;

/// Uniform scale plus translation, scene to screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform2D {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        scale: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn apply(&self, p: PointF) -> PointF {
        PointF::new(p.x * self.scale + self.tx, p.y * self.scale + self.ty)
    }
}

/// A stroke with all widths resolved to the target coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub cap: CapStyle,
    pub join: JoinStyle,
    pub dashes: Vec<f64>,
}

/// The abstract 2D paint target.
///
/// Geometry arrives in the coordinate space selected by the preceding
/// `set_transform` call: scene space during fill/casing/stroke phases,
/// screen space during the label phase.
pub trait Painter {
    fn begin(&mut self, _screen: RectF) {}
    fn end(&mut self) {}

    fn set_transform(&mut self, transform: Transform2D);
    fn set_clip_rect(&mut self, clip: Option<RectF>);
    fn set_antialiasing(&mut self, enabled: bool);

    /// Fills in the current transform's space.
    fn fill_rect(&mut self, rect: RectF, color: Color);
    fn draw_polygon(&mut self, ring: &[PointF], fill: Color, stroke: Option<&StrokeStyle>);
    /// Even-odd fill across rings.
    fn draw_rings(&mut self, rings: &[Vec<PointF>], fill: Color, stroke: Option<&StrokeStyle>);
    fn draw_polyline(&mut self, path: &[PointF], stroke: &StrokeStyle);

    fn save(&mut self) {}
    fn restore(&mut self) {}
    fn translate(&mut self, _offset: PointF) {}
    fn rotate(&mut self, _degrees: f64) {}

    fn draw_text(&mut self, rect: RectF, text: &str, font: &FontSpec, color: Color);
    fn draw_icon(&mut self, _rect: RectF, _name: &str) {}

    /// Measured extent of `text`; the default estimates from the glyph
    /// count, real canvases use their font metrics.
    fn measure_text(&mut self, text: &str, font: &FontSpec, max_width: f64) -> RectF {
        let glyphs = text.chars().count().max(1) as f64;
        let mut width = font.size * 0.6 * glyphs;
        let mut lines = 1.0;
        if max_width > 0.0 && width > max_width {
            lines = (width / max_width).ceil();
            width = max_width;
        }
        RectF::from_size(PointF::new(0.0, 0.0), width, font.size * 1.2 * lines)
    }
}

const RENDER_PHASES: [RenderPhases; 4] = [
    RenderPhases::FILL,
    RenderPhases::CASING,
    RenderPhases::STROKE,
    RenderPhases::LABEL,
];

/// Walks layer ranges in order and draws each phase of the in-view batch.
///
/// The renderer is pure apart from the label bounding-box cache it fills
/// on first draw.
#[derive(Default)]
pub struct PainterRenderer {
    batch: Vec<usize>,
}

impl PainterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, sg: &mut SceneGraph, view: &View, painter: &mut dyn Painter) {
        painter.begin(view.screen_rect());
        painter.set_transform(Transform2D::IDENTITY);
        painter.fill_rect(view.screen_rect(), sg.background_color());

        let offsets: Vec<_> = sg.layer_offsets().to_vec();
        for offset in offsets {
            self.collect_batch(sg, view, offset.begin, offset.end);
            if self.batch.is_empty() {
                continue;
            }
            for phase in RENDER_PHASES {
                self.render_phase(sg, view, painter, phase);
            }
        }

        self.render_scene_edge_fade(sg.background_color(), view, painter);
        painter.set_clip_rect(None);
        painter.end();

        tracing::debug!(
            items = sg.items().len(),
            layers = sg.layer_offsets().len(),
            "frame rendered"
        );
    }

    /// Selects the items of one layer range that are currently visible.
    fn collect_batch(&mut self, sg: &SceneGraph, view: &View, begin: usize, end: usize) {
        self.batch.clear();
        let screen = view.screen_rect();
        for idx in begin..end {
            let payload = &sg.items()[idx].payload;
            if payload.render_phases().is_empty() {
                continue;
            }
            if payload.in_scene_space() && view.viewport().intersects(&payload.bounding_rect()) {
                self.batch.push(idx);
            }
            if payload.in_hud_space() {
                let bbox = payload.bounding_rect();
                let bbox = bbox.moved_center(view.map_scene_to_screen(bbox.center()));
                if screen.intersects(&bbox) {
                    self.batch.push(idx);
                }
            }
        }
    }

    fn render_phase(
        &self,
        sg: &mut SceneGraph,
        view: &View,
        painter: &mut dyn Painter,
        phase: RenderPhases,
    ) {
        self.begin_phase(view, painter, phase);
        for &idx in &self.batch {
            let item = &mut sg.items_mut()[idx];
            if !item.payload.render_phases().contains(phase) {
                continue;
            }
            match &mut item.payload {
                SceneItemPayload::Polygon(p) => {
                    if phase == RenderPhases::FILL {
                        painter.draw_polygon(&p.polygon, p.fill_color, None);
                    } else {
                        let stroke = resolve_stroke(&p.pen, view);
                        painter.draw_polygon(&p.polygon, Color::TRANSPARENT, Some(&stroke));
                    }
                }
                SceneItemPayload::MultiPolygon(p) => {
                    if phase == RenderPhases::FILL {
                        painter.draw_rings(&p.rings, p.fill_color, None);
                    } else {
                        let stroke = resolve_stroke(&p.pen, view);
                        painter.draw_rings(&p.rings, Color::TRANSPARENT, Some(&stroke));
                    }
                }
                SceneItemPayload::Polyline(p) => {
                    if phase == RenderPhases::STROKE {
                        painter.draw_polyline(&p.path, &resolve_stroke(&p.pen, view));
                    } else {
                        // casing: the stroke width plus the casing on both sides
                        let mut stroke = resolve_stroke(&p.casing_pen, view);
                        stroke.width += resolve_width(&p.pen, view);
                        painter.draw_polyline(&p.path, &stroke);
                    }
                }
                SceneItemPayload::Label(label) => {
                    render_label(label, view, painter);
                }
            }
        }
    }

    fn begin_phase(&self, view: &View, painter: &mut dyn Painter, phase: RenderPhases) {
        match phase {
            RenderPhases::FILL => {
                painter.set_transform(view.scene_to_screen_transform());
                painter.set_clip_rect(Some(
                    view.viewport().intersected(&view.scene_bounding_box()),
                ));
                painter.set_antialiasing(false);
            }
            RenderPhases::CASING | RenderPhases::STROKE => {
                painter.set_transform(view.scene_to_screen_transform());
                painter.set_clip_rect(Some(
                    view.viewport().intersected(&view.scene_bounding_box()),
                ));
                painter.set_antialiasing(true);
            }
            _ => {
                painter.set_transform(Transform2D::IDENTITY);
                painter.set_clip_rect(None);
                painter.set_antialiasing(true);
            }
        }
    }

    /// Fades the map out at the scene box edges, indicating there is
    /// nothing to scroll to beyond them.
    fn render_scene_edge_fade(&self, bg: Color, view: &View, painter: &mut dyn Painter) {
        const BORDER_WIDTH: f64 = 10.0;
        let fade = bg.with_alpha_f(0.75);

        painter.set_transform(Transform2D::IDENTITY);
        painter.set_clip_rect(None);

        let t = view.scene_to_screen_transform();
        let scene = view.scene_bounding_box();
        let r = RectF::new(t.apply(scene.min), t.apply(scene.max));

        let strips = [
            RectF::new(r.min, PointF::new(r.max.x, r.min.y + BORDER_WIDTH)),
            RectF::new(PointF::new(r.min.x, r.max.y - BORDER_WIDTH), r.max),
            RectF::new(r.min, PointF::new(r.min.x + BORDER_WIDTH, r.max.y)),
            RectF::new(PointF::new(r.max.x - BORDER_WIDTH, r.min.y), r.max),
        ];
        for strip in strips {
            let clipped = strip.intersected(&view.screen_rect());
            if clipped.is_valid() && clipped.area() > 0.0 {
                painter.fill_rect(clipped, fade);
            }
        }
    }
}

fn render_label(label: &mut LabelItem, view: &View, painter: &mut dyn Painter) {
    painter.save();
    painter.translate(view.map_scene_to_screen(label.pos));
    painter.rotate(label.angle);

    if label.measured_bbox.is_none() {
        let mut bbox = if label.text.is_empty() {
            RectF::EMPTY
        } else {
            painter.measure_text(&label.text, &label.font, label.max_width)
        };
        if label.icon_name.is_some() {
            bbox = bbox.united(&RectF::from_size(
                PointF::new(0.0, 0.0),
                label.icon_width,
                label.icon_height,
            ));
        }
        label.set_measured_bbox(bbox.moved_center(label.pos));
    }

    let bbox = label.bounding_rect();
    let mut local = RectF::from_size(PointF::new(0.0, 0.0), bbox.width(), bbox.height())
        .moved_center(PointF::new(0.0, label.offset));

    // shield: casing > frame > shield background
    let mut w = label.casing_width + label.frame_width + 2.0;
    if label.casing_width > 0.0 && !label.casing_color.is_transparent() {
        painter.fill_rect(local.adjusted(w), label.casing_color);
    }
    w -= label.casing_width;
    if label.frame_width > 0.0 && !label.frame_color.is_transparent() {
        painter.fill_rect(local.adjusted(w), label.frame_color);
    }
    w -= label.frame_width;
    if !label.shield_color.is_transparent() {
        painter.fill_rect(local.adjusted(w), label.shield_color);
    }

    if let Some(icon) = &label.icon_name {
        let icon_rect = RectF::from_size(
            PointF::new(0.0, 0.0),
            label.icon_width,
            label.icon_height,
        )
        .moved_center(PointF::new(0.0, 0.0));
        painter.draw_icon(icon_rect, icon);
        local = local.moved_center(PointF::new(0.0, label.offset + label.icon_height * 0.5));
    }

    if !label.text.is_empty() {
        if label.halo_radius > 0.0 && !label.halo_color.is_transparent() {
            painter.fill_rect(local.adjusted(label.halo_radius), label.halo_color);
        }
        painter.draw_text(local, &label.text, &label.font, label.color);
    }

    painter.restore();
}

fn resolve_stroke(pen: &Pen, view: &View) -> StrokeStyle {
    StrokeStyle {
        color: pen.color,
        width: resolve_width(pen, view),
        cap: pen.cap,
        join: pen.join,
        dashes: pen.dashes.clone(),
    }
}

/// Pen widths carry their MapCSS unit; resolve to scene units here.
fn resolve_width(pen: &Pen, view: &View) -> f64 {
    match pen.width_unit {
        Unit::Meters => view.map_meters_to_scene(pen.width),
        Unit::Pixels | Unit::Points | Unit::NoUnit => {
            view.map_screen_distance_to_scene_distance(pen.width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SceneGraph;
    use crate::item::{PolygonItem, SceneGraphItem};
    use osm::{BoundingBox, Coordinate, ElementId, ElementType};

    #[derive(Debug, PartialEq)]
    enum Cmd {
        FillRect(Color),
        Polygon { fill: Color, stroked: bool },
        Polyline,
        Text(String),
    }

    #[derive(Default)]
    struct RecordingPainter {
        cmds: Vec<Cmd>,
    }

    impl Painter for RecordingPainter {
        fn set_transform(&mut self, _t: Transform2D) {}
        fn set_clip_rect(&mut self, _c: Option<RectF>) {}
        fn set_antialiasing(&mut self, _on: bool) {}

        fn fill_rect(&mut self, _rect: RectF, color: Color) {
            self.cmds.push(Cmd::FillRect(color));
        }

        fn draw_polygon(&mut self, _ring: &[PointF], fill: Color, stroke: Option<&StrokeStyle>) {
            self.cmds.push(Cmd::Polygon {
                fill,
                stroked: stroke.is_some(),
            });
        }

        fn draw_rings(&mut self, _rings: &[Vec<PointF>], fill: Color, stroke: Option<&StrokeStyle>) {
            self.cmds.push(Cmd::Polygon {
                fill,
                stroked: stroke.is_some(),
            });
        }

        fn draw_polyline(&mut self, _path: &[PointF], _stroke: &StrokeStyle) {
            self.cmds.push(Cmd::Polyline);
        }

        fn draw_text(&mut self, _rect: RectF, text: &str, _font: &FontSpec, _color: Color) {
            self.cmds.push(Cmd::Text(text.to_string()));
        }
    }

    fn test_view() -> View {
        let mut view = View::new();
        view.set_screen_size(400.0, 300.0);
        view.set_scene_bounding_box(BoundingBox::new(
            Coordinate::from_degrees(51.999, 12.999),
            Coordinate::from_degrees(52.001, 13.001),
        ));
        view
    }

    fn scene_polygon_item(view: &View) -> SceneGraphItem {
        let center = view.viewport().center();
        let ring = vec![
            PointF::new(center.x - 1e-6, center.y - 1e-6),
            PointF::new(center.x + 1e-6, center.y - 1e-6),
            PointF::new(center.x + 1e-6, center.y + 1e-6),
        ];
        SceneGraphItem {
            layer: 0,
            z: 0,
            element: ElementId::new(ElementType::Way, 1),
            payload: SceneItemPayload::Polygon(PolygonItem::new(
                ring,
                Color::from_rgb(255, 0, 0),
                Pen::default(),
            )),
        }
    }

    #[test]
    fn background_is_painted_first() {
        let view = test_view();
        let mut sg = SceneGraph::new();
        sg.set_background_color(Color::from_rgb(1, 2, 3));
        sg.add_item(scene_polygon_item(&view));
        sg.finalize();

        let mut painter = RecordingPainter::default();
        PainterRenderer::new().render(&mut sg, &view, &mut painter);

        assert_eq!(painter.cmds[0], Cmd::FillRect(Color::from_rgb(1, 2, 3)));
        assert!(painter.cmds.contains(&Cmd::Polygon {
            fill: Color::from_rgb(255, 0, 0),
            stroked: false,
        }));
    }

    #[test]
    fn out_of_view_items_are_culled() {
        let view = test_view();
        let mut sg = SceneGraph::new();
        let far = vec![
            PointF::new(0.0, 0.0),
            PointF::new(0.001, 0.0),
            PointF::new(0.001, 0.001),
        ];
        sg.add_item(SceneGraphItem {
            layer: 0,
            z: 0,
            element: ElementId::new(ElementType::Way, 1),
            payload: SceneItemPayload::Polygon(PolygonItem::new(
                far,
                Color::from_rgb(255, 0, 0),
                Pen::default(),
            )),
        });
        sg.finalize();

        let mut painter = RecordingPainter::default();
        PainterRenderer::new().render(&mut sg, &view, &mut painter);
        assert!(
            !painter
                .cmds
                .iter()
                .any(|c| matches!(c, Cmd::Polygon { .. }))
        );
    }

    #[test]
    fn label_bbox_is_memoized_after_first_draw() {
        let view = test_view();
        let mut sg = SceneGraph::new();
        let label = LabelItem {
            pos: view.viewport().center(),
            text: "Lobby".into(),
            color: Color::BLACK,
            font: FontSpec {
                size: 10.0,
                ..Default::default()
            },
            ..Default::default()
        };
        sg.add_item(SceneGraphItem {
            layer: 0,
            z: 0,
            element: ElementId::new(ElementType::Node, 1),
            payload: SceneItemPayload::Label(label),
        });
        sg.finalize();

        let mut painter = RecordingPainter::default();
        PainterRenderer::new().render(&mut sg, &view, &mut painter);
        assert!(painter.cmds.contains(&Cmd::Text("Lobby".into())));

        let SceneItemPayload::Label(label) = &sg.items()[0].payload else {
            unreachable!();
        };
        assert!(label.measured_bbox.is_some());
    }
}
