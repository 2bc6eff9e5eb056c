//! Scene graph items and their payloads.
//!
//! Payloads are a tagged sum over the four geometry kinds; render and
//! hit-test sites match on the variant instead of dispatching virtually.

use geom::{PointF, RectF};
use osm::ElementId;
use style::{Color, Unit};

/// Bitset over the draw passes a payload participates in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderPhases(u8);

impl RenderPhases {
    pub const NONE: RenderPhases = RenderPhases(0);
    pub const FILL: RenderPhases = RenderPhases(1);
    pub const CASING: RenderPhases = RenderPhases(2);
    pub const STROKE: RenderPhases = RenderPhases(4);
    pub const LABEL: RenderPhases = RenderPhases(8);

    pub const fn union(self, other: RenderPhases) -> RenderPhases {
        RenderPhases(self.0 | other.0)
    }

    pub const fn contains(self, other: RenderPhases) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CapStyle {
    #[default]
    Flat,
    Square,
    Round,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum JoinStyle {
    Miter,
    Bevel,
    #[default]
    Round,
}

/// Stroke description; the width unit is resolved against the view at
/// render and hit-test time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f64,
    pub width_unit: Unit,
    pub cap: CapStyle,
    pub join: JoinStyle,
    pub dashes: Vec<f64>,
}

impl Pen {
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && !self.color.is_transparent()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolygonItem {
    pub polygon: Vec<PointF>,
    pub fill_color: Color,
    pub pen: Pen,
    pub(crate) bbox: RectF,
}

impl PolygonItem {
    pub fn new(polygon: Vec<PointF>, fill_color: Color, pen: Pen) -> Self {
        let bbox = RectF::bounding_rect_of(&polygon);
        PolygonItem {
            polygon,
            fill_color,
            pen,
            bbox,
        }
    }
}

/// Even-odd filled multi-ring polygon: multipolygon relations and
/// self-intersecting outers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiPolygonItem {
    pub rings: Vec<Vec<PointF>>,
    pub fill_color: Color,
    pub pen: Pen,
    pub(crate) bbox: RectF,
}

impl MultiPolygonItem {
    pub fn new(rings: Vec<Vec<PointF>>, fill_color: Color, pen: Pen) -> Self {
        let mut bbox = RectF::EMPTY;
        for ring in &rings {
            bbox = bbox.united(&RectF::bounding_rect_of(ring));
        }
        MultiPolygonItem {
            rings,
            fill_color,
            pen,
            bbox,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolylineItem {
    pub path: Vec<PointF>,
    pub pen: Pen,
    pub casing_pen: Pen,
    pub(crate) bbox: RectF,
}

impl PolylineItem {
    pub fn new(path: Vec<PointF>, pen: Pen, casing_pen: Pen) -> Self {
        let bbox = RectF::bounding_rect_of(&path);
        PolylineItem {
            path,
            pen,
            casing_pen,
            bbox,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

/// A text and/or icon label, drawn in HUD (screen-fixed) space at a scene
/// anchor position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelItem {
    pub pos: PointF,
    pub text: String,
    pub color: Color,
    pub font: FontSpec,
    pub halo_color: Color,
    pub halo_radius: f64,
    pub icon_name: Option<String>,
    pub icon_width: f64,
    pub icon_height: f64,
    pub angle: f64,
    pub offset: f64,
    pub max_width: f64,
    pub frame_color: Color,
    pub frame_width: f64,
    pub casing_color: Color,
    pub casing_width: f64,
    pub shield_color: Color,
    /// Measured extent, cached by the renderer after the first draw.
    pub(crate) measured_bbox: Option<RectF>,
}

impl LabelItem {
    /// Label extent in screen units, centered at the scene anchor.
    ///
    /// Before the renderer has measured the text this is an estimate from
    /// the glyph count.
    pub fn bounding_rect(&self) -> RectF {
        if let Some(bbox) = self.measured_bbox {
            return bbox;
        }
        self.estimated_rect()
    }

    pub(crate) fn estimated_rect(&self) -> RectF {
        let glyphs = self.text.chars().count().max(1) as f64;
        let mut width = self.font.size * 0.6 * glyphs;
        let mut height = self.font.size;
        if self.icon_name.is_some() {
            width = width.max(self.icon_width);
            height += self.icon_height;
        }
        let pad = self.frame_width.max(self.halo_radius) + self.casing_width;
        RectF::from_size(PointF::new(0.0, 0.0), width + 2.0 * pad, height + 2.0 * pad)
            .moved_center(self.pos)
    }

    pub(crate) fn set_measured_bbox(&mut self, bbox: RectF) {
        self.measured_bbox = Some(bbox);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneItemPayload {
    Polygon(PolygonItem),
    MultiPolygon(MultiPolygonItem),
    Polyline(PolylineItem),
    Label(LabelItem),
}

impl SceneItemPayload {
    pub fn render_phases(&self) -> RenderPhases {
        match self {
            SceneItemPayload::Polygon(PolygonItem {
                fill_color, pen, ..
            })
            | SceneItemPayload::MultiPolygon(MultiPolygonItem {
                fill_color, pen, ..
            }) => {
                let mut phases = RenderPhases::NONE;
                if !fill_color.is_transparent() {
                    phases = phases.union(RenderPhases::FILL);
                }
                if pen.is_visible() {
                    phases = phases.union(RenderPhases::STROKE);
                }
                phases
            }
            SceneItemPayload::Polyline(line) => {
                let mut phases = RenderPhases::NONE;
                if line.pen.is_visible() {
                    phases = phases.union(RenderPhases::STROKE);
                }
                if line.casing_pen.is_visible() {
                    phases = phases.union(RenderPhases::CASING);
                }
                phases
            }
            SceneItemPayload::Label(label) => {
                if label.text.is_empty() && label.icon_name.is_none() {
                    RenderPhases::NONE
                } else {
                    RenderPhases::LABEL
                }
            }
        }
    }

    pub fn bounding_rect(&self) -> RectF {
        match self {
            SceneItemPayload::Polygon(p) => p.bbox,
            SceneItemPayload::MultiPolygon(p) => p.bbox,
            SceneItemPayload::Polyline(p) => p.bbox,
            SceneItemPayload::Label(l) => l.bounding_rect(),
        }
    }

    /// Whether the payload's coordinates live in scene space.
    pub fn in_scene_space(&self) -> bool {
        !matches!(self, SceneItemPayload::Label(_))
    }

    /// Screen-fixed payloads: anchored in scene space, sized in screen
    /// units.
    pub fn in_hud_space(&self) -> bool {
        matches!(self, SceneItemPayload::Label(_))
    }
}

/// One entry of the scene graph.
#[derive(Clone, Debug)]
pub struct SceneGraphItem {
    /// Layer class from the rule's layer selector.
    pub layer: i32,
    /// MapCSS z-index.
    pub z: i32,
    pub element: ElementId,
    pub payload: SceneItemPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_phases_follow_visibility() {
        let fill_only = PolygonItem::new(
            vec![PointF::new(0.0, 0.0), PointF::new(1.0, 0.0), PointF::new(1.0, 1.0)],
            Color::from_rgb(255, 0, 0),
            Pen::default(),
        );
        let phases = SceneItemPayload::Polygon(fill_only).render_phases();
        assert!(phases.contains(RenderPhases::FILL));
        assert!(!phases.contains(RenderPhases::STROKE));
    }

    #[test]
    fn empty_label_has_no_phase() {
        let label = LabelItem::default();
        assert!(SceneItemPayload::Label(label).render_phases().is_empty());
    }

    #[test]
    fn label_estimate_grows_with_text() {
        let mut short = LabelItem {
            text: "a".into(),
            ..Default::default()
        };
        short.font.size = 10.0;
        let mut long = LabelItem {
            text: "a much longer label".into(),
            ..Default::default()
        };
        long.font.size = 10.0;
        assert!(long.bounding_rect().width() > short.bounding_rect().width());
    }

    #[test]
    fn labels_are_hud_space() {
        let label = SceneItemPayload::Label(LabelItem::default());
        assert!(label.in_hud_space());
        assert!(!label.in_scene_space());
    }
}
