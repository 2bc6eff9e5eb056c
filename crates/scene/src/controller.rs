//! Scene assembly: turns evaluator output into scene graph items.

use std::collections::HashSet;

use geom::polygon::is_self_intersecting;
use geom::{PointF, mercator};
use map::{MapData, MapLevel, OverlaySource};
use osm::{DataSet, Element, ElementId, ElementType, for_each};
use style::{
    Color, MapCssObjectType, MapCssResult, MapCssState, MapCssStyle, OpeningHoursCache, Property,
    ResultLayer, Unit,
};

use crate::graph::SceneGraph;
use crate::item::{
    CapStyle, FontSpec, JoinStyle, LabelItem, MultiPolygonItem, Pen, PolygonItem, PolylineItem,
    SceneGraphItem, SceneItemPayload,
};
use crate::view::View;

/// Builds a [`SceneGraph`] per floor and zoom from evaluator output.
///
/// The controller owns only scratch state; map data, style, view and the
/// scene graph are the caller's. Scene updates replace all items.
#[derive(Default)]
pub struct SceneController {
    overlay_sources: Vec<Box<dyn OverlaySource>>,
    opening_hours: OpeningHoursCache,
    hidden_scratch: Vec<ElementId>,
    layer_names: Vec<String>,
}

impl SceneController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_overlay_sources(&mut self, sources: Vec<Box<dyn OverlaySource>>) {
        self.overlay_sources = sources;
    }

    pub fn opening_hours_mut(&mut self) -> &mut OpeningHoursCache {
        &mut self.opening_hours
    }

    /// Rebuilds `sg` for the view's current floor and zoom.
    ///
    /// Per-element failures are swallowed: malformed geometry produces no
    /// item and evaluation continues with the next element.
    pub fn update_scene(
        &mut self,
        data: &MapData,
        style: &MapCssStyle,
        view: &View,
        sg: &mut SceneGraph,
    ) {
        sg.clear();

        let mut result = MapCssResult::new();

        // canvas rules supply background and foreground colors; an invalid
        // (uncompiled) style leaves the fallback background only
        let canvas_state = MapCssState {
            zoom_level: view.zoom_level(),
            floor_level: view.floor_level(),
            ..Default::default()
        };
        match style.evaluate_canvas(&canvas_state, &mut result) {
            Ok(()) => {
                if let Some(layer) = result.default_layer() {
                    if let Some(color) = layer
                        .declaration(Property::FillColor)
                        .and_then(|d| d.color_value())
                    {
                        sg.set_background_color(color);
                    }
                    if let Some(color) = layer
                        .declaration(Property::TextColor)
                        .and_then(|d| d.color_value())
                    {
                        sg.set_foreground_color(color);
                    }
                }
            }
            Err(err) => {
                tracing::warn!("scene update without usable style: {err}");
                return;
            }
        }

        self.hidden_scratch.clear();
        for source in &self.overlay_sources {
            source.hidden_elements(&mut self.hidden_scratch);
        }
        self.hidden_scratch.sort();

        let mut layer_names = std::mem::take(&mut self.layer_names);
        layer_names.clear();

        // elements on the active floor plus everything that spans all
        // floors, visited in natural OSM iteration order
        let mut on_floor: HashSet<ElementId> = HashSet::new();
        if let Some(bucket) = data.elements_on_level(MapLevel::new(view.floor_level())) {
            on_floor.extend(bucket.iter().copied());
        }
        on_floor.extend(data.floor_spanning_elements().iter().copied());

        for_each(data.data_set(), |elem| {
            let id = ElementId::of(elem);
            if !on_floor.contains(&id) {
                return;
            }
            if self.hidden_scratch.binary_search(&id).is_ok() {
                return;
            }
            process_element(
                &self.opening_hours,
                &mut layer_names,
                data.data_set(),
                elem,
                style,
                view,
                &mut result,
                sg,
            );
        });

        for source in &self.overlay_sources {
            source.for_each(view.floor_level(), &mut |overlay_data, elem, _floor| {
                process_element(
                    &self.opening_hours,
                    &mut layer_names,
                    overlay_data,
                    elem,
                    style,
                    view,
                    &mut result,
                    sg,
                );
            });
        }

        self.layer_names = layer_names;

        sg.finalize();
        tracing::debug!(
            items = sg.items().len(),
            layers = sg.layer_offsets().len(),
            floor = view.floor_level(),
            "scene graph rebuilt"
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn process_element<'s>(
    opening_hours: &OpeningHoursCache,
    layer_names: &mut Vec<String>,
    data_set: &DataSet,
    elem: Element<'_>,
    style: &'s MapCssStyle,
    view: &View,
    result: &mut MapCssResult<'s>,
    sg: &mut SceneGraph,
) {
    let mut state = MapCssState {
        element: elem,
        zoom_level: view.zoom_level(),
        floor_level: view.floor_level(),
        opening_hours: Some(opening_hours),
        ..Default::default()
    };
    style.initialize_state(&mut state);
    if style.evaluate(&state, result).is_err() {
        return;
    }

    let element_id = ElementId::of(elem);
    for layer in result.layers() {
        create_items(
            layer_names,
            data_set,
            elem,
            element_id,
            state.object_type,
            layer,
            sg,
        );
    }
}

fn create_items(
    layer_names: &mut Vec<String>,
    data_set: &DataSet,
    elem: Element<'_>,
    element_id: ElementId,
    object_type: MapCssObjectType,
    layer: &ResultLayer<'_>,
    sg: &mut SceneGraph,
) {
    let layer_class = layer_class(layer_names, layer.layer_name());
    let z = layer
        .declaration(Property::ZIndex)
        .and_then(|d| d.int_value())
        .unwrap_or(0);

    if layer.has_area_properties()
        && object_type == MapCssObjectType::Area
        && let Some(payload) = area_payload(data_set, elem, layer)
    {
        sg.add_item(SceneGraphItem {
            layer: layer_class,
            z,
            element: element_id,
            payload,
        });
    }

    if layer.has_line_properties() && object_type == MapCssObjectType::Line {
        let loops = scene_loops(data_set, elem);
        if let Some(path) = loops.into_iter().next()
            && path.len() >= 2
        {
            let payload = SceneItemPayload::Polyline(PolylineItem::new(
                path,
                stroke_pen(layer),
                casing_pen(layer),
            ));
            if !payload.render_phases().is_empty() {
                sg.add_item(SceneGraphItem {
                    layer: layer_class,
                    z,
                    element: element_id,
                    payload,
                });
            }
        }
    }

    if layer.has_label_properties()
        && let Some(label) = label_item(data_set, elem, layer)
    {
        sg.add_item(SceneGraphItem {
            layer: layer_class,
            z,
            element: element_id,
            payload: SceneItemPayload::Label(label),
        });
    }
}

fn area_payload(
    data_set: &DataSet,
    elem: Element<'_>,
    layer: &ResultLayer<'_>,
) -> Option<SceneItemPayload> {
    let fill = fill_color(layer);
    let pen = stroke_pen(layer);

    let mut rings = scene_loops(data_set, elem);
    rings.retain(|r| r.len() >= 3);
    if rings.is_empty() {
        return None;
    }

    // multipolygon relations bring inner rings as holes
    if let Element::Relation(rel) = elem {
        for member in &rel.members {
            if member.role != "inner" || member.member_type != ElementType::Way {
                continue;
            }
            if let Some(way) = data_set.way(member.id) {
                let inner = scene_loops(data_set, Element::Way(way));
                rings.extend(inner.into_iter().filter(|r| r.len() >= 3));
            }
        }
        return Some(SceneItemPayload::MultiPolygon(MultiPolygonItem::new(
            rings, fill, pen,
        )));
    }

    // closed ways: even-odd rendering when the outline needs it
    if rings.len() > 1 || is_self_intersecting(&rings[0]) {
        return Some(SceneItemPayload::MultiPolygon(MultiPolygonItem::new(
            rings, fill, pen,
        )));
    }
    Some(SceneItemPayload::Polygon(PolygonItem::new(
        rings.into_iter().next().unwrap(),
        fill,
        pen,
    )))
}

/// Layer class for a rule layer selector: the default layer is 0, named
/// layers get ascending classes in first-encounter order.
fn layer_class(layer_names: &mut Vec<String>, layer_name: Option<&str>) -> i32 {
    let Some(name) = layer_name else {
        return 0;
    };
    if let Some(idx) = layer_names.iter().position(|n| n == name) {
        return idx as i32 + 1;
    }
    layer_names.push(name.to_string());
    layer_names.len() as i32
}

/// Projects the element's outer path into scene space, splitting it into
/// its closed sub-loops: the path revisiting its starting node begins a
/// new loop.
fn scene_loops(data_set: &DataSet, elem: Element<'_>) -> Vec<Vec<PointF>> {
    let path = elem.outer_path(data_set);
    let mut loops = Vec::new();
    let mut current: Vec<PointF> = Vec::new();
    let mut loop_start = None;

    for node in path {
        current.push(mercator::geo_to_scene(
            node.coordinate.lat_f64(),
            node.coordinate.lon_f64(),
        ));
        match loop_start {
            None => loop_start = Some(node.id),
            Some(start) if node.id == start && current.len() > 2 => {
                loops.push(std::mem::take(&mut current));
                loop_start = None;
            }
            Some(_) => {}
        }
    }
    if !current.is_empty() {
        loops.push(current);
    }
    loops
}

fn fill_color(layer: &ResultLayer<'_>) -> Color {
    let Some(color) = layer
        .declaration(Property::FillColor)
        .and_then(|d| d.color_value())
    else {
        return Color::TRANSPARENT;
    };
    match layer
        .declaration(Property::FillOpacity)
        .and_then(|d| d.double_value())
    {
        Some(opacity) => color.with_alpha_f(color.alpha_f() * opacity as f32),
        None => color,
    }
}

fn stroke_pen(layer: &ResultLayer<'_>) -> Pen {
    let mut pen = Pen {
        color: layer
            .declaration(Property::Color)
            .and_then(|d| d.color_value())
            .unwrap_or(Color::TRANSPARENT),
        ..Default::default()
    };
    if let Some(decl) = layer.declaration(Property::Width) {
        pen.width = decl.double_value().unwrap_or(0.0);
        pen.width_unit = match decl.unit() {
            Unit::NoUnit => Unit::Meters,
            unit => unit,
        };
    }
    if let Some(opacity) = layer
        .declaration(Property::Opacity)
        .and_then(|d| d.double_value())
    {
        pen.color = pen.color.with_alpha_f(pen.color.alpha_f() * opacity as f32);
    }
    if let Some(dashes) = layer
        .declaration(Property::Dashes)
        .and_then(|d| d.dashes_value())
    {
        pen.dashes = dashes.to_vec();
    }
    pen.cap = cap_style(layer, Property::LineCap);
    pen.join = join_style(layer, Property::LineJoin);
    pen
}

fn casing_pen(layer: &ResultLayer<'_>) -> Pen {
    let mut pen = Pen {
        color: layer
            .declaration(Property::CasingColor)
            .and_then(|d| d.color_value())
            .unwrap_or(Color::TRANSPARENT),
        ..Default::default()
    };
    if let Some(decl) = layer.declaration(Property::CasingWidth) {
        pen.width = decl.double_value().unwrap_or(0.0);
        pen.width_unit = match decl.unit() {
            Unit::NoUnit => Unit::Pixels,
            unit => unit,
        };
    }
    if let Some(opacity) = layer
        .declaration(Property::CasingOpacity)
        .and_then(|d| d.double_value())
    {
        pen.color = pen.color.with_alpha_f(pen.color.alpha_f() * opacity as f32);
    }
    if let Some(dashes) = layer
        .declaration(Property::CasingDashes)
        .and_then(|d| d.dashes_value())
    {
        pen.dashes = dashes.to_vec();
    }
    pen
}

fn cap_style(layer: &ResultLayer<'_>, property: Property) -> CapStyle {
    match layer.declaration(property).and_then(|d| d.ident_value()) {
        Some("round") => CapStyle::Round,
        Some("square") => CapStyle::Square,
        _ => CapStyle::Flat,
    }
}

fn join_style(layer: &ResultLayer<'_>, property: Property) -> JoinStyle {
    match layer.declaration(property).and_then(|d| d.ident_value()) {
        Some("miter") => JoinStyle::Miter,
        Some("bevel") => JoinStyle::Bevel,
        _ => JoinStyle::Round,
    }
}

fn label_item(
    data_set: &DataSet,
    elem: Element<'_>,
    layer: &ResultLayer<'_>,
) -> Option<LabelItem> {
    let text = layer.declaration(Property::Text).and_then(|decl| {
        decl.string_value().map(str::to_string).or_else(|| {
            decl.ident_value()
                .and_then(|key| elem.tag_value_by_name(data_set, key))
                .map(str::to_string)
        })
    });
    let text = text.map(|t| {
        match layer
            .declaration(Property::TextTransform)
            .and_then(|d| d.ident_value())
        {
            Some("uppercase") => t.to_uppercase(),
            Some("lowercase") => t.to_lowercase(),
            _ => t,
        }
    });

    let icon_name = layer
        .declaration(Property::IconImage)
        .and_then(|d| d.ident_value().or(d.string_value()))
        .map(str::to_string);

    if text.as_deref().unwrap_or("").is_empty() && icon_name.is_none() {
        return None;
    }

    let center = elem.center();
    if !center.is_valid() {
        return None;
    }

    let number = |p: Property| layer.declaration(p).and_then(|d| d.double_value());
    let color = |p: Property| layer.declaration(p).and_then(|d| d.color_value());

    let mut label = LabelItem {
        pos: mercator::geo_to_scene(center.lat_f64(), center.lon_f64()),
        text: text.unwrap_or_default(),
        color: color(Property::TextColor).unwrap_or(Color::BLACK),
        halo_color: color(Property::TextHaloColor).unwrap_or(Color::TRANSPARENT),
        halo_radius: number(Property::TextHaloRadius).unwrap_or(0.0),
        icon_name,
        icon_width: number(Property::IconWidth).unwrap_or(16.0),
        icon_height: number(Property::IconHeight).unwrap_or(16.0),
        offset: number(Property::TextOffset).unwrap_or(0.0),
        max_width: number(Property::MaxWidth).unwrap_or(0.0),
        frame_color: color(Property::ShieldFrameColor).unwrap_or(Color::TRANSPARENT),
        frame_width: number(Property::ShieldFrameWidth).unwrap_or(0.0),
        casing_color: color(Property::ShieldCasingColor).unwrap_or(Color::TRANSPARENT),
        casing_width: number(Property::ShieldCasingWidth).unwrap_or(0.0),
        shield_color: color(Property::ShieldColor).unwrap_or(Color::TRANSPARENT),
        ..Default::default()
    };
    if let Some(opacity) = number(Property::TextOpacity) {
        label.color = label
            .color
            .with_alpha_f(label.color.alpha_f() * opacity as f32);
    }

    label.font = FontSpec {
        family: layer
            .declaration(Property::FontFamily)
            .and_then(|d| d.ident_value().or(d.string_value()))
            .unwrap_or("sans-serif")
            .to_string(),
        size: number(Property::FontSize).unwrap_or(10.0),
        bold: layer
            .declaration(Property::FontWeight)
            .and_then(|d| d.ident_value())
            == Some("bold"),
        italic: layer
            .declaration(Property::FontStyle)
            .and_then(|d| d.ident_value())
            == Some("italic"),
    };
    Some(label)
}
