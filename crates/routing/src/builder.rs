//! Navmesh construction: walks every floor, evaluates the filter style and
//! emits triangle soup plus off-mesh connections for the voxel solver.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use map::{MapData, OverlaySource, levelparser};
use osm::{DataSet, Element, ElementId, Id};
use style::{MapCssResult, MapCssState, MapCssStyle, Property, ResultLayer};

use crate::area::AreaType;
use crate::debugio;
use crate::filter;
use crate::pipeline::{NavMesh, NavMeshStageError, VoxelPipeline};
use crate::settings::NavMeshSettings;
use crate::soup::{LinkDirection, OffMeshConnections, TriangleSoup};
use crate::stroke::stroke_polyline;
use crate::transform::NavMeshTransform;

/// Node level conflicting across ways.
const AMBIGUOUS_LEVEL: i32 = i32::MIN;

/// Everything the worker-side solver consumes. Ownership moves into the
/// worker for the duration of the solve.
#[derive(Debug, Default)]
pub struct NavMeshBuildInput {
    pub soup: TriangleSoup,
    pub connections: OffMeshConnections,
    pub settings: NavMeshSettings,
    pub transform: NavMeshTransform,
}

/// Builds the navmesh input on the calling thread, then hands it to a
/// worker running the voxel pipeline.
///
/// The main-thread half must complete before the worker starts because
/// the OSM data model is not shared-mutable; `start` enforces that by
/// sequencing.
pub struct NavMeshBuilder {
    style: MapCssStyle,
    settings: NavMeshSettings,
    transform: NavMeshTransform,
    node_levels: HashMap<Id, i32>,
    soup: TriangleSoup,
    connections: OffMeshConnections,
    gset_path: Option<PathBuf>,
    obj_path: Option<PathBuf>,
}

impl Default for NavMeshBuilder {
    fn default() -> Self {
        NavMeshBuilder::with_style(filter::navmesh_filter_style())
    }
}

impl NavMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom filter style instead of the built-in one.
    pub fn with_style(style: MapCssStyle) -> Self {
        NavMeshBuilder {
            style,
            settings: NavMeshSettings::default(),
            transform: NavMeshTransform::default(),
            node_levels: HashMap::new(),
            soup: TriangleSoup::default(),
            connections: OffMeshConnections::default(),
            gset_path: None,
            obj_path: None,
        }
    }

    pub fn set_settings(&mut self, settings: NavMeshSettings) {
        self.settings = settings;
    }

    /// Enables `.gset`/`.obj` debug output of the prepared input.
    pub fn write_debug_navmesh(&mut self, gset: impl Into<PathBuf>, obj: impl Into<PathBuf>) {
        self.gset_path = Some(gset.into());
        self.obj_path = Some(obj.into());
    }

    /// The main-thread half: evaluates the filter style for every element
    /// on every floor and fills the triangle/link buffers.
    pub fn prepare(
        &mut self,
        data: &MapData,
        overlays: &[&dyn OverlaySource],
    ) -> NavMeshBuildInput {
        self.transform = NavMeshTransform::new(data.bounding_box());
        self.style.compile(data.data_set());
        self.index_node_levels(data);

        let mut hidden: Vec<ElementId> = Vec::new();
        for overlay in overlays {
            overlay.hidden_elements(&mut hidden);
        }
        hidden.sort();

        let style = &self.style;
        let mut result = MapCssResult::new();
        let mut ctx = BuildContext {
            transform: self.transform,
            node_levels: &self.node_levels,
            soup: &mut self.soup,
            connections: &mut self.connections,
        };

        for (level, elements) in data.level_map() {
            let floor = level.numeric_level();
            for id in elements {
                if hidden.binary_search(id).is_ok() {
                    continue;
                }
                let elem = data.resolve(*id);
                ctx.process_element(data.data_set(), elem, floor, style, &mut result);
            }

            if !level.is_full_level() {
                continue;
            }
            for overlay in overlays {
                overlay.for_each(floor, &mut |overlay_data, elem, elem_floor| {
                    ctx.process_element(overlay_data, elem, elem_floor, style, &mut result);
                });
            }
        }
        // elements without level tags live on the ground floor
        for id in data.floor_spanning_elements() {
            if hidden.binary_search(id).is_ok() {
                continue;
            }
            let elem = data.resolve(*id);
            ctx.process_element(data.data_set(), elem, 0, style, &mut result);
        }

        tracing::debug!(
            vertex_bytes = self.soup.vertices.len() * size_of::<f32>(),
            triangle_bytes = self.soup.triangles.len() * size_of::<i32>(),
            area_bytes = self.soup.triangle_area_ids.len(),
            off_mesh = self.connections.count(),
            "navmesh input prepared"
        );

        self.write_debug_files(data);

        NavMeshBuildInput {
            soup: std::mem::take(&mut self.soup),
            connections: std::mem::take(&mut self.connections),
            settings: self.settings,
            transform: self.transform,
        }
    }

    /// Runs `prepare` here, then the pipeline on a worker thread. The
    /// returned job completes exactly once, with the navmesh or the first
    /// failed stage.
    pub fn start<P: VoxelPipeline>(
        mut self,
        data: &MapData,
        overlays: &[&dyn OverlaySource],
        mut pipeline: P,
    ) -> NavMeshJob<P::Output> {
        let input = self.prepare(data, overlays);
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let result = match pipeline.build(&input) {
                Ok(output) => Ok(NavMesh {
                    transform: input.transform,
                    data: output,
                }),
                Err(err) => {
                    tracing::warn!("{err}, discarding partial navmesh");
                    Err(err)
                }
            };
            // the originator may have gone away; the result is discarded then
            let _ = tx.send(result);
        });
        NavMeshJob {
            handle: Some(handle),
            rx,
        }
    }

    /// Level lookup index: nodes referenced by single-level ways on
    /// non-zero full levels. Conflicting observations poison the node.
    fn index_node_levels(&mut self, data: &MapData) {
        self.node_levels.clear();
        for (level, elements) in data.level_map() {
            if level.numeric_level() == 0 || !level.is_full_level() {
                continue;
            }
            for id in elements {
                let Element::Way(way) = data.resolve(*id) else {
                    continue;
                };
                // multi-level ways say nothing about individual nodes
                let Some(tag) =
                    Element::Way(way).tag_value_by_name(data.data_set(), "level")
                else {
                    continue;
                };
                if tag.contains(';') {
                    continue;
                }
                for node_id in &way.nodes {
                    self.add_node_to_level_index(*node_id, level.numeric_level());
                }
            }
        }
    }

    fn add_node_to_level_index(&mut self, node_id: Id, level: i32) {
        match self.node_levels.get_mut(&node_id) {
            None => {
                self.node_levels.insert(node_id, level);
            }
            Some(existing) if *existing != level => *existing = AMBIGUOUS_LEVEL,
            Some(_) => {}
        }
    }

    fn write_debug_files(&self, data: &MapData) {
        let (Some(gset_path), Some(obj_path)) = (&self.gset_path, &self.obj_path) else {
            return;
        };

        let highest = data.levels().next().map(|l| l.numeric_level()).unwrap_or(0);
        let lowest = data.levels().last().map(|l| l.numeric_level()).unwrap_or(0);
        let bbox = data.bounding_box();
        let obj_name = obj_path.to_string_lossy().into_owned();

        if let Err(err) = debugio::write_obj(obj_path, &self.soup) {
            tracing::warn!("failed to write navmesh obj: {err}");
            return;
        }
        if let Err(err) = debugio::write_gset(
            gset_path,
            &obj_name,
            &self.settings,
            self.transform.map_geo_to_nav(bbox.min),
            self.transform.map_geo_to_nav(bbox.max),
            lowest,
            highest,
            &self.connections,
        ) {
            tracing::warn!("failed to write navmesh gset: {err}");
        }
    }
}

/// Handle to a running navmesh build; completion is signaled through the
/// channel the originator polls or blocks on.
pub struct NavMeshJob<T> {
    handle: Option<thread::JoinHandle<()>>,
    rx: mpsc::Receiver<Result<NavMesh<T>, NavMeshStageError>>,
}

impl<T> NavMeshJob<T> {
    /// Blocks until the worker is done.
    pub fn wait(mut self) -> Result<NavMesh<T>, NavMeshStageError> {
        let result = self
            .rx
            .recv()
            .map_err(|_| NavMeshStageError::new("worker"))?;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        result
    }

    /// Non-blocking completion check.
    pub fn try_finished(&mut self) -> Option<Result<NavMesh<T>, NavMeshStageError>> {
        match self.rx.try_recv() {
            Ok(result) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                Some(result)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                Some(Err(NavMeshStageError::new("worker")))
            }
        }
    }
}

/// Mutable build state shared by the per-element processing steps.
struct BuildContext<'a> {
    transform: NavMeshTransform,
    node_levels: &'a HashMap<Id, i32>,
    soup: &'a mut TriangleSoup,
    connections: &'a mut OffMeshConnections,
}

impl BuildContext<'_> {
    fn process_element<'s>(
        &mut self,
        data_set: &DataSet,
        elem: Element<'_>,
        floor: i32,
        style: &'s MapCssStyle,
        result: &mut MapCssResult<'s>,
    ) {
        let mut state = MapCssState {
            element: elem,
            floor_level: floor,
            zoom_level: 20.0, // filter styles are zoom-independent
            ..Default::default()
        };
        style.initialize_state(&mut state);
        if style.evaluate(&state, result).is_err() {
            return;
        }

        for layer_idx in 0..result.layers().len() {
            let layer = &result.layers()[layer_idx];
            match layer.layer_name() {
                None => self.process_geometry(data_set, elem, floor, layer),
                Some(name) => {
                    let direction = match name {
                        "link_forward" => LinkDirection::Forward,
                        "link_backward" => LinkDirection::Backward,
                        _ => LinkDirection::Bidirectional,
                    };
                    self.process_link(data_set, elem, direction, layer);
                }
            }
        }
    }

    fn process_geometry(
        &mut self,
        data_set: &DataSet,
        elem: Element<'_>,
        floor: i32,
        res: &ResultLayer<'_>,
    ) {
        if res.has_area_properties() {
            let opacity = res
                .declaration(Property::FillOpacity)
                .and_then(|d| d.double_value())
                .unwrap_or(0.0);
            if opacity > 0.0 {
                self.emit_area(data_set, elem, floor);
            }
        }

        if res.has_line_properties() {
            let width = res
                .declaration(Property::Width)
                .and_then(|d| d.double_value())
                .unwrap_or(0.0);
            if width > 0.0 {
                self.emit_stroke(data_set, elem, floor, width);
            }
        }

        if res.has_extrude_properties() {
            let extrude = res
                .declaration(Property::Extrude)
                .and_then(|d| d.double_value())
                .unwrap_or(0.0);
            if extrude > 0.0 {
                self.emit_walls(data_set, elem, floor);
            }
        }
    }

    fn emit_area(&mut self, data_set: &DataSet, elem: Element<'_>, floor: i32) {
        let (outers, holes) = nav_rings(data_set, elem, &self.transform);
        let y = self.transform.map_height_to_nav(floor);

        for outer in &outers {
            // holes belong to the loop that contains them
            let loop_holes: Vec<&Vec<[f64; 2]>> = holes
                .iter()
                .filter(|h| {
                    h.first()
                        .is_some_and(|p| point_in_ring(outer, *p))
                })
                .collect();

            let mut coords: Vec<f64> = Vec::new();
            let mut hole_indices: Vec<usize> = Vec::new();
            for p in outer {
                coords.push(p[0]);
                coords.push(p[1]);
            }
            for hole in &loop_holes {
                hole_indices.push(coords.len() / 2);
                for p in *hole {
                    coords.push(p[0]);
                    coords.push(p[1]);
                }
            }

            let Ok(indices) = earcutr::earcut(&coords, &hole_indices, 2) else {
                continue;
            };
            if indices.is_empty() {
                continue;
            }

            let offset = self.soup.vertex_count();
            for chunk in coords.chunks_exact(2) {
                self.soup.add_vertex(chunk[0] as f32, y, chunk[1] as f32);
            }
            for tri in indices.chunks_exact(3) {
                self.soup.add_face(
                    offset + tri[0],
                    offset + tri[1],
                    offset + tri[2],
                    AreaType::Walkable,
                );
            }
        }
    }

    fn emit_stroke(&mut self, data_set: &DataSet, elem: Element<'_>, floor: i32, width: f64) {
        let path = elem.outer_path(data_set);
        if path.len() < 2 {
            return;
        }
        let points: Vec<[f64; 2]> = path
            .iter()
            .map(|n| {
                let (x, z) = self.transform.map_geo_to_nav(n.coordinate);
                [x as f64, z as f64]
            })
            .collect();

        let strip = stroke_polyline(&points, width);
        if strip.len() < 4 {
            return;
        }

        // stair and ramp segments connect two levels; their stroke follows
        // the slope
        let mut level_span: Option<(i32, i32)> = None;
        if points.len() == 2
            && let Element::Way(way) = elem
        {
            let l1 = self.level_for_node(way.nodes[0]);
            let l2 = self.level_for_node(way.nodes[1]);
            if l1 != l2 && l1 != AMBIGUOUS_LEVEL && l2 != AMBIGUOUS_LEVEL {
                level_span = Some((l1, l2));
            }
        }

        let offset = self.soup.vertex_count();
        for v in &strip {
            let y = match level_span {
                None => self.transform.map_height_to_nav(floor),
                Some((l1, l2)) => {
                    let d1 = dist(*v, points[0]);
                    let d2 = dist(*v, points[1]);
                    let t = if d1 + d2 > 0.0 { d1 / (d1 + d2) } else { 0.0 };
                    let y1 = self.transform.map_height_to_nav(l1);
                    let y2 = self.transform.map_height_to_nav(l2);
                    y1 + (y2 - y1) * t as f32
                }
            };
            self.soup.add_vertex(v[0] as f32, y, v[1] as f32);
        }

        // triangle strip winding
        let point_count = strip.len();
        for i in 0..point_count.saturating_sub(2) {
            if i % 2 == 1 {
                self.soup
                    .add_face(offset + i, offset + i + 1, offset + i + 2, AreaType::Walkable);
            } else {
                self.soup
                    .add_face(offset + i + 1, offset + i, offset + i + 2, AreaType::Walkable);
            }
        }
    }

    /// Two quads per outline segment from this floor to the one above;
    /// segments next to a door node stay open.
    fn emit_walls(&mut self, data_set: &DataSet, elem: Element<'_>, floor: i32) {
        let path = elem.outer_path(data_set);
        if path.len() < 2 {
            return;
        }
        let y_low = self.transform.map_height_to_nav(floor);
        let y_high = self.transform.map_height_to_nav(floor + 10);

        for pair in path.windows(2) {
            if is_door(data_set, pair[0]) || is_door(data_set, pair[1]) {
                continue;
            }
            let (x1, z1) = self.transform.map_geo_to_nav(pair[0].coordinate);
            let (x2, z2) = self.transform.map_geo_to_nav(pair[1].coordinate);

            let offset = self.soup.vertex_count();
            self.soup.add_vertex(x1, y_low, z1);
            self.soup.add_vertex(x2, y_low, z2);
            self.soup.add_vertex(x1, y_high, z1);
            self.soup.add_vertex(x2, y_high, z2);
            self.soup
                .add_face(offset, offset + 1, offset + 2, AreaType::Unwalkable);
            self.soup
                .add_face(offset + 1, offset + 3, offset + 2, AreaType::Unwalkable);
        }
    }

    fn process_link(
        &mut self,
        data_set: &DataSet,
        elem: Element<'_>,
        direction: LinkDirection,
        res: &ResultLayer<'_>,
    ) {
        if res.has_area_properties() {
            let mut levels: Vec<i32> = Vec::new();
            if let Some(tag) = elem.tag_value_by_name(data_set, "level") {
                levelparser::parse(tag, elem, |level, _| levels.push(level));
            }
            if levels.len() > 1 {
                // the centroid can fall outside concave outlines; see the
                // open questions in DESIGN.md
                let (x, z) = self.transform.map_geo_to_nav(elem.center());
                for pair in levels.windows(2) {
                    self.connections.add(
                        [x, self.transform.map_height_to_nav(pair[0]), z],
                        [x, self.transform.map_height_to_nav(pair[1]), z],
                        LinkDirection::Bidirectional,
                        AreaType::Elevator,
                    );
                }
            }
        }

        if res.has_line_properties()
            && let Element::Way(way) = elem
            && way.nodes.len() == 2
        {
            let l1 = self.level_for_node(way.nodes[0]);
            let l2 = self.level_for_node(way.nodes[1]);
            if l1 == l2 || l1 == AMBIGUOUS_LEVEL || l2 == AMBIGUOUS_LEVEL {
                return;
            }
            let path = elem.outer_path(data_set);
            if path.len() < 2 {
                return;
            }
            let (x1, z1) = self.transform.map_geo_to_nav(path[0].coordinate);
            let (x2, z2) = self.transform.map_geo_to_nav(path[1].coordinate);
            self.connections.add(
                [x1, self.transform.map_height_to_nav(l1), z1],
                [x2, self.transform.map_height_to_nav(l2), z2],
                direction,
                AreaType::Escalator,
            );
        }
    }

    fn level_for_node(&self, node_id: Id) -> i32 {
        self.node_levels.get(&node_id).copied().unwrap_or(0)
    }
}

fn is_door(data_set: &DataSet, node: &osm::Node) -> bool {
    Element::Node(node)
        .tag_value_by_name(data_set, "door")
        .is_some_and(|v| !v.is_empty())
}

/// Outer loops and inner hole rings of the element in nav coordinates.
fn nav_rings(
    data_set: &DataSet,
    elem: Element<'_>,
    transform: &NavMeshTransform,
) -> (Vec<Vec<[f64; 2]>>, Vec<Vec<[f64; 2]>>) {
    let path = elem.outer_path(data_set);
    let mut outers: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    let mut loop_start = None;

    for node in &path {
        let (x, z) = transform.map_geo_to_nav(node.coordinate);
        current.push([x as f64, z as f64]);
        match loop_start {
            None => loop_start = Some(node.id),
            Some(start) if node.id == start && current.len() > 2 => {
                current.pop(); // the triangulator wants open rings
                outers.push(std::mem::take(&mut current));
                loop_start = None;
            }
            Some(_) => {}
        }
    }
    if current.len() > 2 {
        outers.push(current);
    }

    let mut holes: Vec<Vec<[f64; 2]>> = Vec::new();
    if let Element::Relation(rel) = elem {
        for member in &rel.members {
            if member.role != "inner" || member.member_type != osm::ElementType::Way {
                continue;
            }
            let Some(way) = data_set.way(member.id) else {
                continue;
            };
            let mut ring: Vec<[f64; 2]> = Element::Way(way)
                .outer_path(data_set)
                .iter()
                .map(|n| {
                    let (x, z) = transform.map_geo_to_nav(n.coordinate);
                    [x as f64, z as f64]
                })
                .collect();
            if ring.len() > 2 && ring.first() == ring.last() {
                ring.pop();
            }
            if ring.len() > 2 {
                holes.push(ring);
            }
        }
    }

    (outers, holes)
}

fn point_in_ring(ring: &[[f64; 2]], p: [f64; 2]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if ((a[1] > p[1]) != (b[1] > p[1]))
            && p[0] < (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0]
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NullPipeline;
    use crate::transform::STORY_HEIGHT;
    use osm::{Coordinate, Node, Tag, Way};

    fn add_node(data: &mut DataSet, id: Id, lat: f64, lon: f64, tags: Vec<Tag>) {
        data.add_node(Node {
            id,
            coordinate: Coordinate::from_degrees(lat, lon),
            tags,
        });
    }

    fn room_and_stairs_data() -> MapData {
        let mut data = DataSet::new();
        let indoor = data.make_tag_key("indoor");
        let level = data.make_tag_key("level");
        let highway = data.make_tag_key("highway");

        // ground floor room
        for (id, lat, lon) in [
            (1, 52.0, 13.0),
            (2, 52.0, 13.0002),
            (3, 52.0002, 13.0002),
            (4, 52.0002, 13.0),
        ] {
            add_node(&mut data, id, lat, lon, Vec::new());
        }
        data.add_way(Way {
            id: 10,
            nodes: vec![1, 2, 3, 4, 1],
            tags: vec![
                Tag {
                    key: indoor,
                    value: "room".into(),
                },
                Tag {
                    key: level,
                    value: "0".into(),
                },
            ],
            ..Default::default()
        });

        // stair way between two nodes pinned to levels 0 and 1 via
        // per-level corridors
        add_node(&mut data, 5, 52.0004, 13.0, Vec::new());
        add_node(&mut data, 6, 52.0006, 13.0, Vec::new());
        data.add_way(Way {
            id: 11,
            nodes: vec![5, 6],
            tags: vec![
                Tag {
                    key: highway,
                    value: "steps".into(),
                },
                Tag {
                    key: level,
                    value: "0;1".into(),
                },
            ],
            ..Default::default()
        });
        // corridors pinning the stair endpoints (single-level ways)
        add_node(&mut data, 7, 52.0006, 13.0001, Vec::new());
        data.add_way(Way {
            id: 12,
            nodes: vec![6, 7],
            tags: vec![
                Tag {
                    key: highway,
                    value: "footway".into(),
                },
                Tag {
                    key: level,
                    value: "1".into(),
                },
            ],
            ..Default::default()
        });

        MapData::from_data_set(data)
    }

    #[test]
    fn room_triangles_land_on_their_floor() {
        let data = room_and_stairs_data();
        let mut builder = NavMeshBuilder::new();
        let input = builder.prepare(&data, &[]);

        assert!(input.soup.triangle_count() > 0);
        // at least the room fan lies exactly on y = 0
        let ground_verts = input
            .soup
            .vertices
            .chunks_exact(3)
            .filter(|v| v[1] == 0.0)
            .count();
        assert!(ground_verts >= 4);
    }

    #[test]
    fn stair_stroke_interpolates_between_levels() {
        let data = room_and_stairs_data();
        let mut builder = NavMeshBuilder::new();
        let input = builder.prepare(&data, &[]);

        let y_top = STORY_HEIGHT as f32;
        let mut found_low = false;
        let mut found_high = false;
        for v in input.soup.vertices.chunks_exact(3) {
            if (v[1] - 0.0).abs() < 0.15 {
                found_low = true;
            }
            if (v[1] - y_top).abs() < 0.15 {
                found_high = true;
            }
            assert!(
                v[1] >= -0.01 && v[1] <= y_top + 0.01 || v[1] == 0.0,
                "vertex height out of range: {}",
                v[1]
            );
        }
        assert!(found_low && found_high, "stroke must span both levels");
    }

    #[test]
    fn door_segments_leave_wall_gaps() {
        let mut data = DataSet::new();
        let indoor = data.make_tag_key("indoor");
        let level = data.make_tag_key("level");
        let door = data.make_tag_key("door");

        add_node(&mut data, 1, 52.0, 13.0, Vec::new());
        add_node(
            &mut data,
            2,
            52.0,
            13.0002,
            vec![Tag {
                key: door,
                value: "yes".into(),
            }],
        );
        add_node(&mut data, 3, 52.0002, 13.0002, Vec::new());
        add_node(&mut data, 4, 52.0002, 13.0, Vec::new());
        data.add_way(Way {
            id: 10,
            nodes: vec![1, 2, 3, 4, 1],
            tags: vec![
                Tag {
                    key: indoor,
                    value: "wall".into(),
                },
                Tag {
                    key: level,
                    value: "0".into(),
                },
            ],
            ..Default::default()
        });
        let map_data = MapData::from_data_set(data);

        let mut builder = NavMeshBuilder::new();
        let input = builder.prepare(&map_data, &[]);

        // 4 segments, 2 touch the door node: 2 walls * 2 quads-triangles
        let wall_triangles = input
            .soup
            .triangle_area_ids
            .iter()
            .filter(|a| **a == AreaType::Unwalkable.id())
            .count();
        assert_eq!(wall_triangles, 4);
    }

    #[test]
    fn elevator_area_links_consecutive_levels() {
        let mut data = DataSet::new();
        let highway = data.make_tag_key("highway");
        let level = data.make_tag_key("level");

        for (id, lat, lon) in [
            (1, 52.0, 13.0),
            (2, 52.0, 13.00005),
            (3, 52.00005, 13.00005),
            (4, 52.00005, 13.0),
        ] {
            add_node(&mut data, id, lat, lon, Vec::new());
        }
        data.add_way(Way {
            id: 10,
            nodes: vec![1, 2, 3, 4, 1],
            tags: vec![
                Tag {
                    key: highway,
                    value: "elevator".into(),
                },
                Tag {
                    key: level,
                    value: "-1;0;1;2".into(),
                },
            ],
            ..Default::default()
        });
        let map_data = MapData::from_data_set(data);

        let mut builder = NavMeshBuilder::new();
        let input = builder.prepare(&map_data, &[]);

        // -1->0, 0->1, 1->2, each counted once even though the way sits in
        // four level buckets... the filter evaluates it once per bucket
        assert_eq!(input.connections.count() % 3, 0);
        assert!(input.connections.count() >= 3);
        assert!(
            input
                .connections
                .areas
                .iter()
                .all(|a| *a == AreaType::Elevator.id())
        );
        assert!(input.connections.directions.iter().all(|d| *d == 1));
    }

    #[test]
    fn job_completes_with_null_pipeline() {
        let data = room_and_stairs_data();
        let builder = NavMeshBuilder::new();
        let job = builder.start(&data, &[], NullPipeline);
        let mesh = job.wait().unwrap();
        assert!(mesh.data.triangle_count > 0);
    }
}
