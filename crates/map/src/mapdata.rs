//! Map data: a DataSet plus level partitioning and region metadata.

use std::collections::BTreeMap;

use osm::{BoundingBox, DataSet, Element, ElementId, for_each};

use crate::level::MapLevel;
use crate::levelparser;

/// A loaded indoor map: the owning DataSet, its bounding box, region and
/// time-zone metadata, and the level map partitioning elements into floor
/// buckets.
///
/// Elements tagged with `level` or `repeat_on` appear in the bucket of
/// every level they name; elements without such a tag span all floors and
/// are kept separately.
#[derive(Debug, Default)]
pub struct MapData {
    data_set: DataSet,
    bbox: BoundingBox,
    region_code: String,
    time_zone: String,
    level_map: BTreeMap<MapLevel, Vec<ElementId>>,
    floor_spanning: Vec<ElementId>,
}

impl MapData {
    /// Takes ownership of the DataSet and builds the level index.
    ///
    /// Way and relation bounding boxes are recomputed when the input does
    /// not carry trustworthy ones.
    pub fn from_data_set(mut data_set: DataSet) -> Self {
        if data_set.ways.iter().any(|w| !w.bbox.is_valid()) {
            data_set.recompute_bounding_boxes();
        }

        let mut data = MapData {
            data_set,
            ..Default::default()
        };
        data.process_elements();
        data.recompute_bounding_box();
        tracing::debug!(
            levels = data.level_map.len(),
            floor_spanning = data.floor_spanning.len(),
            "level index built"
        );
        data
    }

    fn process_elements(&mut self) {
        let level_key = self.data_set.tag_key("level");
        let repeat_on_key = self.data_set.tag_key("repeat_on");

        let mut level_map: BTreeMap<MapLevel, Vec<ElementId>> = BTreeMap::new();
        let mut floor_spanning = Vec::new();

        for_each(&self.data_set, |elem| {
            let mut levels: Vec<i32> = Vec::new();
            for key in [level_key, repeat_on_key] {
                if let Some(value) = elem.tag_value(key) {
                    levelparser::parse(value, elem, |level, _| levels.push(level));
                }
            }

            if levels.is_empty() {
                floor_spanning.push(ElementId::of(elem));
                return;
            }

            levels.sort_unstable();
            levels.dedup();
            for level in levels {
                level_map
                    .entry(MapLevel::new(level))
                    .or_default()
                    .push(ElementId::of(elem));
            }
        });

        self.level_map = level_map;
        self.floor_spanning = floor_spanning;
    }

    fn recompute_bounding_box(&mut self) {
        let mut bbox = BoundingBox::default();
        for node in &self.data_set.nodes {
            bbox = bbox.united(&BoundingBox::new(node.coordinate, node.coordinate));
        }
        for way in &self.data_set.ways {
            bbox = bbox.united(&way.bbox);
        }
        self.bbox = bbox;
    }

    pub fn data_set(&self) -> &DataSet {
        &self.data_set
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn is_empty(&self) -> bool {
        self.data_set.is_empty()
    }

    /// Floor buckets, ordered top floor first.
    pub fn level_map(&self) -> &BTreeMap<MapLevel, Vec<ElementId>> {
        &self.level_map
    }

    /// Elements on the given floor bucket, if it exists.
    pub fn elements_on_level(&self, level: MapLevel) -> Option<&[ElementId]> {
        self.level_map.get(&level).map(Vec::as_slice)
    }

    /// Elements visible on every floor.
    pub fn floor_spanning_elements(&self) -> &[ElementId] {
        &self.floor_spanning
    }

    /// All levels present in the level map, top floor first.
    pub fn levels(&self) -> impl Iterator<Item = MapLevel> + '_ {
        self.level_map.keys().copied()
    }

    pub fn resolve(&self, id: ElementId) -> Element<'_> {
        id.resolve(&self.data_set)
    }

    pub fn region_code(&self) -> &str {
        &self.region_code
    }

    pub fn set_region_code(&mut self, region: impl Into<String>) {
        self.region_code = region.into();
    }

    /// IANA time zone id of the mapped region.
    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    pub fn set_time_zone(&mut self, tz: impl Into<String>) {
        self.time_zone = tz.into();
    }
}
