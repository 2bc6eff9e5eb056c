//! Floor-level UI models: the ordered level list and the per-element
//! level-change choices.

use osm::{DataSet, Element};

use crate::level::MapLevel;
use crate::levelparser;
use crate::mapdata::MapData;

/// The ordered list of full levels of the active map, top floor first.
#[derive(Debug, Default)]
pub struct FloorLevelModel {
    levels: Vec<MapLevel>,
}

impl FloorLevelModel {
    pub fn from_map_data(data: &MapData) -> Self {
        let mut levels: Vec<MapLevel> =
            data.levels().filter(|l| l.is_full_level()).collect();
        if !levels.contains(&MapLevel::GROUND) {
            levels.push(MapLevel::GROUND);
        }
        levels.sort();
        FloorLevelModel { levels }
    }

    pub fn levels(&self) -> &[MapLevel] {
        &self.levels
    }

    /// Row of the given numeric level; `None` for levels not in the map,
    /// which callers treat as a no-op.
    pub fn row_for_level(&self, numeric_level: i32) -> Option<usize> {
        self.levels
            .iter()
            .position(|l| l.numeric_level() == numeric_level)
    }

    pub fn contains(&self, numeric_level: i32) -> bool {
        self.row_for_level(numeric_level).is_some()
    }
}

/// What kind of level-change element the model currently describes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LevelChangeCategory {
    #[default]
    Unknown,
    Elevator,
    Staircase,
}

/// Levels reachable through a level-change element (elevator, stairwell,
/// staircase), combined from building-level ranges and per-element level
/// lists, de-duplicated and sorted.
#[derive(Debug, Default)]
pub struct FloorLevelChangeModel {
    current_floor_level: i32,
    levels: Vec<MapLevel>,
    category: LevelChangeCategory,
}

impl FloorLevelChangeModel {
    pub fn set_current_floor_level(&mut self, level: i32) {
        self.current_floor_level = level;
    }

    pub fn current_floor_level(&self) -> i32 {
        self.current_floor_level
    }

    /// Recomputes the reachable level set for `element`.
    ///
    /// When a floor model is given, only levels present in the map are
    /// offered; otherwise every parsed level is.
    pub fn set_element(
        &mut self,
        data_set: &DataSet,
        element: Element<'_>,
        floor_model: Option<&FloorLevelModel>,
    ) {
        self.levels.clear();
        self.category = classify(data_set, element);

        if !is_level_change_element(data_set, element) {
            return;
        }

        // elevators are sometimes tagged with building:levels ranges
        // instead of level/repeat_on, so handle that as well
        let building_levels = parse_uint(element.tag_value_by_name(data_set, "building:levels"));
        if building_levels > 0 {
            let min_level = element
                .tag_value_by_name(data_set, "building:min_level")
                .or_else(|| element.tag_value_by_name(data_set, "level"))
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(0);
            for i in min_level..building_levels {
                self.append_full_level(i as i32 * 10, floor_model);
            }
        }
        let underground = parse_uint(
            element.tag_value_by_name(data_set, "building:levels:underground"),
        );
        for i in (1..=underground).rev() {
            self.append_full_level(-(i as i32) * 10, floor_model);
        }

        for key in ["level", "repeat_on"] {
            if let Some(value) = element.tag_value_by_name(data_set, key) {
                let mut parsed = Vec::new();
                levelparser::parse(value, element, |level, _| parsed.push(level));
                for level in parsed {
                    self.append_level(level, floor_model);
                }
            }
        }

        self.levels.sort();
        self.levels.dedup();
    }

    fn append_level(&mut self, level: i32, floor_model: Option<&FloorLevelModel>) {
        let ml = MapLevel::new(level);
        if ml.is_full_level() {
            self.append_full_level(level, floor_model);
        } else {
            self.append_full_level(ml.full_level_below(), floor_model);
            self.append_full_level(ml.full_level_above(), floor_model);
        }
    }

    fn append_full_level(&mut self, level: i32, floor_model: Option<&FloorLevelModel>) {
        match floor_model {
            None => self.levels.push(MapLevel::new(level)),
            Some(model) => {
                if model.contains(level) {
                    self.levels.push(MapLevel::new(level));
                }
            }
        }
    }

    /// Levels this element connects, top floor first.
    pub fn levels(&self) -> &[MapLevel] {
        &self.levels
    }

    /// True when the element connects exactly two levels and we are on one
    /// of them; the UI then offers a single "go to other" shortcut.
    pub fn has_single_level_change(&self) -> bool {
        if self.levels.len() != 2 {
            return false;
        }
        self.levels
            .iter()
            .any(|l| l.numeric_level() == self.current_floor_level)
    }

    /// The other side of a single level change.
    pub fn destination_level(&self) -> Option<MapLevel> {
        if !self.has_single_level_change() {
            return None;
        }
        self.levels
            .iter()
            .copied()
            .find(|l| l.numeric_level() != self.current_floor_level)
    }

    pub fn has_multiple_level_changes(&self) -> bool {
        self.levels.len() > 1
    }

    pub fn category(&self) -> LevelChangeCategory {
        self.category
    }
}

/// Whether the element is something one changes floors through.
pub fn is_level_change_element(data_set: &DataSet, element: Element<'_>) -> bool {
    element.tag_value_by_name(data_set, "highway").is_some()
        || element.tag_value_by_name(data_set, "elevator").is_some()
        || element.tag_value_by_name(data_set, "stairwell").is_some()
        || element.tag_value_by_name(data_set, "building:part") == Some("elevator")
        || element.tag_value_by_name(data_set, "building") == Some("elevator")
        || element.tag_value_by_name(data_set, "room") == Some("elevator")
        || element.tag_value_by_name(data_set, "levelpart") == Some("elevator_platform")
        || (element.tag_value_by_name(data_set, "indoor").is_some()
            && element.tag_value_by_name(data_set, "stairs") == Some("yes"))
        || element.tag_value_by_name(data_set, "room") == Some("stairs")
}

fn classify(data_set: &DataSet, element: Element<'_>) -> LevelChangeCategory {
    if element.tag_value_by_name(data_set, "highway") == Some("elevator")
        || element.tag_value_by_name(data_set, "elevator").is_some()
        || element.tag_value_by_name(data_set, "building:part") == Some("elevator")
        || element.tag_value_by_name(data_set, "building") == Some("elevator")
        || element.tag_value_by_name(data_set, "room") == Some("elevator")
        || element.tag_value_by_name(data_set, "levelpart") == Some("elevator_platform")
    {
        return LevelChangeCategory::Elevator;
    }
    if element.tag_value_by_name(data_set, "stairwell").is_some()
        || element.tag_value_by_name(data_set, "stairs") == Some("yes")
        || element.tag_value_by_name(data_set, "room") == Some("stairs")
    {
        return LevelChangeCategory::Staircase;
    }
    LevelChangeCategory::Unknown
}

fn parse_uint(value: Option<&str>) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}
