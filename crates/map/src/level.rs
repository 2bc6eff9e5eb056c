//! Floor level representation.

use std::cmp::Ordering;

/// A map floor level, stored as 10 × the human floor number so half levels
/// like 0.5 (mezzanines) stay integral.
///
/// Ordering contract: levels sort descending by numeric value, so iteration
/// over a level map starts at the top floor. This matches how floor
/// selectors display levels and what the navmesh debug output relies on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapLevel(i32);

impl MapLevel {
    pub const GROUND: MapLevel = MapLevel(0);

    pub fn new(numeric_level: i32) -> Self {
        MapLevel(numeric_level)
    }

    /// From a human floor number (floor 1 → level 10).
    pub fn from_floor(floor: i32) -> Self {
        MapLevel(floor * 10)
    }

    pub fn numeric_level(&self) -> i32 {
        self.0
    }

    /// A full level is an integer human floor.
    pub fn is_full_level(&self) -> bool {
        self.0 % 10 == 0
    }

    pub fn full_level_below(&self) -> i32 {
        10 * (self.0 as f64 / 10.0).floor() as i32
    }

    pub fn full_level_above(&self) -> i32 {
        10 * (self.0 as f64 / 10.0).ceil() as i32
    }

    /// Display name of the level.
    pub fn name(&self) -> String {
        if self.is_full_level() {
            (self.0 / 10).to_string()
        } else {
            format!("{:.1}", self.0 as f64 / 10.0)
        }
    }
}

impl Ord for MapLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        // top floor first
        other.0.cmp(&self.0)
    }
}

impl PartialOrd for MapLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::MapLevel;

    #[test]
    fn full_level_predicate() {
        assert!(MapLevel::new(0).is_full_level());
        assert!(MapLevel::new(-20).is_full_level());
        assert!(!MapLevel::new(5).is_full_level());
    }

    #[test]
    fn adjacent_full_levels() {
        let mezzanine = MapLevel::new(5);
        assert_eq!(mezzanine.full_level_below(), 0);
        assert_eq!(mezzanine.full_level_above(), 10);

        let below_ground = MapLevel::new(-5);
        assert_eq!(below_ground.full_level_below(), -10);
        assert_eq!(below_ground.full_level_above(), 0);
    }

    #[test]
    fn sorts_top_floor_first() {
        let mut levels = vec![MapLevel::new(0), MapLevel::new(20), MapLevel::new(-10)];
        levels.sort();
        assert_eq!(
            levels.iter().map(|l| l.numeric_level()).collect::<Vec<_>>(),
            vec![20, 0, -10]
        );
    }

    #[test]
    fn names() {
        assert_eq!(MapLevel::new(20).name(), "2");
        assert_eq!(MapLevel::new(5).name(), "0.5");
        assert_eq!(MapLevel::new(-10).name(), "-1");
    }
}
