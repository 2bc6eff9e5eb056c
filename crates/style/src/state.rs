//! Style evaluation state.

use std::collections::HashMap;

use osm::{Element, Id};

/// Object type a selector applies to, or the resolved geometric type of
/// the element under evaluation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MapCssObjectType {
    Node,
    Way,
    Relation,
    /// A closed way or a multipolygon relation.
    Area,
    /// A non-closed way.
    Line,
    Canvas,
    #[default]
    Any,
}

/// Host-fed opening state per element, consulted by `:open`/`:closed`
/// pseudo-class selectors. Evaluating the `opening_hours` expression
/// itself is an external collaborator's job; this only caches its verdicts.
#[derive(Debug, Default)]
pub struct OpeningHoursCache {
    open: HashMap<Id, bool>,
}

impl OpeningHoursCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_open(&mut self, element: Id, open: bool) {
        self.open.insert(element, open);
    }

    /// Unknown elements count as closed.
    pub fn is_open(&self, element: Id) -> bool {
        self.open.get(&element).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.open.clear();
    }
}

/// Everything a single style evaluation looks at.
#[derive(Copy, Clone, Debug, Default)]
pub struct MapCssState<'a> {
    pub element: Element<'a>,
    pub zoom_level: f64,
    pub floor_level: i32,
    /// Resolved by [`crate::MapCssStyle::initialize_state`]; leave at `Any`
    /// and let the style fill it in.
    pub object_type: MapCssObjectType,
    pub opening_hours: Option<&'a OpeningHoursCache>,
}

#[cfg(test)]
mod tests {
    use super::OpeningHoursCache;

    #[test]
    fn unknown_elements_are_closed() {
        let mut cache = OpeningHoursCache::new();
        assert!(!cache.is_open(42));
        cache.set_open(42, true);
        assert!(cache.is_open(42));
    }
}
