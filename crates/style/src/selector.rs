//! Style selectors: basic, chained and union.

use osm::{DataSet, ElementType};

use crate::condition::Condition;
use crate::state::{MapCssObjectType, MapCssState};

/// Inclusive zoom interval; a high bound of 0 means unbounded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoomRange {
    pub low: i32,
    pub high: i32,
}

impl ZoomRange {
    pub fn new(low: i32, high: i32) -> Self {
        ZoomRange { low, high }
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.low as f64 && (self.high == 0 || zoom <= self.high as f64)
    }
}

/// `:open` / `:closed` pseudo-class, answered by the opening-hours cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PseudoClass {
    Open,
    Closed,
}

/// Identifier of a class within a style's class symbol table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClassId(pub(crate) u16);

/// A selector that only contains tests, no sub-selectors.
#[derive(Clone, Debug, Default)]
pub struct BasicSelector {
    pub object_type: MapCssObjectType,
    pub zoom_range: ZoomRange,
    pub conditions: Vec<Condition>,
    pub class_name: Option<String>,
    pub pseudo_class: Option<PseudoClass>,
    pub(crate) class: Option<ClassId>,
}

impl BasicSelector {
    pub fn new(object_type: MapCssObjectType) -> Self {
        BasicSelector {
            object_type,
            ..Default::default()
        }
    }

    pub(crate) fn compile(&mut self, data_set: &DataSet) {
        for condition in &mut self.conditions {
            condition.compile(data_set);
        }
    }

    pub(crate) fn matches(&self, state: &MapCssState<'_>, classes: &[ClassId]) -> bool {
        let type_ok = match self.object_type {
            MapCssObjectType::Any => true,
            MapCssObjectType::Canvas => false,
            MapCssObjectType::Node => state.element.element_type() == ElementType::Node,
            MapCssObjectType::Way => state.element.element_type() == ElementType::Way,
            MapCssObjectType::Relation => state.element.element_type() == ElementType::Relation,
            MapCssObjectType::Area => state.object_type == MapCssObjectType::Area,
            MapCssObjectType::Line => state.object_type == MapCssObjectType::Line,
        };
        if !type_ok || !self.zoom_range.contains(state.zoom_level) {
            return false;
        }

        if let Some(class) = self.class
            && !classes.contains(&class)
        {
            return false;
        }
        // an uncompiled class filter can never have been set
        if self.class_name.is_some() && self.class.is_none() {
            return false;
        }

        if let Some(pseudo) = self.pseudo_class {
            let open = state
                .opening_hours
                .map(|cache| cache.is_open(state.element.id()))
                .unwrap_or(false);
            match pseudo {
                PseudoClass::Open if !open => return false,
                PseudoClass::Closed if open => return false,
                _ => {}
            }
        }

        self.conditions.iter().all(|c| c.matches(state.element))
    }

    pub(crate) fn matches_canvas(&self, state: &MapCssState<'_>) -> bool {
        self.object_type == MapCssObjectType::Canvas && self.zoom_range.contains(state.zoom_level)
    }
}

/// A selector tree: a single basic selector, a descendant chain, or a
/// disjunction.
#[derive(Clone, Debug)]
pub enum Selector {
    Basic(BasicSelector),
    /// Descendant chain, parent selectors first.
    ///
    /// Ancestor relationships are not tracked during evaluation, so chains
    /// never match; they are carried so compiled styles round-trip.
    Chained(Vec<BasicSelector>),
    Union(Vec<Selector>),
}

impl Selector {
    pub(crate) fn compile(&mut self, data_set: &DataSet) {
        match self {
            Selector::Basic(s) => s.compile(data_set),
            Selector::Chained(chain) => {
                for s in chain {
                    s.compile(data_set);
                }
            }
            Selector::Union(parts) => {
                for s in parts {
                    s.compile(data_set);
                }
            }
        }
    }

    pub(crate) fn matches(&self, state: &MapCssState<'_>, classes: &[ClassId]) -> bool {
        match self {
            Selector::Basic(s) => s.matches(state, classes),
            Selector::Chained(_) => false,
            Selector::Union(parts) => parts.iter().any(|s| s.matches(state, classes)),
        }
    }

    pub(crate) fn matches_canvas(&self, state: &MapCssState<'_>) -> bool {
        match self {
            Selector::Basic(s) => s.matches_canvas(state),
            Selector::Chained(_) => false,
            Selector::Union(parts) => parts.iter().any(|s| s.matches_canvas(state)),
        }
    }

    /// All basic selectors in the tree, for compile-time symbol
    /// resolution.
    pub(crate) fn basic_selectors_mut(&mut self) -> Vec<&mut BasicSelector> {
        match self {
            Selector::Basic(s) => vec![s],
            Selector::Chained(chain) => chain.iter_mut().collect(),
            Selector::Union(parts) => parts
                .iter_mut()
                .flat_map(|s| s.basic_selectors_mut())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionOp;
    use osm::{Coordinate, Node, Tag};

    fn room_data() -> DataSet {
        let mut data = DataSet::new();
        let indoor = data.make_tag_key("indoor");
        data.add_node(Node {
            id: 1,
            coordinate: Coordinate::from_degrees(0.0, 0.0),
            tags: vec![Tag {
                key: indoor,
                value: "room".into(),
            }],
        });
        data
    }

    fn state_for<'a>(data: &'a DataSet) -> MapCssState<'a> {
        MapCssState {
            element: osm::Element::Node(data.node(1).unwrap()),
            zoom_level: 18.0,
            floor_level: 0,
            object_type: MapCssObjectType::Node,
            opening_hours: None,
        }
    }

    #[test]
    fn basic_selector_matches_type_zoom_and_conditions() {
        let data = room_data();
        let state = state_for(&data);

        let mut sel = BasicSelector::new(MapCssObjectType::Node);
        sel.conditions
            .push(Condition::new("indoor", ConditionOp::Equal, "room"));
        sel.compile(&data);
        assert!(sel.matches(&state, &[]));

        sel.zoom_range = ZoomRange::new(0, 16);
        assert!(!sel.matches(&state, &[]));
    }

    #[test]
    fn any_matches_every_element_type() {
        let data = room_data();
        let state = state_for(&data);
        let sel = BasicSelector::new(MapCssObjectType::Any);
        assert!(sel.matches(&state, &[]));
    }

    #[test]
    fn chained_selectors_never_match() {
        let data = room_data();
        let state = state_for(&data);
        let sel = Selector::Chained(vec![
            BasicSelector::new(MapCssObjectType::Way),
            BasicSelector::new(MapCssObjectType::Node),
        ]);
        assert!(!sel.matches(&state, &[]));
    }

    #[test]
    fn union_matches_any_branch() {
        let data = room_data();
        let state = state_for(&data);
        let sel = Selector::Union(vec![
            Selector::Basic(BasicSelector::new(MapCssObjectType::Way)),
            Selector::Basic(BasicSelector::new(MapCssObjectType::Node)),
        ]);
        assert!(sel.matches(&state, &[]));
    }

    #[test]
    fn class_filter_requires_prior_class() {
        let data = room_data();
        let state = state_for(&data);
        let mut sel = BasicSelector::new(MapCssObjectType::Node);
        sel.class_name = Some("hidden".into());
        sel.class = Some(ClassId(0));
        assert!(!sel.matches(&state, &[]));
        assert!(sel.matches(&state, &[ClassId(0)]));
    }
}
