//! Overlay source capability.
//!
//! Overlays contribute additional elements per floor (realtime equipment
//! state, live location results) and can hide map elements they replace.
//! Both the scene controller and the navmesh builder consume this.

use osm::{DataSet, Element, ElementId};

pub trait OverlaySource {
    /// Invokes `f` for every additional element on the given floor.
    ///
    /// The callback receives the DataSet the element's geometry resolves
    /// against, and the floor level the element applies to, which may
    /// differ from `floor` for multi-level equipment.
    fn for_each(&self, floor: i32, f: &mut dyn FnMut(&DataSet, Element<'_>, i32));

    /// Appends the ids of map elements this source hides.
    fn hidden_elements(&self, out: &mut Vec<ElementId>);
}

/// A fixed overlay backed by its own DataSet, useful for tests and for
/// hosts with static overlay content.
#[derive(Default)]
pub struct StaticOverlaySource {
    data_set: osm::DataSet,
    elements: Vec<(ElementId, i32)>,
    hidden: Vec<ElementId>,
}

impl StaticOverlaySource {
    pub fn new(data_set: osm::DataSet) -> Self {
        StaticOverlaySource {
            data_set,
            elements: Vec::new(),
            hidden: Vec::new(),
        }
    }

    pub fn add_element(&mut self, id: ElementId, floor: i32) {
        self.elements.push((id, floor));
    }

    pub fn hide_element(&mut self, id: ElementId) {
        self.hidden.push(id);
    }
}

impl OverlaySource for StaticOverlaySource {
    fn for_each(&self, floor: i32, f: &mut dyn FnMut(&DataSet, Element<'_>, i32)) {
        for (id, elem_floor) in &self.elements {
            if *elem_floor == floor {
                let elem = id.resolve(&self.data_set);
                if elem != Element::Null {
                    f(&self.data_set, elem, *elem_floor);
                }
            }
        }
    }

    fn hidden_elements(&self, out: &mut Vec<ElementId>) {
        out.extend_from_slice(&self.hidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osm::{Coordinate, DataSet, ElementType, Node};

    #[test]
    fn static_source_yields_per_floor() {
        let mut data = DataSet::new();
        data.add_node(Node {
            id: 1,
            coordinate: Coordinate::from_degrees(0.0, 0.0),
            tags: Vec::new(),
        });
        let mut overlay = StaticOverlaySource::new(data);
        overlay.add_element(ElementId::new(ElementType::Node, 1), 0);

        let mut seen = 0;
        overlay.for_each(0, &mut |_, _, floor| {
            assert_eq!(floor, 0);
            seen += 1;
        });
        assert_eq!(seen, 1);

        let mut seen_above = 0;
        overlay.for_each(10, &mut |_, _, _| seen_above += 1);
        assert_eq!(seen_above, 0);
    }
}
