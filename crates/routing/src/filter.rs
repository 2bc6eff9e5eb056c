//! The built-in navmesh filter style.
//!
//! A dedicated style sheet, separate from the render styles: the default
//! layer marks walkable geometry and obstacles, the `link`,
//! `link_forward` and `link_backward` layers mark level connections.

use style::{MapCssStyle, Property, RuleBuilder, StyleBuilder};
use style::MapCssObjectType::{Area, Line, Node};

pub fn navmesh_filter_style() -> MapCssStyle {
    StyleBuilder::new()
        // walkable areas
        .rule(
            RuleBuilder::select(Area)
                .when_eq("indoor", "room")
                .or_select(Area)
                .when_eq("indoor", "corridor")
                .or_select(Area)
                .when_eq("indoor", "area")
                .number(Property::FillOpacity, 1.0),
        )
        .rule(
            RuleBuilder::select(Area)
                .when_eq("highway", "pedestrian")
                .or_select(Area)
                .when_eq("highway", "footway")
                .number(Property::FillOpacity, 1.0),
        )
        // walkable lines, stroked to agent-sized corridors; stairs keep
        // their slope through the node level index
        .rule(
            RuleBuilder::select(Line)
                .when_eq("highway", "footway")
                .or_select(Line)
                .when_eq("highway", "corridor")
                .or_select(Line)
                .when_eq("highway", "pedestrian")
                .number(Property::Width, 1.5),
        )
        .rule(
            RuleBuilder::select(Line)
                .when_eq("highway", "steps")
                .number(Property::Width, 2.0),
        )
        // obstacles
        .rule(
            RuleBuilder::select(Area)
                .when_eq("indoor", "wall")
                .or_select(Line)
                .when_eq("indoor", "wall")
                .or_select(Area)
                .when_eq("barrier", "wall")
                .or_select(Line)
                .when_eq("barrier", "wall")
                .number(Property::Extrude, 1.0),
        )
        // elevators connect every level they serve
        .rule(
            RuleBuilder::select(Area)
                .when_eq("highway", "elevator")
                .or_select(Node)
                .when_eq("highway", "elevator")
                .or_select(Area)
                .when_eq("building:part", "elevator")
                .or_select(Area)
                .when_eq("room", "elevator")
                .layer("link")
                .number(Property::FillOpacity, 1.0),
        )
        // escalators are directed level links
        .rule(
            RuleBuilder::select(Line)
                .when_eq("highway", "steps")
                .when_eq("conveying", "yes")
                .or_select(Line)
                .when_eq("highway", "steps")
                .when_eq("conveying", "forward")
                .layer("link_forward")
                .number(Property::Width, 2.0),
        )
        .rule(
            RuleBuilder::select(Line)
                .when_eq("highway", "steps")
                .when_eq("conveying", "reverse")
                .or_select(Line)
                .when_eq("highway", "steps")
                .when_eq("conveying", "backward")
                .layer("link_backward")
                .number(Property::Width, 2.0),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::navmesh_filter_style;
    use osm::{Coordinate, DataSet, Node, Tag, Way};
    use style::{MapCssResult, MapCssState, Property};

    #[test]
    fn escalator_matches_the_forward_link_layer() {
        let mut data = DataSet::new();
        let highway = data.make_tag_key("highway");
        let conveying = data.make_tag_key("conveying");
        for (id, lat) in [(1, 52.0), (2, 52.0001)] {
            data.add_node(Node {
                id,
                coordinate: Coordinate::from_degrees(lat, 13.0),
                tags: Vec::new(),
            });
        }
        data.add_way(Way {
            id: 10,
            nodes: vec![1, 2],
            tags: vec![
                Tag {
                    key: highway,
                    value: "steps".into(),
                },
                Tag {
                    key: conveying,
                    value: "yes".into(),
                },
            ],
            ..Default::default()
        });

        let mut style = navmesh_filter_style();
        style.compile(&data);

        let mut state = MapCssState {
            element: osm::Element::Way(data.way(10).unwrap()),
            zoom_level: 20.0,
            ..Default::default()
        };
        style.initialize_state(&mut state);

        let mut result = MapCssResult::new();
        style.evaluate(&state, &mut result).unwrap();

        let layer_names: Vec<_> = result.layers().iter().map(|l| l.layer_name()).collect();
        assert!(layer_names.contains(&None)); // plain stair geometry
        assert!(layer_names.contains(&Some("link_forward")));
        let link = result
            .layers()
            .iter()
            .find(|l| l.layer_name() == Some("link_forward"))
            .unwrap();
        assert_eq!(
            link.declaration(Property::Width).unwrap().double_value(),
            Some(2.0)
        );
    }
}
