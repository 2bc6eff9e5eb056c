//! Built-in render styles.
//!
//! The MapCSS text front end is an external collaborator, so the well-known
//! styles ship as builder-constructed rule sets. Names follow the style
//! sheet assets of the original application.

use crate::properties::{Property, Unit};
use crate::state::MapCssObjectType::{Area, Canvas, Line, Node, Way};
use crate::style::{MapCssStyle, RuleBuilder, StyleBuilder};

/// Resolves a well-known style name.
///
/// `default` picks the light or dark variant from the host palette's base
/// color luminance.
pub fn by_name(name: &str, palette_luminance: f32) -> Option<MapCssStyle> {
    match name {
        "breeze-light" => Some(breeze_light()),
        "breeze-dark" => Some(breeze_dark()),
        "diagnostic" => Some(diagnostic()),
        "" | "default" => Some(if palette_luminance > 0.5 {
            breeze_light()
        } else {
            breeze_dark()
        }),
        _ => None,
    }
}

pub fn breeze_light() -> MapCssStyle {
    breeze(BreezePalette {
        background: "#fcfcfc",
        foreground: "#232629",
        building: "#eff0f1",
        room: "#ffffff",
        corridor: "#f8f7f6",
        wall: "#bdc3c7",
        door: "#7f8c8d",
        stairs: "#95a5a6",
        water: "#cfe7f5",
        label: "#232629",
        halo: "#fcfcfc",
    })
}

pub fn breeze_dark() -> MapCssStyle {
    breeze(BreezePalette {
        background: "#232629",
        foreground: "#fcfcfc",
        building: "#31363b",
        room: "#3b4045",
        corridor: "#2d3136",
        wall: "#7f8c8d",
        door: "#95a5a6",
        stairs: "#707b7f",
        water: "#1d3a4f",
        label: "#fcfcfc",
        halo: "#232629",
    })
}

struct BreezePalette {
    background: &'static str,
    foreground: &'static str,
    building: &'static str,
    room: &'static str,
    corridor: &'static str,
    wall: &'static str,
    door: &'static str,
    stairs: &'static str,
    water: &'static str,
    label: &'static str,
    halo: &'static str,
}

fn breeze(p: BreezePalette) -> MapCssStyle {
    StyleBuilder::new()
        .rule(
            RuleBuilder::select(Canvas)
                .color(Property::FillColor, p.background)
                .color(Property::TextColor, p.foreground),
        )
        .rule(
            RuleBuilder::select(Area)
                .when_exists("building")
                .color(Property::FillColor, p.building)
                .number(Property::FillOpacity, 1.0)
                .number(Property::ZIndex, -10.0),
        )
        .rule(
            RuleBuilder::select(Area)
                .when_eq("indoor", "room")
                .color(Property::FillColor, p.room)
                .number(Property::FillOpacity, 1.0)
                .color(Property::Color, p.wall)
                .declare_unit(Property::Width, 0.2, Unit::Meters),
        )
        .rule(
            RuleBuilder::select(Area)
                .when_eq("indoor", "corridor")
                .or_select(Area)
                .when_eq("indoor", "area")
                .color(Property::FillColor, p.corridor)
                .number(Property::FillOpacity, 1.0),
        )
        .rule(
            RuleBuilder::select(Area)
                .when_eq("natural", "water")
                .color(Property::FillColor, p.water)
                .number(Property::FillOpacity, 1.0),
        )
        .rule(
            RuleBuilder::select(Line)
                .when_eq("indoor", "wall")
                .or_select(Line)
                .when_eq("barrier", "wall")
                .color(Property::Color, p.wall)
                .declare_unit(Property::Width, 0.2, Unit::Meters)
                .number(Property::ZIndex, 10.0),
        )
        .rule(
            RuleBuilder::select(Line)
                .when_eq("highway", "footway")
                .or_select(Line)
                .when_eq("highway", "corridor")
                .color(Property::Color, p.corridor)
                .declare_unit(Property::Width, 1.5, Unit::Meters)
                .color(Property::CasingColor, p.wall)
                .declare_unit(Property::CasingWidth, 1.0, Unit::Pixels),
        )
        .rule(
            RuleBuilder::select(Line)
                .when_eq("highway", "steps")
                .color(Property::Color, p.stairs)
                .declare_unit(Property::Width, 2.0, Unit::Meters)
                .number(Property::ZIndex, 5.0),
        )
        .rule(
            RuleBuilder::select(Node)
                .when_exists("door")
                .or_select(Node)
                .when_eq("indoor", "door")
                .color(Property::Color, p.door)
                .declare_unit(Property::Width, 0.8, Unit::Meters),
        )
        .rule(
            RuleBuilder::select(Way)
                .when_exists("name")
                .when_exists("indoor")
                .zoom(17, 0)
                .text_from_tag("name")
                .color(Property::TextColor, p.label)
                .number(Property::FontSize, 10.0)
                .color(Property::TextHaloColor, p.halo)
                .number(Property::TextHaloRadius, 2.0),
        )
        .rule(
            RuleBuilder::select(Node)
                .when_exists("name")
                .when_exists("amenity")
                .zoom(18, 0)
                .text_from_tag("name")
                .color(Property::TextColor, p.label)
                .number(Property::FontSize, 9.0)
                .color(Property::TextHaloColor, p.halo)
                .number(Property::TextHaloRadius, 2.0),
        )
        .build()
}

/// Garish style surfacing evaluation results for debugging.
pub fn diagnostic() -> MapCssStyle {
    StyleBuilder::new()
        .rule(
            RuleBuilder::select(Canvas)
                .color(Property::FillColor, "#101010")
                .color(Property::TextColor, "#00ff00"),
        )
        .rule(
            RuleBuilder::select(Area)
                .color(Property::FillColor, "#80ff00ff")
                .number(Property::FillOpacity, 0.5),
        )
        .rule(
            RuleBuilder::select(Line)
                .color(Property::Color, "#00ffff")
                .declare_unit(Property::Width, 1.0, Unit::Pixels),
        )
        .rule(
            RuleBuilder::select(Node)
                .when_exists("level")
                .text_from_tag("level")
                .color(Property::TextColor, "#ffff00")
                .number(Property::FontSize, 8.0),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_resolution() {
        assert!(by_name("breeze-light", 1.0).is_some());
        assert!(by_name("breeze-dark", 1.0).is_some());
        assert!(by_name("diagnostic", 1.0).is_some());
        assert!(by_name("no-such-style", 1.0).is_none());
    }

    #[test]
    fn default_follows_palette_luminance() {
        let light = by_name("default", 0.9).unwrap();
        let dark = by_name("default", 0.1).unwrap();
        // distinguishable by their rule count staying equal but canvas
        // colors differing
        assert_eq!(light.rules().len(), dark.rules().len());
        let light_canvas = &light.rules()[0].declarations[0];
        let dark_canvas = &dark.rules()[0].declarations[0];
        assert_ne!(light_canvas.color_value(), dark_canvas.color_value());
    }

    #[test]
    fn presets_are_nonempty() {
        for style in [breeze_light(), breeze_dark(), diagnostic()] {
            assert!(!style.is_empty());
        }
    }
}
