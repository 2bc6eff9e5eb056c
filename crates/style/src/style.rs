//! Compiled style sheets and their evaluation.

use std::fmt;

use osm::{DataSet, TagKey};

use crate::condition::{Condition, ConditionOp};
use crate::declaration::{Declaration, DeclarationValue};
use crate::properties::{Property, Unit};
use crate::result::MapCssResult;
use crate::selector::{BasicSelector, ClassId, PseudoClass, Selector, ZoomRange};
use crate::state::{MapCssObjectType, MapCssState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// The style was used for evaluation before `compile(data_set)` ran.
    NotCompiled,
    /// Style text could not be parsed. Produced by the (external) text
    /// front end, carried here so hosts have a single error kind to match.
    Parse(String),
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleError::NotCompiled => {
                write!(f, "style has not been compiled against the active data set")
            }
            StyleError::Parse(msg) => write!(f, "style parse error: {msg}"),
        }
    }
}

impl std::error::Error for StyleError {}

/// One style rule: a selector set and its declaration block.
#[derive(Clone, Debug)]
pub struct Rule {
    pub selector: Selector,
    /// Layer selector suffix (`::casing`); `None` is the default layer.
    pub layer_name: Option<String>,
    pub declarations: Vec<Declaration>,
    /// Classes this rule sets on the element (`set .foo`).
    pub set_classes: Vec<String>,
    class_ids: Vec<ClassId>,
}

impl Rule {
    pub fn new(selector: Selector) -> Self {
        Rule {
            selector,
            layer_name: None,
            declarations: Vec::new(),
            set_classes: Vec::new(),
            class_ids: Vec::new(),
        }
    }
}

/// A parsed MapCSS style sheet.
///
/// Must be compiled against the target DataSet before evaluation; compiling
/// interns every condition key, the `area`/`type` disambiguation keys, tag
/// references in declarations, and the class symbol table.
#[derive(Debug, Default, Clone)]
pub struct MapCssStyle {
    rules: Vec<Rule>,
    class_names: Vec<String>,
    area_key: TagKey,
    type_key: TagKey,
    compiled: bool,
}

impl MapCssStyle {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Optimizes the rules for application against `data_set`. Mandatory
    /// whenever the data set changes.
    pub fn compile(&mut self, data_set: &DataSet) {
        self.area_key = data_set.tag_key("area");
        self.type_key = data_set.tag_key("type");

        // class symbol table, stable across recompiles
        self.class_names.clear();
        for rule in &self.rules {
            for class in &rule.set_classes {
                if !self.class_names.contains(class) {
                    self.class_names.push(class.clone());
                }
            }
        }

        let class_id = |names: &[String], name: &str| {
            names
                .iter()
                .position(|n| n == name)
                .map(|idx| ClassId(idx as u16))
        };

        for rule in &mut self.rules {
            rule.selector.compile(data_set);
            for selector in rule.selector.basic_selectors_mut() {
                selector.class = selector
                    .class_name
                    .as_deref()
                    .and_then(|name| class_id(&self.class_names, name));
            }
            for declaration in &mut rule.declarations {
                declaration.compile(data_set);
            }
            rule.class_ids = rule
                .set_classes
                .iter()
                .filter_map(|name| class_id(&self.class_names, name))
                .collect();
        }

        self.compiled = true;
    }

    /// Resolves the geometric object type of the state's element, using the
    /// `area` tag when present and the closedness test otherwise.
    pub fn initialize_state(&self, state: &mut MapCssState<'_>) {
        state.object_type = match state.element {
            osm::Element::Null => MapCssObjectType::Any,
            osm::Element::Node(_) => MapCssObjectType::Node,
            osm::Element::Way(way) => match state.element.tag_value(self.area_key) {
                Some("yes") => MapCssObjectType::Area,
                Some("no") => MapCssObjectType::Line,
                _ => {
                    if way.is_closed() {
                        MapCssObjectType::Area
                    } else {
                        MapCssObjectType::Line
                    }
                }
            },
            osm::Element::Relation(_) => {
                if state.element.tag_value(self.type_key) == Some("multipolygon") {
                    MapCssObjectType::Area
                } else {
                    MapCssObjectType::Relation
                }
            }
        };
    }

    /// Evaluates the style for `state`, writing matched declarations into
    /// the caller-owned `result`.
    ///
    /// Classes set by earlier rules are visible to later rules' class
    /// filters within this one evaluation. Declarations apply last-write-
    /// wins per property within their result layer.
    pub fn evaluate<'s>(
        &'s self,
        state: &MapCssState<'_>,
        result: &mut MapCssResult<'s>,
    ) -> Result<(), StyleError> {
        if !self.compiled {
            return Err(StyleError::NotCompiled);
        }
        result.clear();

        for rule in &self.rules {
            if !rule.selector.matches(state, result.classes()) {
                continue;
            }
            for class in &rule.class_ids {
                result.add_class(*class);
            }
            if rule.declarations.is_empty() {
                continue;
            }
            let layer = result.layer_mut(rule.layer_name.as_deref());
            for declaration in &rule.declarations {
                layer.apply(declaration);
            }
        }

        Ok(())
    }

    /// Evaluates canvas rules only; per-element selectors are ignored.
    pub fn evaluate_canvas<'s>(
        &'s self,
        state: &MapCssState<'_>,
        result: &mut MapCssResult<'s>,
    ) -> Result<(), StyleError> {
        if !self.compiled {
            return Err(StyleError::NotCompiled);
        }
        result.clear();

        for rule in &self.rules {
            if !rule.selector.matches_canvas(state) {
                continue;
            }
            let layer = result.layer_mut(rule.layer_name.as_deref());
            for declaration in &rule.declarations {
                layer.apply(declaration);
            }
        }

        Ok(())
    }
}

/// Fluent construction of styles in code.
///
/// The MapCSS text grammar is an external collaborator; everything in this
/// workspace (presets, filter styles, tests) builds styles through this.
#[derive(Debug, Default)]
pub struct StyleBuilder {
    rules: Vec<Rule>,
}

impl StyleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: RuleBuilder) -> Self {
        self.rules.push(rule.build());
        self
    }

    pub fn build(self) -> MapCssStyle {
        MapCssStyle {
            rules: self.rules,
            ..Default::default()
        }
    }
}

/// Builds a single rule. Condition/zoom/pseudo-class modifiers apply to
/// the most recently selected union branch.
#[derive(Debug)]
pub struct RuleBuilder {
    selectors: Vec<BasicSelector>,
    layer_name: Option<String>,
    declarations: Vec<Declaration>,
    set_classes: Vec<String>,
}

impl RuleBuilder {
    pub fn select(object_type: MapCssObjectType) -> Self {
        RuleBuilder {
            selectors: vec![BasicSelector::new(object_type)],
            layer_name: None,
            declarations: Vec::new(),
            set_classes: Vec::new(),
        }
    }

    pub fn or_select(mut self, object_type: MapCssObjectType) -> Self {
        self.selectors.push(BasicSelector::new(object_type));
        self
    }

    pub fn when(mut self, key: &str, op: ConditionOp, value: &str) -> Self {
        self.current().conditions.push(Condition::new(key, op, value));
        self
    }

    pub fn when_eq(self, key: &str, value: &str) -> Self {
        self.when(key, ConditionOp::Equal, value)
    }

    pub fn when_exists(self, key: &str) -> Self {
        self.when(key, ConditionOp::KeyExists, "")
    }

    pub fn zoom(mut self, low: i32, high: i32) -> Self {
        self.current().zoom_range = ZoomRange::new(low, high);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.current().class_name = Some(class.to_string());
        self
    }

    pub fn open(mut self) -> Self {
        self.current().pseudo_class = Some(PseudoClass::Open);
        self
    }

    pub fn closed(mut self) -> Self {
        self.current().pseudo_class = Some(PseudoClass::Closed);
        self
    }

    pub fn layer(mut self, name: &str) -> Self {
        self.layer_name = Some(name.to_string());
        self
    }

    pub fn set_class(mut self, class: &str) -> Self {
        self.set_classes.push(class.to_string());
        self
    }

    pub fn declare(mut self, property: Property, value: DeclarationValue) -> Self {
        self.declarations.push(Declaration::new(property, value));
        self
    }

    pub fn declare_unit(mut self, property: Property, value: f64, unit: Unit) -> Self {
        self.declarations.push(Declaration::with_unit(
            property,
            DeclarationValue::Double(value),
            unit,
        ));
        self
    }

    pub fn color(self, property: Property, css: &str) -> Self {
        let color = crate::Color::from_css(css).unwrap_or(crate::Color::TRANSPARENT);
        self.declare(property, DeclarationValue::Color(color))
    }

    pub fn number(self, property: Property, value: f64) -> Self {
        self.declare(property, DeclarationValue::Double(value))
    }

    pub fn text_from_tag(self, key: &str) -> Self {
        self.declare(Property::Text, DeclarationValue::Ident(key.to_string()))
    }

    fn current(&mut self) -> &mut BasicSelector {
        self.selectors.last_mut().expect("builder starts with one")
    }

    fn build(self) -> Rule {
        let selector = if self.selectors.len() == 1 {
            Selector::Basic(self.selectors.into_iter().next().unwrap())
        } else {
            Selector::Union(self.selectors.into_iter().map(Selector::Basic).collect())
        };
        let mut rule = Rule::new(selector);
        rule.layer_name = self.layer_name;
        rule.declarations = self.declarations;
        rule.set_classes = self.set_classes;
        rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use osm::{Coordinate, Node, Tag, Way};

    fn room_data_set() -> DataSet {
        let mut data = DataSet::new();
        let indoor = data.make_tag_key("indoor");
        let level = data.make_tag_key("level");
        for (id, lat, lon) in [(1, 0.0, 0.0), (2, 0.0, 0.001), (3, 0.001, 0.001)] {
            data.add_node(Node {
                id,
                coordinate: Coordinate::from_degrees(lat, lon),
                tags: Vec::new(),
            });
        }
        data.add_way(Way {
            id: 10,
            nodes: vec![1, 2, 3, 1],
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
        data
    }

    fn red_fill_style() -> MapCssStyle {
        StyleBuilder::new()
            .rule(
                RuleBuilder::select(MapCssObjectType::Node)
                    .or_select(MapCssObjectType::Way)
                    .color(Property::FillColor, "#f00"),
            )
            .build()
    }

    #[test]
    fn evaluation_requires_compile() {
        let data = room_data_set();
        let style = red_fill_style();
        let state = MapCssState {
            element: osm::Element::Way(data.way(10).unwrap()),
            zoom_level: 18.0,
            ..Default::default()
        };
        let mut result = MapCssResult::new();
        assert_eq!(
            style.evaluate(&state, &mut result),
            Err(StyleError::NotCompiled)
        );
    }

    #[test]
    fn room_way_gets_fill_color() {
        let data = room_data_set();
        let mut style = red_fill_style();
        style.compile(&data);

        let mut state = MapCssState {
            element: osm::Element::Way(data.way(10).unwrap()),
            zoom_level: 18.0,
            ..Default::default()
        };
        style.initialize_state(&mut state);
        assert_eq!(state.object_type, MapCssObjectType::Area);

        let mut result = MapCssResult::new();
        style.evaluate(&state, &mut result).unwrap();
        assert_eq!(result.layers().len(), 1);
        let layer = result.default_layer().unwrap();
        assert_eq!(
            layer.declaration(Property::FillColor).unwrap().color_value(),
            Some(Color::from_rgb(255, 0, 0))
        );
        assert!(layer.has_area_properties());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let data = room_data_set();
        let mut style = red_fill_style();
        style.compile(&data);

        let mut state = MapCssState {
            element: osm::Element::Way(data.way(10).unwrap()),
            zoom_level: 18.0,
            ..Default::default()
        };
        style.initialize_state(&mut state);

        let mut result = MapCssResult::new();
        let mut snapshots = Vec::new();
        for _ in 0..3 {
            style.evaluate(&state, &mut result).unwrap();
            let layer = result.default_layer().unwrap();
            snapshots.push((
                result.layers().len(),
                layer.declaration(Property::FillColor).unwrap().color_value(),
            ));
        }
        assert!(snapshots.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn classes_are_write_then_test_in_rule_order() {
        let data = room_data_set();
        let mut style = StyleBuilder::new()
            .rule(
                RuleBuilder::select(MapCssObjectType::Way)
                    .when_eq("indoor", "room")
                    .set_class("important"),
            )
            .rule(
                RuleBuilder::select(MapCssObjectType::Way)
                    .with_class("important")
                    .number(Property::ZIndex, 10.0),
            )
            .rule(
                // class set after use: must not affect this evaluation's
                // earlier rules, but rule order puts it last anyway
                RuleBuilder::select(MapCssObjectType::Way).set_class("late"),
            )
            .build();
        style.compile(&data);

        let mut state = MapCssState {
            element: osm::Element::Way(data.way(10).unwrap()),
            zoom_level: 18.0,
            ..Default::default()
        };
        style.initialize_state(&mut state);

        let mut result = MapCssResult::new();
        style.evaluate(&state, &mut result).unwrap();
        let layer = result.default_layer().unwrap();
        assert_eq!(
            layer.declaration(Property::ZIndex).unwrap().int_value(),
            Some(10)
        );
    }

    #[test]
    fn canvas_rules_only_apply_to_canvas_evaluation() {
        let data = room_data_set();
        let mut style = StyleBuilder::new()
            .rule(
                RuleBuilder::select(MapCssObjectType::Canvas)
                    .color(Property::FillColor, "#ffffff"),
            )
            .rule(
                RuleBuilder::select(MapCssObjectType::Way)
                    .color(Property::Color, "#000000"),
            )
            .build();
        style.compile(&data);

        let state = MapCssState {
            zoom_level: 18.0,
            ..Default::default()
        };
        let mut result = MapCssResult::new();
        style.evaluate_canvas(&state, &mut result).unwrap();
        assert_eq!(result.layers().len(), 1);
        assert_eq!(
            result
                .default_layer()
                .unwrap()
                .declaration(Property::FillColor)
                .unwrap()
                .color_value(),
            Some(Color::WHITE)
        );
    }

    #[test]
    fn later_rules_override_earlier_ones() {
        let data = room_data_set();
        let mut style = StyleBuilder::new()
            .rule(
                RuleBuilder::select(MapCssObjectType::Way)
                    .number(Property::FillOpacity, 0.2),
            )
            .rule(
                RuleBuilder::select(MapCssObjectType::Way)
                    .when_eq("indoor", "room")
                    .number(Property::FillOpacity, 0.9),
            )
            .build();
        style.compile(&data);

        let mut state = MapCssState {
            element: osm::Element::Way(data.way(10).unwrap()),
            zoom_level: 18.0,
            ..Default::default()
        };
        style.initialize_state(&mut state);
        let mut result = MapCssResult::new();
        style.evaluate(&state, &mut result).unwrap();
        assert_eq!(
            result
                .default_layer()
                .unwrap()
                .declaration(Property::FillOpacity)
                .unwrap()
                .double_value(),
            Some(0.9)
        );
    }
}
