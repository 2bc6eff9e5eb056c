//! Reusable evaluation result buffer.
//!
//! The caller owns one [`MapCssResult`] and passes it to every `evaluate`
//! call; layer tables and the class scratch keep their allocations between
//! elements, so the hot path does not allocate once warm.

use crate::declaration::Declaration;
use crate::properties::{PROPERTY_COUNT, Property, PropertyFlags};
use crate::selector::ClassId;

/// One result layer: the declarations that apply to a single layer
/// selector, as a dense property-indexed table with last-write-wins
/// semantics.
#[derive(Debug)]
pub struct ResultLayer<'s> {
    layer_name: Option<&'s str>,
    declarations: Vec<Option<&'s Declaration>>,
    flags: PropertyFlags,
}

impl<'s> ResultLayer<'s> {
    fn new() -> Self {
        ResultLayer {
            layer_name: None,
            declarations: vec![None; PROPERTY_COUNT],
            flags: PropertyFlags::NONE,
        }
    }

    fn reset(&mut self, layer_name: Option<&'s str>) {
        self.layer_name = layer_name;
        self.declarations.fill(None);
        self.flags = PropertyFlags::NONE;
    }

    /// The rule layer selector this result belongs to; `None` is the
    /// default layer.
    pub fn layer_name(&self) -> Option<&str> {
        self.layer_name
    }

    pub fn declaration(&self, property: Property) -> Option<&'s Declaration> {
        self.declarations[property.index()]
    }

    pub(crate) fn apply(&mut self, declaration: &'s Declaration) {
        self.declarations[declaration.property().index()] = Some(declaration);
        self.flags = self.flags.union(declaration.property().flags());
    }

    pub fn has_area_properties(&self) -> bool {
        self.flags.contains(PropertyFlags::AREA)
    }

    pub fn has_line_properties(&self) -> bool {
        self.flags.contains(PropertyFlags::LINE)
    }

    pub fn has_label_properties(&self) -> bool {
        self.flags.contains(PropertyFlags::LABEL)
    }

    pub fn has_extrude_properties(&self) -> bool {
        self.flags.contains(PropertyFlags::EXTRUDE)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.declarations.iter().all(Option::is_none)
    }
}

/// The set of result layers produced by one evaluation.
#[derive(Debug, Default)]
pub struct MapCssResult<'s> {
    layers: Vec<ResultLayer<'s>>,
    active: usize,
    classes: Vec<ClassId>,
}

impl<'s> MapCssResult<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.active = 0;
        self.classes.clear();
    }

    /// The layer for the given selector name, activating a pooled slot on
    /// first use within this evaluation.
    pub(crate) fn layer_mut(&mut self, layer_name: Option<&'s str>) -> &mut ResultLayer<'s> {
        if let Some(idx) = self.layers[..self.active]
            .iter()
            .position(|l| l.layer_name == layer_name)
        {
            return &mut self.layers[idx];
        }
        if self.active == self.layers.len() {
            self.layers.push(ResultLayer::new());
        }
        let layer = &mut self.layers[self.active];
        layer.reset(layer_name);
        self.active += 1;
        layer
    }

    /// The active result layers, in first-touch order.
    pub fn layers(&self) -> &[ResultLayer<'s>] {
        &self.layers[..self.active]
    }

    /// The default (unnamed) layer, if any rule wrote to it.
    pub fn default_layer(&self) -> Option<&ResultLayer<'s>> {
        self.layers().iter().find(|l| l.layer_name.is_none())
    }

    pub(crate) fn add_class(&mut self, class: ClassId) {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    pub(crate) fn classes(&self) -> &[ClassId] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::DeclarationValue;

    #[test]
    fn last_write_wins_per_property() {
        let first = Declaration::new(Property::FillOpacity, DeclarationValue::Double(0.2));
        let second = Declaration::new(Property::FillOpacity, DeclarationValue::Double(0.9));

        let mut result = MapCssResult::new();
        result.clear();
        let layer = result.layer_mut(None);
        layer.apply(&first);
        layer.apply(&second);

        let got = result.default_layer().unwrap();
        assert_eq!(
            got.declaration(Property::FillOpacity).unwrap().double_value(),
            Some(0.9)
        );
        assert!(got.has_area_properties());
        assert!(!got.has_line_properties());
    }

    #[test]
    fn layers_are_keyed_by_selector_name() {
        let fill = Declaration::new(Property::FillColor, DeclarationValue::Double(0.0));

        let mut result = MapCssResult::new();
        result.clear();
        result.layer_mut(None).apply(&fill);
        result.layer_mut(Some("casing")).apply(&fill);
        result.layer_mut(None).apply(&fill);

        assert_eq!(result.layers().len(), 2);
        assert_eq!(result.layers()[1].layer_name(), Some("casing"));
    }

    #[test]
    fn clear_retains_pool_but_drops_content() {
        let fill = Declaration::new(Property::FillColor, DeclarationValue::Double(0.0));
        let mut result = MapCssResult::new();
        result.layer_mut(None).apply(&fill);
        assert_eq!(result.layers().len(), 1);

        result.clear();
        assert!(result.layers().is_empty());

        // reusing the pooled slot starts from an empty table
        let layer = result.layer_mut(None);
        assert!(layer.declaration(Property::FillColor).is_none());
    }
}
