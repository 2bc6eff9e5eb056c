//! Property/value declarations of MapCSS rules.

use osm::{DataSet, TagKey};

use crate::color::Color;
use crate::properties::{Property, Unit};

#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationValue {
    Double(f64),
    Bool(bool),
    /// Quoted string literal.
    String(String),
    /// Bare identifier: keywords (`round`, `center`) or tag key references
    /// (`text: name`).
    Ident(String),
    Color(Color),
    Dashes(Vec<f64>),
}

/// A single `property: value` declaration.
///
/// Identifier values that reference tag keys (`text`, `shield-text`) get
/// their key interned at compile time; evaluation then resolves the tag
/// without string comparisons.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    property: Property,
    value: DeclarationValue,
    unit: Unit,
    tag_key: TagKey,
}

impl Declaration {
    pub fn new(property: Property, value: DeclarationValue) -> Self {
        Declaration {
            property,
            value,
            unit: Unit::NoUnit,
            tag_key: TagKey::INVALID,
        }
    }

    pub fn with_unit(property: Property, value: DeclarationValue, unit: Unit) -> Self {
        Declaration {
            property,
            value,
            unit,
            tag_key: TagKey::INVALID,
        }
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn value(&self) -> &DeclarationValue {
        &self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn double_value(&self) -> Option<f64> {
        match &self.value {
            DeclarationValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn int_value(&self) -> Option<i32> {
        self.double_value().map(|v| v.round() as i32)
    }

    pub fn bool_value(&self) -> bool {
        matches!(self.value, DeclarationValue::Bool(true))
    }

    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            DeclarationValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn ident_value(&self) -> Option<&str> {
        match &self.value {
            DeclarationValue::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub fn color_value(&self) -> Option<Color> {
        match &self.value {
            DeclarationValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn dashes_value(&self) -> Option<&[f64]> {
        match &self.value {
            DeclarationValue::Dashes(d) => Some(d),
            _ => None,
        }
    }

    /// The interned tag key for identifier values, valid after compile.
    pub fn key_value(&self) -> TagKey {
        self.tag_key
    }

    pub(crate) fn compile(&mut self, data_set: &DataSet) {
        if let DeclarationValue::Ident(name) = &self.value {
            self.tag_key = data_set.tag_key(name);
        }
    }
}
