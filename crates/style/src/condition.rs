//! Tag test conditions of basic selectors.

use osm::{DataSet, Element, TagKey};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConditionOp {
    /// `[key]`
    KeyExists,
    /// `[!key]`
    KeyNotExists,
    /// `[key=value]`
    Equal,
    /// `[key!=value]`
    NotEqual,
    /// `[key<value]`
    LessThan,
    /// `[key>value]`
    GreaterThan,
    /// `[key<=value]`
    LessOrEqual,
    /// `[key>=value]`
    GreaterOrEqual,
}

/// A compiled tag condition.
///
/// The key is interned against the DataSet at compile time; a key that does
/// not occur in the data never matches (and therefore `!=` and `!key`
/// trivially hold).
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    key_name: String,
    key: TagKey,
    op: ConditionOp,
    value: String,
    numeric_value: Option<f64>,
}

impl Condition {
    pub fn new(key: impl Into<String>, op: ConditionOp, value: impl Into<String>) -> Self {
        let value = value.into();
        let numeric_value = value.parse().ok();
        Condition {
            key_name: key.into(),
            key: TagKey::INVALID,
            op,
            value,
            numeric_value,
        }
    }

    pub fn key_exists(key: impl Into<String>) -> Self {
        Condition::new(key, ConditionOp::KeyExists, "")
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub(crate) fn compile(&mut self, data_set: &DataSet) {
        self.key = data_set.tag_key(&self.key_name);
    }

    pub fn matches(&self, element: Element<'_>) -> bool {
        let v = element.tag_value(self.key).filter(|v| !v.is_empty());
        match self.op {
            ConditionOp::KeyExists => v.is_some(),
            ConditionOp::KeyNotExists => v.is_none(),
            ConditionOp::Equal => v == Some(self.value.as_str()),
            ConditionOp::NotEqual => v != Some(self.value.as_str()),
            ConditionOp::LessThan
            | ConditionOp::GreaterThan
            | ConditionOp::LessOrEqual
            | ConditionOp::GreaterOrEqual => {
                let (Some(rhs), Some(lhs)) = (self.numeric_value, v.and_then(|v| v.parse::<f64>().ok()))
                else {
                    return false;
                };
                match self.op {
                    ConditionOp::LessThan => lhs < rhs,
                    ConditionOp::GreaterThan => lhs > rhs,
                    ConditionOp::LessOrEqual => lhs <= rhs,
                    ConditionOp::GreaterOrEqual => lhs >= rhs,
                    _ => unreachable!(),
                }
            }
        }
    }
}
