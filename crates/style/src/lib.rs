pub mod color;
pub mod condition;
pub mod declaration;
pub mod presets;
pub mod properties;
pub mod result;
pub mod selector;
pub mod state;
pub mod style;

pub use color::Color;
pub use condition::{Condition, ConditionOp};
pub use declaration::{Declaration, DeclarationValue};
pub use properties::{Property, PropertyFlags, Unit};
pub use result::{MapCssResult, ResultLayer};
pub use selector::{BasicSelector, Selector, ZoomRange};
pub use state::{MapCssObjectType, MapCssState, OpeningHoursCache};
pub use style::{MapCssStyle, Rule, RuleBuilder, StyleBuilder, StyleError};
