//! The MapCSS property vocabulary.
//!
//! See <https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Vocabulary>.

/// The property set by a declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Property {
    /// z-order
    ZIndex,

    // line properties
    Width,
    Color,
    Opacity,
    Dashes,
    LineCap,
    LineJoin,

    // line casing properties
    CasingWidth,
    CasingColor,
    CasingOpacity,
    CasingDashes,

    /// wall extrusion height, in stories
    Extrude,

    // polygon (and canvas) properties
    FillColor,
    FillOpacity,

    // icon properties
    IconImage,
    IconWidth,
    IconHeight,
    IconColor,
    IconOpacity,

    // label properties
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    TextDecoration,
    TextTransform,
    TextColor,
    TextOpacity,
    TextPosition,
    TextOffset,
    MaxWidth,
    Text,
    TextHaloColor,
    TextHaloRadius,

    // shield properties (casing > frame > shield > text)
    ShieldColor,
    ShieldOpacity,
    ShieldFrameColor,
    ShieldFrameWidth,
    ShieldCasingColor,
    ShieldCasingWidth,
    ShieldText,
    ShieldShape,
}

/// Number of distinct properties; sizes the dense result-layer table.
pub const PROPERTY_COUNT: usize = Property::ShieldShape as usize + 1;

impl Property {
    pub fn index(self) -> usize {
        self as usize
    }

    /// The kind of geometry a declaration of this property asks for.
    pub fn flags(self) -> PropertyFlags {
        use Property::*;
        match self {
            ZIndex => PropertyFlags::NONE,
            Width | Color | Opacity | Dashes | LineCap | LineJoin | CasingWidth
            | CasingColor | CasingOpacity | CasingDashes => PropertyFlags::LINE,
            Extrude => PropertyFlags::EXTRUDE,
            FillColor | FillOpacity => PropertyFlags::AREA.union(PropertyFlags::CANVAS),
            IconImage | IconWidth | IconHeight | IconColor | IconOpacity => PropertyFlags::LABEL,
            FontFamily | FontSize | FontWeight | FontStyle | TextDecoration | TextTransform
            | TextOpacity | TextPosition | TextOffset | MaxWidth | Text | TextHaloColor
            | TextHaloRadius => PropertyFlags::LABEL,
            TextColor => PropertyFlags::LABEL.union(PropertyFlags::CANVAS),
            ShieldColor | ShieldOpacity | ShieldFrameColor | ShieldFrameWidth
            | ShieldCasingColor | ShieldCasingWidth | ShieldText | ShieldShape => {
                PropertyFlags::LABEL
            }
        }
    }
}

/// Bitset over the geometry kinds a set of declarations applies to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyFlags(u8);

impl PropertyFlags {
    pub const NONE: PropertyFlags = PropertyFlags(0);
    pub const AREA: PropertyFlags = PropertyFlags(1);
    pub const LINE: PropertyFlags = PropertyFlags(2);
    pub const LABEL: PropertyFlags = PropertyFlags(4);
    pub const CANVAS: PropertyFlags = PropertyFlags(8);
    pub const EXTRUDE: PropertyFlags = PropertyFlags(16);

    pub const fn union(self, other: PropertyFlags) -> PropertyFlags {
        PropertyFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: PropertyFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Unit type for numeric declaration values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Unit {
    #[default]
    NoUnit,
    Pixels,
    Points,
    Meters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_color_is_area_and_canvas() {
        let flags = Property::FillColor.flags();
        assert!(flags.contains(PropertyFlags::AREA));
        assert!(flags.contains(PropertyFlags::CANVAS));
        assert!(!flags.contains(PropertyFlags::LINE));
    }

    #[test]
    fn z_index_requests_no_geometry() {
        assert!(Property::ZIndex.flags().is_empty());
    }

    #[test]
    fn property_indices_are_dense() {
        assert!(Property::ZIndex.index() < PROPERTY_COUNT);
        assert_eq!(Property::ShieldShape.index(), PROPERTY_COUNT - 1);
    }
}
